//! The publish procedure.
//!
//! Publishing runs an ordered list of steps against a shared context:
//! 1. Switch to the publish branch
//! 2. Copy the document over from the main branch
//! 3. Convert it to the page
//! 4. Delete the document copy
//! 5. Reset the index
//! 6. Stage the page
//! 7. Commit
//! 8. Switch back to the main branch
//!
//! The first failing step stops the run. What happens to the working tree
//! afterwards is decided by the [`FailurePolicy`].

mod context;
mod error;
#[cfg(test)]
pub(crate) mod fixture;
mod steps;

pub use context::{PublishContext, PublishReport};
pub use error::PublishError;

use steps::{
    CommitStep, ConvertStep, MaterializeDocument, RemoveDocument, ResetIndex, RestoreMain,
    ReturnToMain, StageOutput, SwitchToPublish,
};

use crate::config::FailurePolicy;

/// A step in the publish procedure.
pub trait Step: Send + Sync {
    /// Unique name for this step (used in logs and error reports).
    fn name(&self) -> &'static str;

    /// Perform the step.
    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError>;
}

/// Ordered publish steps plus the step used to restore the main branch.
pub struct Procedure {
    steps: Vec<Box<dyn Step>>,
    restore: Box<dyn Step>,
    policy: FailurePolicy,
}

impl Procedure {
    /// Create a procedure with no steps.
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            steps: Vec::new(),
            restore: Box::new(RestoreMain),
            policy,
        }
    }

    /// The standard eight-step publish procedure.
    pub fn default_procedure(policy: FailurePolicy) -> Self {
        let mut procedure = Self::new(policy);
        procedure.add_step(SwitchToPublish);
        procedure.add_step(MaterializeDocument);
        procedure.add_step(ConvertStep);
        procedure.add_step(RemoveDocument);
        procedure.add_step(ResetIndex);
        procedure.add_step(StageOutput);
        procedure.add_step(CommitStep);
        procedure.add_step(ReturnToMain);
        procedure
    }

    /// Add a step to the end of the procedure.
    pub fn add_step<S: Step + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Get the names of all steps in order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// Under [`FailurePolicy::Restore`] a failure after the first step is
    /// followed by an attempt to check out the main branch; the original
    /// error is returned either way.
    pub fn run(&self, ctx: &mut PublishContext) -> Result<PublishReport, PublishError> {
        for (position, step) in self.steps.iter().enumerate() {
            tracing::info!("[{}/{}] {}", position + 1, self.steps.len(), step.name());

            if let Err(err) = step.run(ctx) {
                let err = err.in_step(step.name());
                tracing::error!("{}", err);
                if self.policy == FailurePolicy::Restore && position > 0 {
                    self.restore_after_failure(ctx, &err);
                }
                return Err(err);
            }
            ctx.report.completed.push(step.name());
        }

        Ok(ctx.report.clone())
    }

    fn restore_after_failure(&self, ctx: &mut PublishContext, err: &PublishError) {
        tracing::info!(
            "restoring {} after '{}' failed",
            ctx.config.main_branch,
            err.step().unwrap_or("unknown")
        );
        match self.restore.run(ctx) {
            Ok(()) => tracing::info!("back on {}", ctx.config.main_branch),
            Err(restore_err) => tracing::warn!(
                "could not return to {}; repository left as is: {}",
                ctx.config.main_branch,
                restore_err
            ),
        }
    }
}

impl Default for Procedure {
    fn default() -> Self {
        Self::default_procedure(FailurePolicy::default())
    }
}
