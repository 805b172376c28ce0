//! Index and commit steps.

use crate::publish::{PublishContext, PublishError, Step};

/// Resets the index to HEAD, undoing the staging done by the single-file
/// checkout.
pub struct ResetIndex;

impl Step for ResetIndex {
    fn name(&self) -> &'static str {
        "reset-index"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        ctx.workspace.reset_index()?;
        Ok(())
    }
}

/// Stages the generated page.
pub struct StageOutput;

impl Step for StageOutput {
    fn name(&self) -> &'static str {
        "stage-output"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        ctx.workspace.add_path(&ctx.config.output)?;
        Ok(())
    }
}

/// Commits the staged page with the configured message.
pub struct CommitStep;

impl Step for CommitStep {
    fn name(&self) -> &'static str {
        "commit"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        let oid = ctx.workspace.commit(&ctx.config.commit_message)?;
        tracing::info!("committed {} on {}", oid, ctx.config.publish_branch);
        ctx.report.commit = Some(oid.to_string());
        Ok(())
    }
}
