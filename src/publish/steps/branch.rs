//! Branch switching steps.

use crate::publish::{PublishContext, PublishError, Step};

/// Step that moves the working tree onto the publish branch.
///
/// Fails without touching anything when the branch is missing or local
/// changes would be overwritten.
pub struct SwitchToPublish;

impl Step for SwitchToPublish {
    fn name(&self) -> &'static str {
        "switch-to-publish"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        ctx.workspace.checkout_branch(&ctx.config.publish_branch)?;
        Ok(())
    }
}

/// Step that moves the working tree back onto the main branch.
pub struct ReturnToMain;

impl Step for ReturnToMain {
    fn name(&self) -> &'static str {
        "return-to-main"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        ctx.workspace.checkout_branch(&ctx.config.main_branch)?;
        Ok(())
    }
}

/// Step that returns to the main branch after another step failed.
///
/// Unstages whatever the failed run staged and drops the document copy when
/// it still matches the main branch, so the safe checkout has nothing to
/// protect. A copy that was edited in the meantime is left in place and the
/// checkout refuses to run.
pub struct RestoreMain;

impl Step for RestoreMain {
    fn name(&self) -> &'static str {
        "restore-main"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        let on_publish = ctx.workspace.current_branch().as_deref()
            == Some(ctx.config.publish_branch.as_str());
        if on_publish {
            ctx.workspace.reset_index()?;
            let removed = ctx
                .workspace
                .discard_unchanged_copy(&ctx.config.main_branch, &ctx.config.document)?;
            if removed {
                tracing::debug!("dropped copy of {}", ctx.config.document.display());
            }
        }
        ctx.workspace.checkout_branch(&ctx.config.main_branch)?;
        Ok(())
    }
}
