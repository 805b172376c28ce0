//! Steps that bring in and clean up the intermediate document copy.

use crate::publish::{PublishContext, PublishError, Step};

/// Copies the document from the main branch into the publish branch's
/// working tree without switching branches.
pub struct MaterializeDocument;

impl Step for MaterializeDocument {
    fn name(&self) -> &'static str {
        "materialize-document"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        ctx.workspace
            .checkout_path_from(&ctx.config.main_branch, &ctx.config.document)?;
        Ok(())
    }
}

/// Deletes the document copy so it never lands on the publish branch.
pub struct RemoveDocument;

impl Step for RemoveDocument {
    fn name(&self) -> &'static str {
        "remove-document"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        let path = ctx.workspace.resolve(&ctx.config.document);
        std::fs::remove_file(&path).map_err(|source| PublishError::Io { path, source })
    }
}
