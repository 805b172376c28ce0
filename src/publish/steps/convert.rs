//! Conversion step.

use crate::publish::{PublishContext, PublishError, Step};

/// Runs the converter on the document copy and checks that the page exists
/// afterwards.
pub struct ConvertStep;

impl Step for ConvertStep {
    fn name(&self) -> &'static str {
        "convert"
    }

    fn run(&self, ctx: &mut PublishContext) -> Result<(), PublishError> {
        let input = ctx.workspace.resolve(&ctx.config.document);
        let output = ctx.workspace.resolve(&ctx.config.output);

        // A stale page from the previous commit must not pass for fresh output
        if output.exists() {
            std::fs::remove_file(&output).map_err(|source| PublishError::Io {
                path: output.clone(),
                source,
            })?;
        }

        tracing::info!(
            "converting {} with {}",
            ctx.config.document.display(),
            ctx.converter.name()
        );
        ctx.converter
            .convert(&input, &output, &ctx.config.stylesheets)?;

        let metadata = std::fs::metadata(&output).map_err(|_| PublishError::MissingOutput {
            converter: ctx.converter.name().to_string(),
            path: ctx.config.output.clone(),
        })?;
        ctx.report.page_bytes = Some(metadata.len());
        Ok(())
    }
}
