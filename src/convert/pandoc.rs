//! External converter driven through a pandoc-compatible command line.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use super::{ConvertError, Converter};

/// Runs an external program as `<program> --standalone --css <sheet>...
/// --output <output> <args>... <input>`.
///
/// Stylesheets given with `--css` are linked from the page, not inlined.
pub struct PandocConverter {
    program: String,
    extra_args: Vec<String>,
}

impl PandocConverter {
    pub fn new(program: String, extra_args: Vec<String>) -> Self {
        Self {
            program,
            extra_args,
        }
    }

    /// Arguments passed to the program, in order.
    fn command_args(&self, input: &Path, output: &Path, stylesheets: &[String]) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--standalone".into()];
        for sheet in stylesheets {
            args.push("--css".into());
            args.push(sheet.into());
        }
        args.push("--output".into());
        args.push(output.into());
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(input.into());
        args
    }
}

impl Converter for PandocConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn convert(
        &self,
        input: &Path,
        output: &Path,
        stylesheets: &[String],
    ) -> Result<(), ConvertError> {
        let args = self.command_args(input, output, stylesheets);
        tracing::debug!("running {} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ConvertError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(ConvertError::Failed {
                program: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        // pandoc reports recoverable problems (unknown markup, missing title)
        // as warnings on stderr
        let warnings = String::from_utf8_lossy(&result.stderr);
        for line in warnings.lines().filter(|l| !l.trim().is_empty()) {
            tracing::warn!("{}: {}", self.program, line);
        }

        Ok(())
    }
}
