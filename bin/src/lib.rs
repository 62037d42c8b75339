use std::io::Write;

use diagnostics::Diagnostics;
use itertools::Itertools;
use log::debug;
use scanner::Scanner;

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("{0}")]
    CompileError(Diagnostics),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RunError {
    /// Exit status for a failed script run, following the sysexits.h conventions.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::CompileError(_) => 65,
            RunError::Io(_) => 74,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
    /// Dump the scanned tokens before the syntax tree.
    pub print_tokens: bool,
}

/// Scans and parses `source` and writes the rendered syntax tree to `output`.
///
/// Every call collects its own diagnostics, so an error in one run never leaks
/// into the next one.
pub fn run_source(
    source: &str,
    options: Options,
    output: &mut impl Write,
) -> Result<(), RunError> {
    debug!("Running {} bytes of source", source.len());

    let mut diagnostics = Diagnostics::new();
    let tokens = Scanner::new(source).scan_tokens(&mut diagnostics);

    if options.print_tokens {
        writeln!(output, "{}", tokens.iter().join("\n"))?;
    }

    if diagnostics.had_error() {
        return Err(RunError::CompileError(diagnostics));
    }

    match parser::parse(tokens) {
        Ok(expr) => {
            writeln!(output, "{expr}")?;
            Ok(())
        }
        Err(error) => {
            error.report(&mut diagnostics);
            Err(RunError::CompileError(diagnostics))
        }
    }
}
