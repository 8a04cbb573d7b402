//! Entry points bound to the process argument vector.

use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::registry::Argv;

impl Command {
    /// Dispatch the process arguments, minus the program name.
    ///
    /// Arguments that are not valid UTF-8 fail with [`Error::NonUtf8Argument`].
    pub fn run_env(&self) -> Result<()> {
        let args = utf8_args(std::env::args_os().skip(1))?;
        self.run(&args)
    }
}

/// Run a single-command program over the process arguments.
///
/// A returned error is printed to stdout and mapped to a failing exit code.
pub fn run<T, F>(handler: F) -> ExitCode
where
    T: Argv + Default + 'static,
    F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
{
    report(Command::new(program_name(), handler).run_env())
}

/// Print an error, if any, and turn the outcome into an exit code.
pub fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn utf8_args(args: impl IntoIterator<Item = OsString>) -> Result<Vec<String>> {
    args.into_iter()
        .map(|arg| {
            arg.into_string()
                .map_err(|arg| Error::NonUtf8Argument(arg.to_string_lossy().into_owned()))
        })
        .collect()
}

fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
