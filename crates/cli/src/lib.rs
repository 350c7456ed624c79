#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` implements the `verbosity-selftest` front end. It sets the active
//! verbosity from an optional `LEVELS` argument, reports the resulting state,
//! and runs a fixed table of specifications through the controller so the
//! effect of a setting can be inspected from the shell.
//!
//! # Design
//!
//! [`run`] accepts the argument list together with handles for standard
//! output and error. The state report and the table listing go to standard
//! output; the verbose lines go to standard error, or to `--log-file` when
//! given. [`exit_code_from`] converts the returned status for `main`.
//!
//! With the `tracing` feature, [`install_diagnostics`] also bridges this
//! crate's own `tracing` events into the process-wide controller, whose
//! levels are set with `--trace-levels`.
//!
//! # Errors
//!
//! Argument errors and log file failures are printed to the error handle and
//! reported as exit status `1`.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let status = cli::run(
//!     ["verbosity-selftest", "--labels", "", "3"],
//!     &mut stdout,
//!     &mut stderr,
//! );
//!
//! assert_eq!(status, 0);
//! assert!(String::from_utf8(stdout).unwrap().starts_with("vlevels: 3\n"));
//! assert!(String::from_utf8(stderr).unwrap().contains("true for test: [3, \"func\"]"));
//! ```

use std::ffi::OsString;
use std::io::Write;

use verbosity::Verbosity;

mod command;
mod diagnostics;
mod selftest;

pub use command::PROGRAM_NAME;
pub use diagnostics::{LOG_ENV, install_diagnostics};
pub use selftest::test_table;

/// Maximum exit code representable by a Unix process.
const MAX_EXIT_CODE: i32 = u8::MAX as i32;

/// Runs the self-test and returns the process exit status.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write + Send,
{
    let parsed = match command::parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => {
            let _ = write!(stderr, "{error}");
            return 1;
        }
    };

    if parsed.show_help {
        return if stdout.write_all(command::render_help().as_bytes()).is_ok() {
            0
        } else {
            1
        };
    }

    if parsed.show_version {
        return if writeln!(stdout, "{PROGRAM_NAME} {}", env!("CARGO_PKG_VERSION")).is_ok() {
            0
        } else {
            1
        };
    }

    let delimiter = parsed.delimiter();
    let mut verbosity = Verbosity::with_stream(&mut *stderr);
    if let Some(labels) = parsed.labels {
        verbosity.set_labels(labels);
    }
    if let Some(levels) = parsed.levels.as_deref() {
        verbosity.set_levels_with(levels, delimiter);
    }
    if let Some(levels) = parsed.trace_levels.as_deref() {
        gate_bridged_events(levels, delimiter);
    }
    tracing::debug!(target: "cli::levels", levels = %verbosity.levels(), "levels applied");

    if let Some(path) = parsed.log_file.as_deref()
        && let Err(error) = verbosity.open_file(path, parsed.open_mode())
    {
        drop(verbosity);
        let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
        return 1;
    }

    let outcome = selftest::report_state(&verbosity, stdout)
        .and_then(|()| selftest::run_test_table(&mut verbosity, stdout));
    let closed = verbosity.try_close_file();
    drop(verbosity);

    if let Err(error) = outcome {
        let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
        return 1;
    }
    if let Err(error) = closed {
        let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
        return 1;
    }
    0
}

/// Applies `levels` to the process-wide controller that receives this
/// crate's own `tracing` events; without the `tracing` feature those events
/// are never bridged.
#[cfg(feature = "tracing")]
fn gate_bridged_events(levels: &str, delimiter: char) {
    verbosity::global::set_levels_with(levels, delimiter);
}

#[cfg(not(feature = "tracing"))]
fn gate_bridged_events(_levels: &str, _delimiter: char) {}

/// Converts a status from [`run`] into an [`std::process::ExitCode`],
/// clamping it to the range a process can report.
#[must_use]
pub fn exit_code_from(status: i32) -> std::process::ExitCode {
    let clamped = status.clamp(0, MAX_EXIT_CODE);
    std::process::ExitCode::from(clamped as u8)
}
