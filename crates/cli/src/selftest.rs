//! crates/cli/src/selftest.rs
//! The built-in test table run by `verbosity-selftest`.

use std::io::{self, Write};

use verbosity::{Verbosity, VerbositySpec, spec};

/// Specifications exercised by every run, covering lists, integers, and tags.
pub fn test_table() -> [VerbositySpec; 5] {
    [
        spec![1, "show"],
        spec![2, "func"],
        spec![3, "func"],
        VerbositySpec::Level(1),
        VerbositySpec::from("show"),
    ]
}

/// Prints the controller state to `stdout`.
pub(crate) fn report_state<Out: Write>(
    verbosity: &Verbosity<'_>,
    stdout: &mut Out,
) -> io::Result<()> {
    writeln!(stdout, "vlevels: {}", verbosity.levels())?;
    match verbosity.owned_path() {
        Some(path) => writeln!(stdout, "vpathname: {}", path.display()),
        None => writeln!(stdout, "vpathname: None"),
    }
}

/// Lists every case on `stdout`, then emits one verbose line per case.
///
/// Only admitted cases produce a verbose line; each reports the match result
/// and the case itself.
pub(crate) fn run_test_table<Out: Write>(
    verbosity: &mut Verbosity<'_>,
    stdout: &mut Out,
) -> io::Result<()> {
    let cases = test_table();
    for case in &cases {
        writeln!(stdout, "test: {case}")?;
    }
    stdout.flush()?;

    for case in &cases {
        let admitted = verbosity.is_level(case);
        tracing::debug!(target: "cli::selftest", %case, admitted, "evaluated test case");
        verbosity::verbose_to!(verbosity, case, "{admitted} for test: {case}");
    }
    Ok(())
}
