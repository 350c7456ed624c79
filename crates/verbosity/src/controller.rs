//! crates/verbosity/src/controller.rs
//! The verbosity controller: active levels, emission, and destination lifecycle.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use crate::destination::{Destination, OpenMode, OwnedFile};
use crate::error::{Result, VerbosityError};
use crate::labels::{self, Clock, Label, Labels};
use crate::spec::{Levels, VerbositySpec};

#[cfg(test)]
mod tests;

/// Per-call emission options: an optional tee and label overrides.
///
/// Labels left unset fall back to the controller's configured defaults
/// (see [`Verbosity::set_labels`] and [`Verbosity::set_tee_labels`]).
#[derive(Default)]
pub struct Emit<'t> {
    tee: Option<&'t mut dyn Write>,
    labels: Option<Labels>,
    tee_labels: Option<Labels>,
}

impl<'t> Emit<'t> {
    /// Options that use the controller defaults and no tee.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also writes the line to `tee`.
    #[must_use]
    pub fn tee(mut self, tee: &'t mut dyn Write) -> Self {
        self.tee = Some(tee);
        self
    }

    /// Overrides the labels of the primary line.
    #[must_use]
    pub const fn labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Overrides the labels of the tee line.
    #[must_use]
    pub const fn tee_labels(mut self, labels: Labels) -> Self {
        self.tee_labels = Some(labels);
        self
    }
}

impl fmt::Debug for Emit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emit")
            .field("tee", &self.tee.is_some())
            .field("labels", &self.labels)
            .field("tee_labels", &self.tee_labels)
            .finish()
    }
}

/// Level and tag gated message writer.
///
/// The controller starts at threshold 1 with no tags, writing to standard
/// error. Output can be redirected to a caller stream with
/// [`set_stream`](Self::set_stream) or to a file the controller owns with
/// [`open_file`](Self::open_file); at most one owned file is held at a time.
///
/// ```
/// use verbosity::Verbosity;
///
/// let mut out = Vec::new();
/// {
///     let mut verbosity = Verbosity::with_stream(&mut out);
///     verbosity.set_labels(verbosity::Labels::CALLER);
///     verbosity.set_levels("2,loop");
///     verbosity.verbose(3, "main", "hidden");
///     verbosity.verbose(2, "main", "shown");
///     verbosity.verbose("loop", "main", "tagged");
/// }
/// assert_eq!(String::from_utf8(out).unwrap(), "main: shown\nmain: tagged\n");
/// ```
pub struct Verbosity<'w> {
    levels: Levels,
    destination: Destination<'w>,
    labels: Labels,
    tee_labels: Labels,
    clock: Clock,
}

impl Verbosity<'_> {
    /// Creates a controller writing to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: Levels::default(),
            destination: Destination::stderr(),
            labels: Labels::ALL,
            tee_labels: Labels::ALL,
            clock: labels::local_now,
        }
    }
}

impl Default for Verbosity<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'w> Verbosity<'w> {
    /// Creates a controller writing to a caller-owned stream.
    #[must_use]
    pub fn with_stream<W>(writer: W) -> Self
    where
        W: Write + Send + 'w,
    {
        let mut controller = Self::new();
        controller.destination = Destination::Stream(Box::new(writer));
        controller
    }

    /// Returns the active levels.
    #[must_use]
    pub const fn levels(&self) -> &Levels {
        &self.levels
    }

    /// Returns the absolute path of the owned log file, if any.
    #[must_use]
    pub fn owned_path(&self) -> Option<&Path> {
        self.destination.owned_path()
    }

    /// Replaces the time source used for timestamp labels.
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    /// Sets the default labels for primary lines.
    pub fn set_labels(&mut self, labels: Labels) {
        self.labels = labels;
    }

    /// Sets the default labels for tee lines.
    pub fn set_tee_labels(&mut self, labels: Labels) {
        self.tee_labels = labels;
    }

    /// Replaces the active levels with `spec`.
    ///
    /// Nothing carries over from the previous setting.
    pub fn set_levels(&mut self, spec: impl Into<VerbositySpec>) {
        self.levels = spec.into().parse();
    }

    /// Replaces the active levels, splitting textual specs on `delimiter`.
    pub fn set_levels_with(&mut self, spec: impl Into<VerbositySpec>, delimiter: char) {
        self.levels = spec.into().parse_with(delimiter);
    }

    /// Reports whether a message tagged with `spec` would be emitted.
    #[must_use]
    pub fn is_level(&self, spec: impl Into<VerbositySpec>) -> bool {
        self.levels.admits(&spec.into().parse())
    }

    /// Emits `message` with the default labels when `spec` is active.
    pub fn verbose(
        &mut self,
        spec: impl Into<VerbositySpec>,
        caller: &str,
        message: impl fmt::Display,
    ) {
        self.verbose_with(spec, caller, message, Emit::new());
    }

    /// Emits `message` when `spec` is active, honouring the tee and label
    /// overrides in `emit`.
    ///
    /// The tee line is written even when the primary write fails. Write
    /// failures are reported through `tracing` rather than returned.
    pub fn verbose_with(
        &mut self,
        spec: impl Into<VerbositySpec>,
        caller: &str,
        message: impl fmt::Display,
        emit: Emit<'_>,
    ) {
        if !self.is_level(spec) {
            return;
        }

        let primary_labels = emit.labels.unwrap_or(self.labels);
        let tee_labels = emit.tee_labels.unwrap_or(self.tee_labels);
        let wants_timestamp = primary_labels.contains(Label::Timestamp)
            || (emit.tee.is_some() && tee_labels.contains(Label::Timestamp));
        let timestamp = if wants_timestamp {
            labels::format_timestamp((self.clock)())
        } else {
            String::new()
        };

        let line = format!("{}{message}", primary_labels.prefix(&timestamp, caller));
        if let Err(error) = write_line(self.destination.writer(), &line) {
            tracing::warn!(%error, "failed to write verbose message");
        }

        if let Some(tee) = emit.tee {
            let line = format!("{}{message}", tee_labels.prefix(&timestamp, caller));
            if let Err(error) = write_line(tee, &line) {
                tracing::warn!(%error, "failed to write verbose message to tee");
            }
        }
    }

    /// Routes output to a caller-owned stream, closing any owned file first.
    pub fn set_stream<W>(&mut self, writer: W)
    where
        W: Write + Send + 'w,
    {
        self.close_file();
        self.destination = Destination::Stream(Box::new(writer));
        tracing::debug!("verbose output redirected to caller stream");
    }

    /// Opens `path` and routes output to it, closing any owned file first.
    ///
    /// The path is recorded in absolute form. When opening fails the error is
    /// returned and no file is owned: output goes to standard error if a
    /// previous file was closed, and otherwise stays on the current stream.
    pub fn open_file(&mut self, path: impl AsRef<Path>, mode: OpenMode) -> Result<()> {
        self.close_file();
        let file = OwnedFile::open(path.as_ref(), mode)?;
        tracing::debug!(path = %file.path().display(), ?mode, "opened verbose log file");
        self.destination = Destination::Owned(file);
        Ok(())
    }

    /// Closes the owned file, if any, and returns output to standard error.
    ///
    /// A failure to close is unrecoverable: the diagnostic names the path and
    /// the process exits with status 1.
    pub fn close_file(&mut self) {
        if let Err(error) = self.try_close_file() {
            abort_on_close_failure(&error);
        }
    }

    /// Closes the owned file, if any, returning failures instead of exiting.
    ///
    /// Ownership is cleared even when closing fails.
    pub fn try_close_file(&mut self) -> Result<()> {
        let Some(file) = self.destination.take_owned() else {
            return Ok(());
        };
        let path = file.close()?;
        tracing::debug!(path = %path.display(), "closed verbose log file");
        Ok(())
    }

    /// Flushes the current destination.
    pub fn flush(&mut self) -> io::Result<()> {
        self.destination.writer().flush()
    }
}

impl fmt::Debug for Verbosity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verbosity")
            .field("levels", &self.levels)
            .field("destination", &self.destination)
            .field("labels", &self.labels)
            .field("tee_labels", &self.tee_labels)
            .finish_non_exhaustive()
    }
}

fn write_line(writer: &mut dyn Write, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")
}

fn abort_on_close_failure(error: &VerbosityError) -> ! {
    tracing::error!(path = %error.path().display(), %error, "cannot close verbose log file");
    let _ = writeln!(io::stderr(), "{error}");
    process::exit(1)
}
