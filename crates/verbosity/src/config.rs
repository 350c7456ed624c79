//! crates/verbosity/src/config.rs
//! Declarative controller configuration.

use std::io;
use std::path::PathBuf;

use crate::controller::Verbosity;
use crate::destination::OpenMode;
use crate::error::Result;
use crate::labels::Labels;
use crate::spec::{DEFAULT_DELIMITER, VerbositySpec};

/// Where a configured controller writes its lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Output {
    /// Standard error.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
    /// A log file owned by the controller.
    File {
        /// Path to open.
        path: PathBuf,
        /// Whether to append or truncate.
        #[cfg_attr(feature = "serde", serde(default))]
        mode: OpenMode,
    },
}

/// Settings applied to a [`Verbosity`] controller in one step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VerbosityConfig {
    /// Active specification.
    pub levels: VerbositySpec,
    /// Delimiter for textual specifications.
    pub delimiter: char,
    /// Output destination.
    pub output: Output,
    /// Labels on primary lines.
    pub labels: Labels,
    /// Labels on tee lines.
    pub tee_labels: Labels,
}

impl Default for VerbosityConfig {
    fn default() -> Self {
        Self {
            levels: VerbositySpec::fallback(),
            delimiter: DEFAULT_DELIMITER,
            output: Output::Stderr,
            labels: Labels::ALL,
            tee_labels: Labels::ALL,
        }
    }
}

impl VerbosityConfig {
    /// Sets the active specification.
    #[must_use]
    pub fn levels(mut self, levels: impl Into<VerbositySpec>) -> Self {
        self.levels = levels.into();
        self
    }

    /// Sets the delimiter for textual specifications.
    #[must_use]
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the output destination.
    #[must_use]
    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Writes to a controller-owned file at `path`.
    #[must_use]
    pub fn file(self, path: impl Into<PathBuf>, mode: OpenMode) -> Self {
        self.output(Output::File {
            path: path.into(),
            mode,
        })
    }

    /// Sets the labels on primary lines.
    #[must_use]
    pub const fn labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the labels on tee lines.
    #[must_use]
    pub const fn tee_labels(mut self, labels: Labels) -> Self {
        self.tee_labels = labels;
        self
    }

    /// Applies the settings to an existing controller.
    ///
    /// Levels and labels are updated before the destination, so a failed
    /// file open still leaves them in effect.
    pub fn apply(&self, verbosity: &mut Verbosity<'_>) -> Result<()> {
        verbosity.set_levels_with(&self.levels, self.delimiter);
        verbosity.set_labels(self.labels);
        verbosity.set_tee_labels(self.tee_labels);
        match &self.output {
            Output::Stderr => verbosity.set_stream(io::stderr()),
            Output::Stdout => verbosity.set_stream(io::stdout()),
            Output::File { path, mode } => verbosity.open_file(path, *mode)?,
        }
        Ok(())
    }

    /// Builds a fresh controller from the settings.
    pub fn build(&self) -> Result<Verbosity<'static>> {
        let mut verbosity = Verbosity::new();
        self.apply(&mut verbosity)?;
        Ok(verbosity)
    }
}
