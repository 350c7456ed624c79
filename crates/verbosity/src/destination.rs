//! crates/verbosity/src/destination.rs
//! Output destinations: caller-owned streams and controller-owned log files.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::mem;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, VerbosityError};

/// How an owned log file is opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OpenMode {
    /// Keep existing content and append new lines.
    #[default]
    Append,
    /// Discard existing content.
    Truncate,
}

impl OpenMode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            Self::Append => options.append(true).create(true),
            Self::Truncate => options.write(true).truncate(true).create(true),
        };
        options
    }
}

impl FromStr for OpenMode {
    type Err = String;

    /// Accepts `append`/`a` and `truncate`/`w`.
    fn from_str(mode: &str) -> std::result::Result<Self, Self::Err> {
        match mode {
            "append" | "a" => Ok(Self::Append),
            "truncate" | "w" => Ok(Self::Truncate),
            _ => Err(format!("unknown open mode: {mode}")),
        }
    }
}

/// A log file opened, and therefore closed, by the controller.
pub(crate) struct OwnedFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl OwnedFile {
    /// Opens `path` in `mode`, recording its absolute form.
    pub(crate) fn open(path: &Path, mode: OpenMode) -> Result<Self> {
        let open_error = |source| VerbosityError::Open {
            path: path.to_path_buf(),
            source,
        };
        let path = std::path::absolute(path).map_err(open_error)?;
        let file = mode.options().open(&path).map_err(open_error)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffered lines, syncs them to storage, and releases the handle.
    ///
    /// Special files that cannot be synced, such as terminals and pipes, are
    /// only flushed.
    pub(crate) fn close(self) -> Result<PathBuf> {
        let Self { path, writer } = self;
        let synced = writer
            .into_inner()
            .map_err(io::IntoInnerError::into_error)
            .and_then(|file| sync(&file));
        match synced {
            Ok(()) => Ok(path),
            Err(source) => Err(VerbosityError::Close { path, source }),
        }
    }
}

fn sync(file: &File) -> io::Result<()> {
    match file.sync_all() {
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::InvalidInput | io::ErrorKind::Unsupported
            ) =>
        {
            Ok(())
        }
        result => result,
    }
}

/// Where emitted lines go.
pub(crate) enum Destination<'w> {
    /// A caller-supplied stream; never closed by the controller.
    Stream(Box<dyn Write + Send + 'w>),
    /// A file the controller opened itself.
    Owned(OwnedFile),
}

impl<'w> Destination<'w> {
    pub(crate) fn stderr() -> Self {
        Self::Stream(Box::new(io::stderr()))
    }

    pub(crate) fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stream(stream) => stream.as_mut(),
            Self::Owned(file) => &mut file.writer,
        }
    }

    pub(crate) fn owned_path(&self) -> Option<&Path> {
        match self {
            Self::Stream(_) => None,
            Self::Owned(file) => Some(file.path()),
        }
    }

    /// Detaches the owned file, if any, leaving standard error in its place.
    pub(crate) fn take_owned(&mut self) -> Option<OwnedFile> {
        if !matches!(self, Self::Owned(_)) {
            return None;
        }
        match mem::replace(self, Self::stderr()) {
            Self::Owned(file) => Some(file),
            Self::Stream(_) => None,
        }
    }
}

impl fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream"),
            Self::Owned(file) => f.debug_tuple("Owned").field(&file.path).finish(),
        }
    }
}
