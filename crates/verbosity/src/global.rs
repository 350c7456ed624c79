//! crates/verbosity/src/global.rs
//! Process-wide controller shared by every thread.
//!
//! The functions here forward to a single [`Verbosity`] guarded by a mutex,
//! so concurrent callers never interleave partial lines or race on the owned
//! file. A lock poisoned by a panicking writer is recovered rather than
//! propagated.
//!
//! The lock is not re-entrant. Code running while it is held, such as a
//! message's `Display` impl or a caller stream, must not call back into this
//! module. The `tracing` bridge checks for this and drops events raised while
//! the lock is held.

use std::cell::Cell;
use std::fmt;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use crate::config::VerbosityConfig;
use crate::controller::{Emit, Verbosity};
use crate::destination::OpenMode;
use crate::error::Result;
use crate::labels::Labels;
use crate::spec::{Levels, VerbositySpec};

static CONTROLLER: LazyLock<Mutex<Verbosity<'static>>> =
    LazyLock::new(|| Mutex::new(Verbosity::new()));

thread_local! {
    static HELD: Cell<bool> = const { Cell::new(false) };
}

/// The locked controller; marks the current thread as holding it.
struct Held(MutexGuard<'static, Verbosity<'static>>);

impl Deref for Held {
    type Target = Verbosity<'static>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Held {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Drop for Held {
    fn drop(&mut self) {
        HELD.set(false);
    }
}

fn controller() -> Held {
    let guard = CONTROLLER.lock().unwrap_or_else(PoisonError::into_inner);
    HELD.set(true);
    Held(guard)
}

/// Reports whether the current thread is inside a call holding the lock.
#[cfg(feature = "subscriber")]
pub(crate) fn held_by_current_thread() -> bool {
    HELD.get()
}

/// Runs `f` with exclusive access to the process-wide controller.
pub fn with<R>(f: impl FnOnce(&mut Verbosity<'static>) -> R) -> R {
    f(&mut *controller())
}

/// Replaces the active levels.
pub fn set_levels(spec: impl Into<VerbositySpec>) {
    controller().set_levels(spec);
}

/// Replaces the active levels, splitting textual specs on `delimiter`.
pub fn set_levels_with(spec: impl Into<VerbositySpec>, delimiter: char) {
    controller().set_levels_with(spec, delimiter);
}

/// Reports whether `spec` is active.
#[must_use]
pub fn is_level(spec: impl Into<VerbositySpec>) -> bool {
    controller().is_level(spec)
}

/// Returns a snapshot of the active levels.
#[must_use]
pub fn levels() -> Levels {
    controller().levels().clone()
}

/// Returns the absolute path of the owned log file, if any.
#[must_use]
pub fn owned_path() -> Option<PathBuf> {
    controller().owned_path().map(Path::to_path_buf)
}

/// Emits `message` when `spec` is active.
pub fn verbose(spec: impl Into<VerbositySpec>, caller: &str, message: impl fmt::Display) {
    controller().verbose(spec, caller, message);
}

/// Emits `message` when `spec` is active, with per-call options.
pub fn verbose_with(
    spec: impl Into<VerbositySpec>,
    caller: &str,
    message: impl fmt::Display,
    emit: Emit<'_>,
) {
    controller().verbose_with(spec, caller, message, emit);
}

/// Sets the default labels for primary lines.
pub fn set_labels(labels: Labels) {
    controller().set_labels(labels);
}

/// Routes output to `writer`, closing any owned file first.
pub fn set_stream<W>(writer: W)
where
    W: Write + Send + 'static,
{
    controller().set_stream(writer);
}

/// Opens `path` as the owned log file, closing any previous one first.
pub fn open_file(path: impl AsRef<Path>, mode: OpenMode) -> Result<()> {
    controller().open_file(path, mode)
}

/// Closes the owned log file; exits the process if closing fails.
pub fn close_file() {
    controller().close_file();
}

/// Closes the owned log file, returning any failure.
pub fn try_close_file() -> Result<()> {
    controller().try_close_file()
}

/// Applies `config` to the process-wide controller.
pub fn configure(config: &VerbosityConfig) -> Result<()> {
    config.apply(&mut *controller())
}

/// Restores the initial state: threshold 1, no tags, default labels, stderr.
///
/// An owned file is closed first; a failure to close it is returned and the
/// state is reset regardless.
pub fn reset() -> Result<()> {
    let mut guard = controller();
    let closed = guard.try_close_file();
    *guard = Verbosity::new();
    closed
}
