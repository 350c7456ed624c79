#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `verbosity` gates diagnostic output by a combination of a numeric level and
//! named tags. The active setting is a [`Levels`] value: a threshold plus a
//! set of tags. A message tagged with its own levels is written when the
//! active threshold is at least the message's threshold, or when the two tag
//! sets share an element.
//!
//! # Design
//!
//! - [`VerbositySpec`] accepts the three surface forms a specification can take
//!   (an integer, delimited text such as `"2,loop"`, or a mixed list) and
//!   normalizes each with [`split_levels`].
//! - [`Verbosity`] owns the active levels and the output destination: standard
//!   error by default, any caller stream, or a file the controller opens and
//!   closes itself. Lines are prefixed with a timestamp and the caller name,
//!   both configurable through [`Labels`].
//! - [`global`] wraps one controller behind a mutex for process-wide use, and
//!   the [`verbose!`] family of macros fills in the caller name.
//! - [`VerbosityConfig`] applies a whole setup in one step and, with the
//!   `serde` feature, can be loaded from configuration files.
//! - With the `subscriber` feature, `VerbosityLayer` routes `tracing` events
//!   through the process-wide controller.
//!
//! # Errors
//!
//! Specifications never fail to parse: unrecognized input falls back to
//! threshold 1. Opening a log file reports [`VerbosityError::Open`]. Failing to
//! close an owned file is fatal in [`Verbosity::close_file`]; use
//! [`Verbosity::try_close_file`] to observe the error instead.
//!
//! # Examples
//!
//! ```
//! use verbosity::{Labels, Verbosity, spec};
//!
//! let mut out = Vec::new();
//! {
//!     let mut verbosity = Verbosity::with_stream(&mut out);
//!     verbosity.set_labels(Labels::NONE);
//!     verbosity.set_levels(99);
//!     assert!(verbosity.is_level("99,blah"));
//!     assert!(!verbosity.is_level("blah"));
//!     verbosity.verbose(spec![2, "loop"], "main", "inside the loop");
//! }
//! assert_eq!(String::from_utf8(out).unwrap(), "inside the loop\n");
//! ```

mod config;
mod controller;
mod destination;
mod error;
pub mod global;
mod labels;
mod macros;
mod spec;
#[cfg(feature = "subscriber")]
mod tracing_bridge;

pub use config::{Output, VerbosityConfig};
pub use controller::{Emit, Verbosity};
pub use destination::OpenMode;
pub use error::{Result, VerbosityError};
pub use labels::{
    Clock, Label, LabelParseError, Labels, TIMESTAMP_FORMAT, format_timestamp, local_now,
};
#[doc(hidden)]
pub use macros::__function_name;
pub use spec::{
    DEFAULT_DELIMITER, FALLBACK_THRESHOLD, Levels, SpecToken, VerbositySpec, split_levels,
};
#[cfg(feature = "subscriber")]
pub use tracing_bridge::{
    VerbosityLayer, init_tracing, init_tracing_with_filter, try_init_tracing_with_filter,
};
