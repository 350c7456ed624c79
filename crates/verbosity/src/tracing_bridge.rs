//! crates/verbosity/src/tracing_bridge.rs
//! Bridge from the `tracing` ecosystem into the process-wide controller.
//!
//! [`VerbosityLayer`] turns every `tracing` event into a verbose message:
//!
//! - the event level becomes a numeric level (ERROR, WARN and INFO map to 1,
//!   DEBUG to 2, TRACE to 3);
//! - the last `::` segment of the event target becomes a tag;
//! - the full target is used as the caller label.
//!
//! So `tracing::debug!(target: "app::loop", "tick")` is written when the
//! active levels reach 2 or contain the tag `loop`.
//!
//! ```rust,ignore
//! verbosity::init_tracing();
//! verbosity::global::set_levels("1,loop");
//! tracing::trace!(target: "app::loop", "written through the tag");
//! ```

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, Identity, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::global;
use crate::spec::{SpecToken, VerbositySpec};

/// Target prefix of events emitted by this crate; these are never bridged.
const OWN_TARGET: &str = "verbosity";

/// A `tracing-subscriber` layer writing events through [`crate::global`].
#[derive(Clone, Copy, Debug, Default)]
pub struct VerbosityLayer {
    _private: (),
}

impl VerbosityLayer {
    /// Creates the layer.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    const fn numeric_level(level: &Level) -> i64 {
        match *level {
            Level::ERROR | Level::WARN | Level::INFO => 1,
            Level::DEBUG => 2,
            Level::TRACE => 3,
        }
    }

    fn target_tag(target: &str) -> &str {
        target.rsplit("::").next().unwrap_or(target)
    }

    fn is_own_target(target: &str) -> bool {
        target == OWN_TARGET
            || target
                .strip_prefix(OWN_TARGET)
                .is_some_and(|rest| rest.starts_with("::"))
    }

    fn event_spec(level: &Level, target: &str) -> VerbositySpec {
        VerbositySpec::Mixed(vec![
            SpecToken::Level(Self::numeric_level(level)),
            SpecToken::from(Self::target_tag(target)),
        ])
    }
}

impl<S> Layer<S> for VerbosityLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        // Raised under the global lock: a message `Display` impl, a caller
        // stream, or the controller itself.
        if global::held_by_current_thread() || Self::is_own_target(target) {
            return;
        }

        let spec = Self::event_spec(metadata.level(), target);
        if !global::is_level(&spec) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        global::verbose(spec, target, visitor.finish());
    }
}

/// Collects the `message` field followed by any other fields as `name=value`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field, format_args!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.push_field(field, format_args!("{value}"));
        }
    }
}

/// Installs a registry with [`VerbosityLayer`] as the global default subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_tracing() {
    init_tracing_with_filter(Identity::new());
}

/// Like [`init_tracing`], with an additional layer installed before the bridge.
///
/// The layer typically filters or formats events, for example a
/// `tracing_subscriber::fmt` layer carrying an `EnvFilter`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_tracing_with_filter<F>(filter: F)
where
    F: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter)
        .with(VerbosityLayer::new())
        .init();
}

/// Fallible form of [`init_tracing_with_filter`].
///
/// # Errors
///
/// Returns an error, leaving the existing subscriber in place, if a global
/// subscriber has already been set.
pub fn try_init_tracing_with_filter<F>(filter: F) -> Result<(), TryInitError>
where
    F: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(filter)
        .with(VerbosityLayer::new())
        .try_init()
}
