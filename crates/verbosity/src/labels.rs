//! crates/verbosity/src/labels.rs
//! Line prefixes: wall-clock timestamp and caller name.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Layout used for the timestamp label, e.g. `2018-02-28 19:33:06`.
pub const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Source of the current time used for timestamp labels.
pub type Clock = fn() -> OffsetDateTime;

/// Current local time, or UTC when the local offset cannot be determined.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Formats `moment` with [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(moment: OffsetDateTime) -> String {
    moment
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "0000-00-00 00:00:00".to_owned())
}

/// One element of a line prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Label {
    /// The time the message was emitted.
    #[cfg_attr(feature = "serde", serde(alias = "dt"))]
    Timestamp,
    /// The name of the function that emitted the message.
    #[cfg_attr(feature = "serde", serde(alias = "func"))]
    Caller,
}

impl Label {
    /// Canonical lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Caller => "caller",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a label name is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown label: {0} (expected timestamp, dt, caller, or func)")]
pub struct LabelParseError(String);

impl FromStr for Label {
    type Err = LabelParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "timestamp" | "dt" => Ok(Self::Timestamp),
            "caller" | "func" => Ok(Self::Caller),
            _ => Err(LabelParseError(name.to_owned())),
        }
    }
}

/// Set of labels rendered in front of a message.
///
/// Labels always render in a fixed order, timestamp before caller, each
/// followed by `": "`.
///
/// ```
/// use verbosity::Labels;
///
/// assert_eq!(Labels::ALL.prefix("2018-02-28 19:33:06", "main"), "2018-02-28 19:33:06: main: ");
/// assert_eq!(Labels::CALLER.prefix("ignored", "main"), "main: ");
/// assert_eq!(Labels::NONE.prefix("ignored", "main"), "");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<Label>", into = "Vec<Label>"))]
pub struct Labels {
    timestamp: bool,
    caller: bool,
}

impl Labels {
    /// Timestamp and caller.
    pub const ALL: Self = Self {
        timestamp: true,
        caller: true,
    };
    /// No prefix at all.
    pub const NONE: Self = Self {
        timestamp: false,
        caller: false,
    };
    /// Timestamp only.
    pub const TIMESTAMP: Self = Self {
        timestamp: true,
        caller: false,
    };
    /// Caller only.
    pub const CALLER: Self = Self {
        timestamp: false,
        caller: true,
    };

    /// Returns a copy with `label` enabled.
    #[must_use]
    pub const fn with(mut self, label: Label) -> Self {
        match label {
            Label::Timestamp => self.timestamp = true,
            Label::Caller => self.caller = true,
        }
        self
    }

    /// Returns a copy with `label` disabled.
    #[must_use]
    pub const fn without(mut self, label: Label) -> Self {
        match label {
            Label::Timestamp => self.timestamp = false,
            Label::Caller => self.caller = false,
        }
        self
    }

    /// Reports whether `label` is enabled.
    #[must_use]
    pub const fn contains(self, label: Label) -> bool {
        match label {
            Label::Timestamp => self.timestamp,
            Label::Caller => self.caller,
        }
    }

    /// Reports whether no label is enabled.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.timestamp && !self.caller
    }

    /// Iterates the enabled labels in rendering order.
    pub fn iter(self) -> impl Iterator<Item = Label> {
        [Label::Timestamp, Label::Caller]
            .into_iter()
            .filter(move |label| self.contains(*label))
    }

    /// Builds the prefix for one line.
    #[must_use]
    pub fn prefix(self, timestamp: &str, caller: &str) -> String {
        let mut prefix = String::new();
        if self.timestamp {
            prefix.push_str(timestamp);
            prefix.push_str(": ");
        }
        if self.caller {
            prefix.push_str(caller);
            prefix.push_str(": ");
        }
        prefix
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromIterator<Label> for Labels {
    fn from_iter<I: IntoIterator<Item = Label>>(labels: I) -> Self {
        labels.into_iter().fold(Self::NONE, Self::with)
    }
}

impl From<Vec<Label>> for Labels {
    fn from(labels: Vec<Label>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<Labels> for Vec<Label> {
    fn from(labels: Labels) -> Self {
        labels.iter().collect()
    }
}

impl FromStr for Labels {
    type Err = LabelParseError;

    /// Parses comma-separated label names; an empty string means no labels.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse::<Label>)
            .collect()
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, label) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{label}")?;
        }
        Ok(())
    }
}
