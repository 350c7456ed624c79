//! crates/verbosity/src/spec.rs
//! Verbosity specifications and their normalized threshold/tag form.
//!
//! A specification arrives in one of three surface forms: a bare integer, a
//! delimited string such as `"2,readcmds,blah"`, or a list of mixed integers
//! and tags such as `[2, "readcmds", "blah"]`. Every form normalizes into a
//! [`Levels`] value holding the highest numeric level (if any) and the set of
//! tags.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
mod serde_support;


/// Delimiter used when splitting textual specifications.
pub const DEFAULT_DELIMITER: char = ',';

/// Threshold assumed when a specification cannot be interpreted, and the
/// threshold a fresh controller starts with.
pub const FALLBACK_THRESHOLD: i64 = 1;

/// A single element of a [`VerbositySpec::Mixed`] list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecToken {
    /// A numeric verbosity level.
    Level(i64),
    /// A named tag, matched by set membership.
    Tag(String),
}

impl From<i64> for SpecToken {
    fn from(level: i64) -> Self {
        Self::Level(level)
    }
}

impl From<i32> for SpecToken {
    fn from(level: i32) -> Self {
        Self::Level(i64::from(level))
    }
}

impl From<u32> for SpecToken {
    fn from(level: u32) -> Self {
        Self::Level(i64::from(level))
    }
}

impl From<&str> for SpecToken {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_owned())
    }
}

impl From<String> for SpecToken {
    fn from(tag: String) -> Self {
        Self::Tag(tag)
    }
}

impl fmt::Display for SpecToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{level}"),
            Self::Tag(tag) => write!(f, "{tag:?}"),
        }
    }
}

/// A verbosity query or setting in any of its accepted surface forms.
///
/// ```
/// use verbosity::{SpecToken, VerbositySpec};
///
/// let list = VerbositySpec::Mixed(vec![SpecToken::Level(1), "blah".into(), "pod".into()]);
/// let text = VerbositySpec::from("1,blah,pod");
/// assert_eq!(list.parse(), text.parse());
/// assert_eq!(VerbositySpec::from(99).parse().threshold(), Some(99));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerbositySpec {
    /// A single numeric threshold.
    Level(i64),
    /// Delimiter separated digits and tag words, e.g. `"1,blah,pod"`.
    Text(String),
    /// An ordered list of numeric levels and tags, e.g. `[1, "blah", "pod"]`.
    Mixed(Vec<SpecToken>),
}

impl VerbositySpec {
    /// Returns the specification used when an input cannot be interpreted.
    #[must_use]
    pub const fn fallback() -> Self {
        Self::Level(FALLBACK_THRESHOLD)
    }

    /// Normalizes the specification using [`DEFAULT_DELIMITER`].
    #[must_use]
    pub fn parse(&self) -> Levels {
        self.parse_with(DEFAULT_DELIMITER)
    }

    /// Normalizes the specification, splitting textual input on `delimiter`.
    ///
    /// The delimiter only affects [`VerbositySpec::Text`]; list elements are
    /// taken verbatim, so a tag such as `"3"` inside a list stays a tag.
    #[must_use]
    pub fn parse_with(&self, delimiter: char) -> Levels {
        match self {
            Self::Level(level) => Levels::from_threshold(*level),
            Self::Text(text) => text.split(delimiter).map(classify_token).collect(),
            Self::Mixed(tokens) => tokens.iter().cloned().collect(),
        }
    }
}

impl Default for VerbositySpec {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Classifies one textual token: all ASCII digits make a level, anything else a tag.
fn classify_token(token: &str) -> SpecToken {
    if !token.is_empty() && token.bytes().all(|byte| byte.is_ascii_digit()) {
        // Digit-only input can only fail to parse by overflowing.
        SpecToken::Level(token.parse().unwrap_or(i64::MAX))
    } else {
        SpecToken::Tag(token.to_owned())
    }
}

impl From<i64> for VerbositySpec {
    fn from(level: i64) -> Self {
        Self::Level(level)
    }
}

impl From<i32> for VerbositySpec {
    fn from(level: i32) -> Self {
        Self::Level(i64::from(level))
    }
}

impl From<u32> for VerbositySpec {
    fn from(level: u32) -> Self {
        Self::Level(i64::from(level))
    }
}

impl From<u8> for VerbositySpec {
    fn from(level: u8) -> Self {
        Self::Level(i64::from(level))
    }
}

impl From<&str> for VerbositySpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for VerbositySpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for VerbositySpec {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Vec<SpecToken>> for VerbositySpec {
    fn from(tokens: Vec<SpecToken>) -> Self {
        Self::Mixed(tokens)
    }
}

impl From<&[SpecToken]> for VerbositySpec {
    fn from(tokens: &[SpecToken]) -> Self {
        Self::Mixed(tokens.to_vec())
    }
}

impl From<&VerbositySpec> for VerbositySpec {
    fn from(spec: &VerbositySpec) -> Self {
        spec.clone()
    }
}

impl From<&Levels> for VerbositySpec {
    /// Re-expresses normalized levels as a list, threshold first.
    fn from(levels: &Levels) -> Self {
        let tokens = levels
            .threshold
            .map(SpecToken::Level)
            .into_iter()
            .chain(levels.tags.iter().cloned().map(SpecToken::Tag))
            .collect();
        Self::Mixed(tokens)
    }
}

impl From<Levels> for VerbositySpec {
    fn from(levels: Levels) -> Self {
        Self::from(&levels)
    }
}

impl FromStr for VerbositySpec {
    type Err = Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(text))
    }
}

impl fmt::Display for VerbositySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(level) => write!(f, "{level}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Mixed(tokens) => {
                f.write_str("[")?;
                for (index, token) in tokens.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{token}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Normalized specification: the highest numeric level plus a set of tags.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Levels {
    threshold: Option<i64>,
    tags: BTreeSet<String>,
}

impl Levels {
    /// Creates levels from explicit parts.
    #[must_use]
    pub fn new<I, T>(threshold: Option<i64>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            threshold,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates levels holding only a numeric threshold.
    #[must_use]
    pub const fn from_threshold(threshold: i64) -> Self {
        Self {
            threshold: Some(threshold),
            tags: BTreeSet::new(),
        }
    }

    /// Levels produced by unrecognized input: threshold 1, no tags.
    #[must_use]
    pub const fn fallback() -> Self {
        Self::from_threshold(FALLBACK_THRESHOLD)
    }

    /// Returns the numeric threshold, if any level was present.
    #[must_use]
    pub const fn threshold(&self) -> Option<i64> {
        self.threshold
    }

    /// Returns the tag set.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Reports whether `tag` is part of the set.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Reports whether these (active) levels admit the queried levels.
    ///
    /// A query is admitted when both sides carry a threshold and the active
    /// one is at least the queried one, or when the tag sets intersect.
    #[must_use]
    pub fn admits(&self, query: &Self) -> bool {
        let by_threshold = matches!(
            (self.threshold, query.threshold),
            (Some(active), Some(wanted)) if active >= wanted
        );
        by_threshold || !self.tags.is_disjoint(&query.tags)
    }
}

impl Default for Levels {
    fn default() -> Self {
        Self::fallback()
    }
}

impl FromIterator<SpecToken> for Levels {
    fn from_iter<I: IntoIterator<Item = SpecToken>>(tokens: I) -> Self {
        let mut threshold: Option<i64> = None;
        let mut tags = BTreeSet::new();
        for token in tokens {
            match token {
                SpecToken::Level(level) => {
                    threshold = Some(threshold.map_or(level, |current| current.max(level)));
                }
                SpecToken::Tag(tag) => {
                    tags.insert(tag);
                }
            }
        }
        Self { threshold, tags }
    }
}

impl fmt::Display for Levels {
    /// Renders the levels as delimited text, e.g. `2,blah,readcmds`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(threshold) = self.threshold {
            write!(f, "{threshold}")?;
            first = false;
        }
        for tag in &self.tags {
            if !first {
                write!(f, "{DEFAULT_DELIMITER}")?;
            }
            f.write_str(tag)?;
            first = false;
        }
        Ok(())
    }
}

/// Splits a specification into its normalized threshold and tags.
///
/// ```
/// use verbosity::split_levels;
///
/// let levels = split_levels("blah,pod,6,9,pie", ',');
/// assert_eq!(levels.threshold(), Some(9));
/// assert!(levels.has_tag("pie"));
///
/// let levels = split_levels("1:blah:pod", ':');
/// assert_eq!(levels.threshold(), Some(1));
/// assert_eq!(levels.tags().len(), 2);
/// ```
pub fn split_levels(spec: impl Into<VerbositySpec>, delimiter: char) -> Levels {
    spec.into().parse_with(delimiter)
}
