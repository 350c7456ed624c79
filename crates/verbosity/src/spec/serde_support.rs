//! Serde representation of [`VerbositySpec`].
//!
//! Specifications serialize as their natural JSON shape: a number, a string,
//! or a list of numbers and strings. Deserialization is permissive: any other
//! value yields [`VerbositySpec::fallback`], and list elements that are
//! neither integers nor strings are dropped.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{SpecToken, VerbositySpec};

impl Serialize for SpecToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Level(level) => serializer.serialize_i64(*level),
            Self::Tag(tag) => serializer.serialize_str(tag),
        }
    }
}

impl Serialize for VerbositySpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Level(level) => serializer.serialize_i64(*level),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Mixed(tokens) => serializer.collect_seq(tokens),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawToken {
    Level(i64),
    Tag(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSpec {
    Level(i64),
    Text(String),
    Mixed(Vec<RawToken>),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for SpecToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Strict {
            Level(i64),
            Tag(String),
        }

        Ok(match Strict::deserialize(deserializer)? {
            Strict::Level(level) => Self::Level(level),
            Strict::Tag(tag) => Self::Tag(tag),
        })
    }
}

impl<'de> Deserialize<'de> for VerbositySpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSpec::deserialize(deserializer)? {
            RawSpec::Level(level) => Self::Level(level),
            RawSpec::Text(text) => Self::Text(text),
            RawSpec::Mixed(tokens) => Self::Mixed(
                tokens
                    .into_iter()
                    .filter_map(|token| match token {
                        RawToken::Level(level) => Some(SpecToken::Level(level)),
                        RawToken::Tag(tag) => Some(SpecToken::Tag(tag)),
                        RawToken::Other(_) => None,
                    })
                    .collect(),
            ),
            RawSpec::Other(_) => Self::fallback(),
        })
    }
}
