//! Vector clock timestamps as recorded in log lines.
//!
//! Textual form: `{"host1":3, "host2":0}`. Braces are optional, entries are
//! comma separated, host names may be quoted. Any non-empty text between
//! separators must be a `host:value` entry, whitespace included.

use std::collections::BTreeMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// A clock string that could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedClockError {
    /// An entry without a `host:value` separator.
    #[error("clock entry {fragment:?} has no ':' separator")]
    MissingColon { fragment: String },

    /// The value after the separator is not a base-10 integer.
    #[error("clock entry {fragment:?} has a non-integer value")]
    InvalidValue {
        fragment: String,
        #[source]
        source: ParseIntError,
    },

    /// The host part is empty once whitespace and quotes are stripped.
    #[error("clock entry {fragment:?} has an empty host")]
    EmptyHost { fragment: String },
}

/// Mapping from host name to the latest counter known for that host.
///
/// Clocks carry partial knowledge: a host only appears once the owning event
/// has heard of it. Keys iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VectorClock(BTreeMap<String, i64>);

impl VectorClock {
    /// Returns the counter recorded for `host`.
    pub fn get(&self, host: &str) -> Option<i64> {
        self.0.get(host).copied()
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.0.contains_key(host)
    }

    /// Hosts named in this clock, sorted.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(host, value)| (host.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Advances `host`'s counter by one, starting from zero if it is new.
    pub fn tick(&mut self, host: &str) {
        *self.0.entry(host.to_string()).or_default() += 1;
    }

    /// Raises every counter to at least the one recorded in `other`.
    pub fn merge(&mut self, other: &Self) {
        for (host, value) in other.iter() {
            self.0
                .entry(host.to_string())
                .and_modify(|ours| *ours = (*ours).max(value))
                .or_insert(value);
        }
    }

    /// Counts hosts present in both clocks whose counters disagree.
    pub fn differing_shared_hosts(&self, other: &Self) -> usize {
        self.iter()
            .filter(|(host, value)| other.get(host).is_some_and(|theirs| theirs != *value))
            .count()
    }
}

impl FromStr for VectorClock {
    type Err = MalformedClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut entries = BTreeMap::new();

        for fragment in s.split([',', '{', '}']) {
            if fragment.is_empty() {
                continue;
            }

            let Some((host, value)) = fragment.split_once(':') else {
                return Err(MalformedClockError::MissingColon {
                    fragment: fragment.to_string(),
                });
            };

            let host = host.trim().trim_matches('"');
            if host.is_empty() {
                return Err(MalformedClockError::EmptyHost {
                    fragment: fragment.to_string(),
                });
            }

            let value = value
                .trim()
                .parse::<i64>()
                .map_err(|source| MalformedClockError::InvalidValue {
                    fragment: fragment.to_string(),
                    source,
                })?;

            entries.insert(host.to_string(), value);
        }

        Ok(Self(entries))
    }
}

impl fmt::Display for VectorClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (host, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{host}\":{value}")?;
        }
        f.write_str("}")
    }
}
