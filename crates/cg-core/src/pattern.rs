//! Extraction of `(host, clock, event)` entries from raw log text.
//!
//! Users describe their log format with a regular expression naming three
//! capture groups, e.g. `(?<host>\S*) (?<clock>{.*})\n(?<event>.*)`.
//!
//! Braces that do not form a counted repetition (`{n}`, `{n,}`, `{n,m}`) are
//! taken literally, so clock delimiters need no escaping.

use regex::Regex;
use thiserror::Error;

use crate::event::{Event, EventError};

/// Capture group names every log pattern must define.
pub const REQUIRED_TAGS: [&str; 3] = ["host", "clock", "event"];

/// Errors compiling a log pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid log pattern")]
    Invalid(#[from] regex::Error),

    #[error("log pattern is missing capture group(s): {}", .missing.join(", "))]
    MissingTags { missing: Vec<&'static str> },
}

/// A log entry that failed to become an [`Event`].
#[derive(Debug, Error)]
#[error("invalid log entry on line {line}")]
pub struct ExtractError {
    /// 1-based line where the offending match starts.
    pub line: usize,
    #[source]
    pub source: EventError,
}

/// Text captured by one match of a [`LogPattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry<'t> {
    pub line: usize,
    pub host: &'t str,
    pub clock: &'t str,
    pub event: &'t str,
}

/// A compiled log pattern with its `host`, `clock` and `event` groups checked.
#[derive(Debug, Clone)]
pub struct LogPattern {
    source: String,
    regex: Regex,
}

impl LogPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(&escape_literal_braces(pattern))?;

        let names: Vec<&str> = regex.capture_names().flatten().collect();
        let missing: Vec<&'static str> = REQUIRED_TAGS
            .into_iter()
            .filter(|tag| !names.contains(tag))
            .collect();
        if !missing.is_empty() {
            return Err(PatternError::MissingTags { missing });
        }

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as given, before literal braces were escaped.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Yields every non-overlapping match in `text`, in order.
    ///
    /// A tagged group that does not take part in a match yields `""`.
    pub fn entries<'t>(&self, text: &'t str) -> impl Iterator<Item = RawEntry<'t>> {
        let mut line = 1;
        let mut scanned = 0;

        self.regex.captures_iter(text).map(move |caps| {
            let start = caps.get(0).map_or(scanned, |m| m.start());
            line += text[scanned..start].matches('\n').count();
            scanned = start;

            let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());
            RawEntry {
                line,
                host: group("host"),
                clock: group("clock"),
                event: group("event"),
            }
        })
    }
}

/// Escapes every `{` and `}` that is not part of a counted repetition or of
/// an escape such as `\p{Greek}` or `\x{2603}`.
fn escape_literal_braces(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    let mut chars = pattern.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                escaped.push(c);
                let Some((_, next)) = chars.next() else {
                    break;
                };
                escaped.push(next);
                if matches!(next, 'p' | 'P' | 'x' | 'u' | 'U')
                    && chars.peek().is_some_and(|&(_, c)| c == '{')
                {
                    for (_, c) in chars.by_ref() {
                        escaped.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                }
            }
            '{' => match counted_repetition_len(&pattern[i..]) {
                Some(len) => {
                    escaped.push_str(&pattern[i..i + len]);
                    // The rest of the repetition is ASCII: one char per byte.
                    for _ in 1..len {
                        chars.next();
                    }
                }
                None => escaped.push_str(r"\{"),
            },
            '}' => escaped.push_str(r"\}"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Byte length of the `{n}`, `{n,}` or `{n,m}` at the start of `s`.
fn counted_repetition_len(s: &str) -> Option<usize> {
    let body = s.strip_prefix('{')?;
    let end = body.find('}')?;
    let is_count = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());

    let valid = match body[..end].split_once(',') {
        Some((min, max)) => is_count(min) && (max.is_empty() || is_count(max)),
        None => is_count(&body[..end]),
    };
    valid.then_some(end + 2)
}

/// Parses every entry in `text` into an [`Event`].
///
/// The first entry that fails to parse aborts extraction.
pub fn parse_events(pattern: &LogPattern, text: &str) -> Result<Vec<Event>, ExtractError> {
    let events = pattern
        .entries(text)
        .map(|entry| {
            Event::parse(entry.host, entry.clock, entry.event).map_err(|source| ExtractError {
                line: entry.line,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(count = events.len(), "extracted events");
    Ok(events)
}
