//! Core domain logic for causal graph reconstruction.
//!
//! This crate contains the fundamental types and logic for:
//! - Clock parsing: turning `{"host":n, ...}` text into vector clocks
//! - Extraction: pulling `(host, clock, event)` entries out of raw logs
//! - Inference: deriving self links and cross-host message links
//! - Assembly: combining hosts and links into a graph for serialization
//! - Generation: seeded synthetic logs for exercising the converter

pub mod clock;
pub mod event;
pub mod generator;
pub mod graph;
pub mod inference;
pub mod pattern;
pub mod types;

pub use clock::{MalformedClockError, VectorClock};
pub use event::{Event, EventError};
pub use generator::{
    GeneratedLog, GeneratorConfig, GeneratorError, Message, SHIVIZ_PATTERN, Variation, generate,
};
pub use graph::{Graph, GraphStats, Node, assemble, build_graph};
pub use inference::{
    DIRECT_LINK_MAX_DIFFS, InferenceMode, Link, cross_links, is_direct_link, self_links,
};
pub use pattern::{ExtractError, LogPattern, PatternError, RawEntry, parse_events};
pub use types::{HostId, ValidationError};
