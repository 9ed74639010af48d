//! Events observed in a log.

use thiserror::Error;

use crate::clock::{MalformedClockError, VectorClock};
use crate::types::{HostId, ValidationError};

/// Errors building an [`Event`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error(transparent)]
    MalformedClock(#[from] MalformedClockError),

    #[error(transparent)]
    InvalidHost(#[from] ValidationError),

    /// The clock says nothing about the host that recorded it.
    #[error("clock {clock} has no entry for its own host {host:?}")]
    MissingSelfEntry { host: String, clock: VectorClock },
}

/// One occurrence recorded by a host, stamped with that host's vector clock.
///
/// The clock always carries the recording host's own counter, which is the
/// event's local sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    host: HostId,
    clock: VectorClock,
    description: String,
}

impl Event {
    pub fn new(
        host: HostId,
        clock: VectorClock,
        description: impl Into<String>,
    ) -> Result<Self, EventError> {
        if !clock.contains_host(host.as_str()) {
            return Err(EventError::MissingSelfEntry {
                host: host.into(),
                clock,
            });
        }
        Ok(Self {
            host,
            clock,
            description: description.into(),
        })
    }

    /// Builds an event from the raw text captured out of a log line.
    pub fn parse(host: &str, clock: &str, description: &str) -> Result<Self, EventError> {
        let host = HostId::new(host)?;
        let clock = clock.parse()?;
        Self::new(host, clock, description)
    }

    pub const fn host(&self) -> &HostId {
        &self.host
    }

    pub const fn clock(&self) -> &VectorClock {
        &self.clock
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The host's own counter at this event.
    pub fn local_counter(&self) -> i64 {
        self.clock.get(self.host.as_str()).unwrap_or_default()
    }
}
