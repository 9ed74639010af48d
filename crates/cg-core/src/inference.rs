//! Causal link inference.
//!
//! Two kinds of links are derived from a set of events:
//! 1. Self links - one per event, a local step on the recording host
//! 2. Cross links - an inferred message from one host to another, found by
//!    comparing the vector clocks of every pair of events on different hosts

use rayon::prelude::*;
use serde::Serialize;

use crate::clock::VectorClock;
use crate::event::Event;
use crate::types::HostId;

/// Most shared hosts whose counters may differ for a pair to count as a
/// direct message. Pairs above this are treated as transitively related.
pub const DIRECT_LINK_MAX_DIFFS: usize = 1;

/// How the pairwise cross-link comparison is executed.
///
/// Both modes yield identical links in identical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InferenceMode {
    Sequential,
    #[default]
    Parallel,
}

/// A directed causal edge ending at the event it was derived from.
///
/// Links borrow the host names, clock and description of that event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Link<'a> {
    pub source: &'a HostId,
    pub target: &'a HostId,
    /// The target event's own counter.
    pub timestamp: i64,
    pub clock: &'a VectorClock,
    pub description: &'a str,
}

impl<'a> Link<'a> {
    /// A link from `source` ending at `target_event`.
    fn ending_at(source: &'a HostId, target_event: &'a Event) -> Self {
        Self {
            source,
            target: target_event.host(),
            timestamp: target_event.local_counter(),
            clock: target_event.clock(),
            description: target_event.description(),
        }
    }

    pub fn is_self_link(&self) -> bool {
        self.source == self.target
    }
}

/// Builds one self link per event of `host`, in the order given.
///
/// Callers wanting chronological links sort `events` by local counter first.
pub fn self_links<'a>(host: &'a HostId, events: &[&'a Event]) -> Vec<Link<'a>> {
    events
        .iter()
        .map(|&event| Link::ending_at(host, event))
        .collect()
}

/// Decides whether `source` sent a message directly to `target`.
///
/// # Rule
///
/// 1. Candidacy: `target`'s clock knows the source host, at exactly the
///    counter `source` reports for itself
/// 2. Directness: at most [`DIRECT_LINK_MAX_DIFFS`] hosts shared by both
///    clocks disagree
///
/// Events on the same host are never linked here.
pub fn is_direct_link(source: &Event, target: &Event) -> bool {
    if source.host() == target.host() {
        return false;
    }

    let origin = source.host().as_str();
    let (ours, theirs) = (source.clock(), target.clock());

    let observed = theirs
        .get(origin)
        .is_some_and(|seen| ours.get(origin) == Some(seen));
    if !observed {
        return false;
    }

    ours.differing_shared_hosts(theirs) <= DIRECT_LINK_MAX_DIFFS
}

/// Infers cross-host links by comparing every ordered pair of events.
///
/// Links are ordered by source event index, then target event index. Every
/// qualifying pair yields a link, so a target event may receive links from
/// several sources; no attempt is made to pick one.
///
/// # Complexity
///
/// O(E²) pair checks, each linear in clock size.
pub fn cross_links(events: &[Event], mode: InferenceMode) -> Vec<Link<'_>> {
    let links: Vec<Link<'_>> = match mode {
        InferenceMode::Sequential => events
            .iter()
            .flat_map(|source| links_from(source, events))
            .collect(),
        InferenceMode::Parallel => events
            .par_iter()
            .flat_map_iter(|source| links_from(source, events))
            .collect(),
    };

    for link in &links {
        tracing::trace!(
            source = %link.source,
            target = %link.target,
            timestamp = link.timestamp,
            "cross link"
        );
    }
    tracing::debug!(
        pairs = events.len() * events.len(),
        links = links.len(),
        "inferred cross links"
    );

    links
}

/// All direct links leaving `source`, in `events` order.
fn links_from<'a>(source: &'a Event, events: &'a [Event]) -> Vec<Link<'a>> {
    events
        .iter()
        .filter(|target| is_direct_link(source, target))
        .map(|target| Link::ending_at(source.host(), target))
        .collect()
}
