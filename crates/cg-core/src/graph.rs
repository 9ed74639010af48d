//! Assembly of the final host graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::event::Event;
use crate::inference::{InferenceMode, Link, cross_links, self_links};
use crate::types::HostId;

/// A host in the assembled graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node<'a> {
    pub id: &'a HostId,
    pub description: String,
}

/// Hosts and the causal links between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Graph<'a> {
    pub nodes: Vec<Node<'a>>,
    pub links: Vec<Link<'a>>,
}

/// Counts describing a built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub hosts: usize,
    pub self_links: usize,
    pub cross_links: usize,
}

impl<'a> Graph<'a> {
    pub fn stats(&self) -> GraphStats {
        let self_links = self.links.iter().filter(|l| l.is_self_link()).count();
        GraphStats {
            hosts: self.nodes.len(),
            self_links,
            cross_links: self.links.len() - self_links,
        }
    }

    /// Host ids in node order.
    pub fn hosts(&self) -> impl Iterator<Item = &'a HostId> {
        self.nodes.iter().map(|node| node.id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

/// Combines hosts and links into a graph.
///
/// One node is created per distinct host, sorted by id, with an empty
/// description. Links are kept exactly as given.
pub fn assemble<'a>(
    hosts: impl IntoIterator<Item = &'a HostId>,
    links: Vec<Link<'a>>,
) -> Graph<'a> {
    let nodes = hosts
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|id| Node {
            id,
            description: String::new(),
        })
        .collect();

    Graph { nodes, links }
}

/// Runs the full inference pipeline over `events`.
///
/// # Algorithm
///
/// 1. Partition events by host (hosts in sorted order)
/// 2. Within each host, sort events by local counter (stable)
/// 3. Emit one self link per event
/// 4. Append cross links over all events, in input order
/// 5. Assemble nodes and links
pub fn build_graph(events: &[Event], mode: InferenceMode) -> Graph<'_> {
    let mut by_host: BTreeMap<&HostId, Vec<&Event>> = BTreeMap::new();
    for event in events {
        by_host.entry(event.host()).or_default().push(event);
    }

    let mut links = Vec::new();
    for (host, host_events) in &mut by_host {
        host_events.sort_by_key(|e| e.local_counter());
        links.extend(self_links(*host, host_events));
    }
    let self_count = links.len();
    tracing::debug!(
        hosts = by_host.len(),
        self_links = self_count,
        "built self links"
    );

    links.extend(cross_links(events, mode));

    let graph = assemble(by_host.into_keys(), links);
    tracing::debug!(stats = ?graph.stats(), "assembled graph");
    graph
}
