//! Synthetic ShiViz logs.
//!
//! Processes `Proc0`, `Proc1`, .. each record an initialization event, then
//! exchange messages and record local events at random. A local event ticks
//! its process's clock. A message ticks the sender, then ticks the receiver
//! and merges the sender's clock into it.
//!
//! Generation is deterministic for a given [`GeneratorConfig::seed`].

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::clock::VectorClock;
use crate::event::{Event, EventError};
use crate::types::HostId;

/// Pattern matching the entries of a generated log. It is also the log's
/// first line, as ShiViz expects.
pub const SHIVIZ_PATTERN: &str = r"(?<host>\S*) (?<clock>{.*})\n(?<event>.*)";

/// Parameters that cannot produce a log.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("a log needs at least one process")]
    NoProcesses,

    #[error("messages need at least two processes, got {processes}")]
    TooFewProcesses { processes: usize },

    #[error("network event ratio {ratio} is outside 0..=1")]
    InvalidRatio { ratio: f64 },

    #[error(transparent)]
    Event(#[from] EventError),
}

/// A parameter drawn at random before generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variation {
    /// Network ratio drawn from 0.1, 0.2, .., 1.0.
    Ratio,
    /// 2 to 24 processes.
    Processes,
    /// 6000 to 12000 events, in steps of 1000.
    Events,
}

impl Variation {
    fn apply(self, mut config: GeneratorConfig, rng: &mut StdRng) -> GeneratorConfig {
        match self {
            Self::Ratio => config.ratio = f64::from(rng.gen_range(1..=10_u8)) / 10.0,
            Self::Processes => config.processes = rng.gen_range(2..=24),
            Self::Events => config.events = rng.gen_range(6..=12) * 1000,
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub processes: usize,
    /// Events to generate, initialization events included. A message that
    /// starts on the last slot may overshoot by one.
    pub events: usize,
    /// Share of `events` that are message sends or receives.
    pub ratio: f64,
    pub seed: u64,
    pub variation: Option<Variation>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            processes: 4,
            events: 100,
            ratio: 0.5,
            seed: 0,
            variation: None,
        }
    }
}

/// The send and receive events of one message, as indices into
/// [`GeneratedLog::events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub send: usize,
    pub receive: usize,
}

/// A generated run. `Display` renders it as a ShiViz log.
#[derive(Debug, Clone)]
pub struct GeneratedLog {
    /// The parameters used, after any [`Variation`] was drawn.
    pub config: GeneratorConfig,
    pub events: Vec<Event>,
    pub messages: Vec<Message>,
}

impl fmt::Display for GeneratedLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{SHIVIZ_PATTERN}")?;
        writeln!(f)?;
        for event in &self.events {
            writeln!(f, "{} {}", event.host(), event.clock())?;
            writeln!(f, "{}", event.description())?;
        }
        Ok(())
    }
}

/// Generates a log from `config`.
///
/// # Algorithm
///
/// 1. Every process ticks once and records "Initialization complete"
/// 2. The remaining budget is split into local events, `(1 - ratio)` of
///    `events`, and network events, the rest
/// 3. While both budgets remain a coin flip picks the kind of the next step,
///    otherwise the remaining kind is used
/// 4. Processes are drawn among those still under their share
///    (`events / processes`), falling back to any process when none is
///    left under it
pub fn generate(config: &GeneratorConfig) -> Result<GeneratedLog, GeneratorError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let config = config
        .variation
        .map_or(*config, |variation| variation.apply(*config, &mut rng));

    if !(0.0..=1.0).contains(&config.ratio) {
        return Err(GeneratorError::InvalidRatio {
            ratio: config.ratio,
        });
    }
    if config.processes == 0 {
        return Err(GeneratorError::NoProcesses);
    }

    let mut local_left = local_budget(config.events, config.ratio);
    let mut network_left = config.events - local_left;
    if network_left > 0 && config.processes < 2 {
        return Err(GeneratorError::TooFewProcesses {
            processes: config.processes,
        });
    }

    let mut run = Run::new(config.processes, config.events / config.processes)?;
    for id in 0..config.processes {
        run.local(id, "Initialization complete")?;
    }

    while run.events.len() < config.events && (local_left > 0 || network_left > 0) {
        let send = match (local_left > 0, network_left > 0) {
            (true, true) => rng.gen_bool(0.5),
            (has_local, _) => !has_local,
        };

        if send {
            let src = run.pick(&mut rng, None);
            let dst = run.pick(&mut rng, Some(src));
            run.message(src, dst)?;
            network_left = network_left.saturating_sub(2);
        } else {
            let id = run.pick(&mut rng, None);
            run.local(id, "Local log message")?;
            run.counts[id] += 1;
            local_left -= 1;
        }
    }

    tracing::debug!(
        processes = config.processes,
        events = run.events.len(),
        messages = run.messages.len(),
        seed = config.seed,
        "generated log"
    );

    Ok(GeneratedLog {
        config,
        events: run.events,
        messages: run.messages,
    })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn local_budget(events: usize, ratio: f64) -> usize {
    ((1.0 - ratio) * events as f64) as usize
}

/// Clocks and output of a run in progress.
struct Run {
    hosts: Vec<HostId>,
    clocks: Vec<VectorClock>,
    /// Events per process, initialization excluded.
    counts: Vec<usize>,
    share: usize,
    events: Vec<Event>,
    messages: Vec<Message>,
}

impl Run {
    fn new(processes: usize, share: usize) -> Result<Self, EventError> {
        let hosts = (0..processes)
            .map(|id| HostId::new(format!("Proc{id}")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            hosts,
            clocks: vec![VectorClock::default(); processes],
            counts: vec![0; processes],
            share,
            events: Vec::new(),
            messages: Vec::new(),
        })
    }

    /// Records the current clock of process `id` as an event, returning its index.
    fn record(&mut self, id: usize, description: String) -> Result<usize, EventError> {
        let event = Event::new(self.hosts[id].clone(), self.clocks[id].clone(), description)?;
        self.events.push(event);
        Ok(self.events.len() - 1)
    }

    fn local(&mut self, id: usize, description: &str) -> Result<(), EventError> {
        self.clocks[id].tick(self.hosts[id].as_str());
        self.record(id, description.to_string())?;
        Ok(())
    }

    fn message(&mut self, src: usize, dst: usize) -> Result<(), EventError> {
        self.clocks[src].tick(self.hosts[src].as_str());
        let send = self.record(src, format!("Sending message to {}", self.hosts[dst]))?;

        self.clocks[dst].tick(self.hosts[dst].as_str());
        let sent = self.clocks[src].clone();
        self.clocks[dst].merge(&sent);
        let receive = self.record(dst, format!("Received message from {}", self.hosts[src]))?;

        self.messages.push(Message { send, receive });
        self.counts[src] += 1;
        self.counts[dst] += 1;
        Ok(())
    }

    /// Draws a process other than `exclude`, preferring those within their share.
    fn pick(&self, rng: &mut StdRng, exclude: Option<usize>) -> usize {
        let allowed = |id: &usize| Some(*id) != exclude;
        let under_share: Vec<usize> = (0..self.hosts.len())
            .filter(allowed)
            .filter(|&id| self.counts[id] <= self.share)
            .collect();
        let pool = if under_share.is_empty() {
            (0..self.hosts.len()).filter(allowed).collect()
        } else {
            under_share
        };
        pool[rng.gen_range(0..pool.len())]
    }
}
