//! Generation events and pacing.
//!
//! Events are how a renderer or recorder follows a run: the engine reports
//! commits, seals and attempt outcomes, and once per successful run the
//! terminal tile and main path. Pacing is a hook called before every socket
//! step; it may sleep for visualization or ask the run to stop.

use std::time::Duration;

use dungen_logic::geometry::Vec3;
use serde::Serialize;

use crate::components::TileId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GenerationEvent {
    AttemptStarted {
        attempt: u32,
    },
    TileCommitted {
        tile: TileId,
        parent: Option<TileId>,
        depth: u32,
        position: Vec3,
    },
    /// A candidate template found no clear socket for this target.
    CandidateRejected {
        template: usize,
        target: TileId,
        socket: usize,
    },
    SocketSealed {
        tile: TileId,
        socket: usize,
    },
    AttemptFailed {
        attempt: u32,
        placed: u32,
        target: u32,
    },
    TerminalIdentified {
        tile: TileId,
        depth: u32,
        position: Vec3,
    },
    MainPath {
        tiles: Vec<TileId>,
        positions: Vec<Vec3>,
    },
}

/// Receiver for generation events.
pub trait EventSink {
    fn send(&mut self, event: GenerationEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn send(&mut self, _event: GenerationEvent) {}
}

/// Records every event in order.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub events: Vec<GenerationEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts_started(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GenerationEvent::AttemptStarted { .. }))
            .count()
    }

    pub fn failed_attempts(&self) -> Vec<(u32, u32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GenerationEvent::AttemptFailed {
                    attempt, placed, ..
                } => Some((*attempt, *placed)),
                _ => None,
            })
            .collect()
    }

    pub fn terminal(&self) -> Option<TileId> {
        self.events.iter().rev().find_map(|e| match e {
            GenerationEvent::TerminalIdentified { tile, .. } => Some(*tile),
            _ => None,
        })
    }
}

impl EventSink for VecSink {
    fn send(&mut self, event: GenerationEvent) {
        self.events.push(event);
    }
}

/// Forwards events to a closure.
pub struct FnSink<F>(pub F);

impl<F: FnMut(GenerationEvent)> EventSink for FnSink<F> {
    fn send(&mut self, event: GenerationEvent) {
        (self.0)(event)
    }
}

/// Decision returned by a pacer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Stop the run; every tile of the attempt is destroyed.
    Abort,
}

/// Hook invoked before each socket step. `step` counts from 1 across the
/// whole call to the generator.
pub trait Pacer {
    fn pause(&mut self, step: u64) -> Flow;
}

/// Runs straight through.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unpaced;

impl Pacer for Unpaced {
    fn pause(&mut self, _step: u64) -> Flow {
        Flow::Continue
    }
}

/// Sleeps a fixed duration per step. A zero duration never sleeps.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl Pacer for FixedDelay {
    fn pause(&mut self, _step: u64) -> Flow {
        if !self.0.is_zero() {
            std::thread::sleep(self.0);
        }
        Flow::Continue
    }
}

/// Delegates to a closure, e.g. to abort after a step budget.
pub struct FnPacer<F>(pub F);

impl<F: FnMut(u64) -> Flow> Pacer for FnPacer<F> {
    fn pause(&mut self, step: u64) -> Flow {
        (self.0)(step)
    }
}
