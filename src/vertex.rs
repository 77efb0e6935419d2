//! The vertex model abstraction: the kernel's dynamic-dispatch seam.
//!
//! Vertices are stored behind `Box<dyn Vertex>` in an index-addressed
//! arena (see `graph.rs`) rather than as an enum, per the "dynamic
//! dispatch over vertex bodies" design note: the kernel needs to call
//! `run` on heterogeneous vertex kinds without knowing them ahead of
//! time (topology modules are out of scope for this crate, and add
//! their own vertex kinds against this trait).

use std::fmt;

use crate::entity::Entity;
use crate::sv::{SvIndex, SvRegistry};

/// Index of a vertex, assigned in monotone creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexIndex(pub usize);

impl fmt::Display for VertexIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v#{}", self.0)
    }
}

/// A new event a vertex's `run` body wants scheduled.
///
/// `time` must be `>= ` the firing event's own time; the spec notes
/// this invariant is undefined-but-unchecked if violated by a vertex
/// author, so we don't assert it here either.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub target: VertexIndex,
    pub time: f64,
    pub entity: Option<Entity>,
}

impl NewEvent {
    pub fn new(target: VertexIndex, time: f64, entity: Option<Entity>) -> Self {
        Self { target, time, entity }
    }
}

/// The capability set every event-producing site in the graph exposes
/// to the kernel: declare I/O footprint, execute.
pub trait Vertex {
    /// Read-set and write-set of SV indices. Fixed after construction.
    fn io_svs(&self) -> (&[SvIndex], &[SvIndex]);

    /// Executes this vertex for one event, mutating SVs only through
    /// the registry handed in by the caller and appending zero or more
    /// successor events to `out_new_events`.
    fn run(
        &mut self,
        time: f64,
        entity: Option<Entity>,
        svs: &mut SvRegistry,
        out_new_events: &mut Vec<NewEvent>,
    );

    /// Human-readable name, used in traces and diagnostics.
    fn name(&self) -> &str;
}

/// A directed edge asserting a minimum propagation delay between two
/// vertices: an event fired at `from` cannot cause a new event at `to`
/// sooner than `min_delay` simulation-time units later.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub from: VertexIndex,
    pub to: VertexIndex,
    pub min_delay: f64,
}

impl Edge {
    pub fn new(from: VertexIndex, to: VertexIndex, min_delay: f64) -> Self {
        assert!(min_delay >= 0.0, "edge delay must be non-negative, got {min_delay}");
        Self { from, to, min_delay }
    }
}
