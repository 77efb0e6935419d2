//! # ooo-sim-kernel: out-of-order discrete-event simulation kernel
//!
//! A discrete-event kernel built around a precomputed Independence Time
//! Limit (ITL) table: an all-pairs bound on how far apart in simulated
//! time two pending events at a given pair of vertices must be before
//! they are certified safe to execute out of their chronological order.
//!
//! ## Architecture
//!
//! ```text
//!            +------------------+
//!            |  RunConfig (C0)  |   config.rs
//!            +--------+---------+
//!                     |
//!                     v
//!  +------------+  +------------------+  +-----------------+
//!  | VertexGraph|->|  ItlTable (C2)   |->|  EventSet (C3)   |
//!  |   (C1)     |  |     itl.rs       |  |  event_set.rs    |
//!  | graph.rs   |  +------------------+  +--------+---------+
//!  +------------+                                 |
//!                                                  v
//!                                       +----------------------+
//!                                       | SerialExecutor (C4)  |
//!                                       |     executor.rs       |
//!                                       +----------------------+
//! ```
//!
//! `VertexGraph` (C1) is a static description of event-producing sites
//! and their read/write footprints over [`sv::StateVariable`]s. The ITL
//! builder (C2) runs once, ahead of any event, to derive the
//! independence oracle the event set (C3) consults while searching for
//! a ready batch. The executor (C4) drives the loop in one of three
//! modes selected by a single integer.
//!
//! ## Quick start
//!
//! ```
//! use ooo_sim_kernel::entity::Entity;
//! use ooo_sim_kernel::event_set::EventSet;
//! use ooo_sim_kernel::executor::{ExecMode, SerialExecutor};
//! use ooo_sim_kernel::graph::VertexGraph;
//! use ooo_sim_kernel::itl::build_itl;
//! use ooo_sim_kernel::sv::SvRegistry;
//! use ooo_sim_kernel::vertex::{NewEvent, Vertex};
//!
//! struct Forwarder {
//!     name: String,
//!     out_sv: ooo_sim_kernel::sv::SvIndex,
//! }
//!
//! impl Vertex for Forwarder {
//!     fn io_svs(&self) -> (&[ooo_sim_kernel::sv::SvIndex], &[ooo_sim_kernel::sv::SvIndex]) {
//!         (&[], std::slice::from_ref(&self.out_sv))
//!     }
//!     fn run(&mut self, _t: f64, _e: Option<Entity>, svs: &mut SvRegistry, _out: &mut Vec<NewEvent>) {
//!         svs.get_mut(self.out_sv).inc(1);
//!     }
//!     fn name(&self) -> &str {
//!         &self.name
//!     }
//! }
//!
//! let mut graph = VertexGraph::new();
//! let s0 = graph.create_sv("s0", 0, -1, 100);
//! let a = graph.add_vertex(Box::new(Forwarder { name: "A".into(), out_sv: s0 }));
//!
//! let itl = build_itl(&graph);
//! let mut events = EventSet::new(itl, 100.0);
//! events.add_event(a, 0.0, None);
//!
//! let mut executor = SerialExecutor::new(ExecMode::InOrder, 1, false);
//! let summary = executor.run(&mut graph, &mut events, None, None).unwrap();
//! assert_eq!(summary.events_executed, 1);
//! ```
//!
//! ## Out of scope
//!
//! Concrete network topologies (queueing networks, specific arrival
//! processes) are left to callers building on top of [`vertex::Vertex`]
//! and [`graph::VertexGraph`]; this crate owns the kernel, not the
//! models run on it. See `demos/pipeline.rs` for a minimal example
//! model.

pub mod config;
pub mod entity;
pub mod error;
pub mod event_set;
pub mod executor;
pub mod graph;
pub mod itl;
pub mod rng;
pub mod sv;
pub mod trace;
pub mod vertex;

pub use error::{SimError, SimResult};
