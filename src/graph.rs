//! C1: vertex graph and state-variable registry.
//!
//! Static description of event-producing sites, their read/write
//! footprints over state variables, and weighted directed edges.
//! Populated once by an external model before the ITL builder (`itl.rs`)
//! runs; immutable thereafter except for SV values, which vertex `run`
//! bodies mutate through the registry.

use crate::entity::Entity;
use crate::sv::{SvIndex, SvRegistry};
use crate::vertex::{Edge, NewEvent, Vertex, VertexIndex};

/// Owns the vertex arena, the SV registry, and the edge list.
///
/// Vertices own back-references to neighbours only as indices — per
/// the "cyclic ownership via back-references" design note, the arena
/// is the sole owner and all links elsewhere are index-based.
pub struct VertexGraph {
    vertices: Vec<Box<dyn Vertex>>,
    inputs: Vec<Vec<SvIndex>>,
    outputs: Vec<Vec<SvIndex>>,
    edges: Vec<Edge>,
    out_edges: Vec<Vec<(VertexIndex, f64)>>,
    svs: SvRegistry,
    exec_counts: Vec<u64>,
}

impl VertexGraph {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            edges: Vec::new(),
            out_edges: Vec::new(),
            svs: SvRegistry::new(),
            exec_counts: Vec::new(),
        }
    }

    pub fn svs(&self) -> &SvRegistry {
        &self.svs
    }

    pub fn svs_mut(&mut self) -> &mut SvRegistry {
        &mut self.svs
    }

    /// Creates an SV through the registry. Exposed here so model
    /// builders only need a handle to the graph.
    pub fn create_sv(&mut self, name: impl Into<String>, initial: i64, min: i64, max: i64) -> SvIndex {
        self.svs.create(name, initial, min, max)
    }

    /// Adds a vertex, reading its declared `(I, O)` sets once and
    /// assigning it the next monotone vertex index.
    pub fn add_vertex(&mut self, vertex: Box<dyn Vertex>) -> VertexIndex {
        let index = VertexIndex(self.vertices.len());
        let (inputs, outputs) = vertex.io_svs();
        let mut inputs = inputs.to_vec();
        let mut outputs = outputs.to_vec();
        inputs.sort_unstable();
        inputs.dedup();
        outputs.sort_unstable();
        outputs.dedup();
        self.inputs.push(inputs);
        self.outputs.push(outputs);
        self.vertices.push(vertex);
        self.out_edges.push(Vec::new());
        self.exec_counts.push(0);
        index
    }

    /// Adds a directed edge. `min_delay` must be non-negative.
    pub fn add_edge(&mut self, from: VertexIndex, to: VertexIndex, min_delay: f64) {
        let edge = Edge::new(from, to, min_delay);
        self.out_edges[from.0].push((to, min_delay));
        self.edges.push(edge);
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_svs(&self) -> usize {
        self.svs.num_svs()
    }

    pub fn inputs(&self, v: VertexIndex) -> &[SvIndex] {
        &self.inputs[v.0]
    }

    pub fn outputs(&self, v: VertexIndex) -> &[SvIndex] {
        &self.outputs[v.0]
    }

    pub fn out_edges(&self, v: VertexIndex) -> &[(VertexIndex, f64)] {
        &self.out_edges[v.0]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_name(&self, v: VertexIndex) -> &str {
        self.vertices[v.0].name()
    }

    /// Number of times `execute` has run this vertex. Purely
    /// observational (spec 3's "execution counter").
    pub fn exec_count(&self, v: VertexIndex) -> u64 {
        self.exec_counts[v.0]
    }

    /// Runs the vertex body at `v`, mutating SVs through the registry
    /// and collecting its emitted successor events.
    pub fn execute(&mut self, v: VertexIndex, time: f64, entity: Option<Entity>) -> Vec<NewEvent> {
        let mut out = Vec::new();
        assert!(v.0 < self.vertices.len(), "unknown vertex index {v}");
        self.vertices[v.0].run(time, entity, &mut self.svs, &mut out);
        self.exec_counts[v.0] += 1;
        out
    }
}

impl Default for VertexGraph {
    fn default() -> Self {
        Self::new()
    }
}
