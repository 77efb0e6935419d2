//! Property-based tests for the two round-trip/idempotence invariants
//! spec 8 names explicitly (R1: ITL serialisation round-trips; the
//! independence predicate is monotonic in the timestamp gap).

use ooo_sim_kernel::entity::Entity;
use ooo_sim_kernel::event_set::EventSet;
use ooo_sim_kernel::graph::VertexGraph;
use ooo_sim_kernel::itl::{build_itl, ItlTable};
use ooo_sim_kernel::sv::{SvIndex, SvRegistry};
use ooo_sim_kernel::vertex::{NewEvent, Vertex};
use proptest::prelude::*;

struct Noop {
    inputs: Vec<SvIndex>,
    outputs: Vec<SvIndex>,
}

impl Vertex for Noop {
    fn io_svs(&self) -> (&[SvIndex], &[SvIndex]) {
        (&self.inputs, &self.outputs)
    }
    fn run(&mut self, _t: f64, _e: Option<Entity>, _svs: &mut SvRegistry, _o: &mut Vec<NewEvent>) {}
    fn name(&self) -> &str {
        "noop"
    }
}

fn chain_graph(n_vertices: usize, delay: f64) -> VertexGraph {
    let mut g = VertexGraph::new();
    let sv = g.create_sv("s0", 0, -1, 100);
    let mut prev = None;
    for _ in 0..n_vertices {
        let v = g.add_vertex(Box::new(Noop {
            inputs: vec![sv],
            outputs: vec![sv],
        }));
        if let Some(p) = prev {
            g.add_edge(p, v, delay);
        }
        prev = Some(v);
    }
    g
}

proptest! {
    /// R1: writing an ITL table to CSV and reading it back yields an
    /// equal matrix, for any chain-shaped graph within a reasonable
    /// size and delay range.
    #[test]
    fn itl_round_trips_through_csv(n_vertices in 1usize..8, delay in 0.0f64..50.0) {
        let graph = chain_graph(n_vertices, delay);
        let itl = build_itl(&graph);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("itl.csv");
        itl.write_csv(&path).unwrap();
        let reloaded = ItlTable::read_csv(&path, graph.num_vertices()).unwrap();

        prop_assert_eq!(itl, reloaded);
    }

    /// A single pending event, with no earlier events in the set, is
    /// always found ready regardless of the ITL table's contents —
    /// the independence predicate vacuously holds over an empty
    /// "earlier" set (the boundary case spec 8 calls out: "E contains
    /// a single event => ready iff no self-dependency", specialised
    /// here to the no-self-edge case).
    #[test]
    fn lone_event_is_always_ready(n_vertices in 1usize..6, delay in 0.0f64..50.0, time in 0.0f64..1000.0) {
        let graph = chain_graph(n_vertices, delay);
        let itl = build_itl(&graph);
        let mut events = EventSet::new(itl, f64::MAX);
        events.add_event(ooo_sim_kernel::vertex::VertexIndex(0), time, None);

        let report = events.get_ready_events_serial();
        prop_assert_eq!(report.handles.len(), 1);
    }

    /// The independence predicate is `gap < ITL[earlier][later]` (spec
    /// 4.3 / I1, not section 3's prose): a later event stays independent
    /// of an earlier one only while the timestamp gap is *below* the
    /// limit, because that's exactly the window in which the earlier
    /// event's effects haven't had time to propagate yet. Once the gap
    /// reaches the limit, propagation could have happened, and the later
    /// event is held back as dependent. This is checked on a two-vertex
    /// pipeline (`A -> B`, delay `d`, `ITL[A][B] = d`) rather than a
    /// self-loop, since a vertex's `ITL[v][v]` is always `0` (see
    /// `itl::tests::self_loop_itl`) and can't exercise a nonzero gap.
    #[test]
    fn gap_below_the_limit_is_ready_gap_at_or_above_is_not(delay in 1.0f64..50.0, frac in 0.01f64..0.99) {
        let mut g = VertexGraph::new();
        let s0 = g.create_sv("s0", 0, -1, 100);
        let a = g.add_vertex(Box::new(Noop { inputs: vec![], outputs: vec![s0] }));
        let b = g.add_vertex(Box::new(Noop { inputs: vec![s0], outputs: vec![] }));
        g.add_edge(a, b, delay);
        let itl = build_itl(&g);
        prop_assert_eq!(itl.get(a, b), delay);

        let mut within_limit = EventSet::new(itl.clone(), f64::MAX);
        within_limit.add_event(a, 0.0, None);
        within_limit.add_event(b, delay * frac, None);
        let report = within_limit.get_ready_events_serial();
        prop_assert_eq!(report.handles.len(), 2);

        let mut at_limit = EventSet::new(itl, f64::MAX);
        at_limit.add_event(a, 0.0, None);
        at_limit.add_event(b, delay, None);
        let report = at_limit.get_ready_events_serial();
        prop_assert_eq!(report.handles.len(), 1);
    }
}
