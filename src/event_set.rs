//! C3: pending event set and independence oracle.
//!
//! The pending set is an ordered multiset keyed by `(time, vertex_index)`.
//! Resolution note (see DESIGN.md): `original_source/OoO_EventSet.cpp`
//! marks an event dependent when `t_later - t_earlier >= ITL[earlier][later]`
//! — i.e. independent requires the gap to be *strictly less than* the
//! limit for every earlier pending event. That is what is implemented
//! here, matching spec section 4.3's predicate and invariant I1, even
//! though spec section 3's prose description of the ITL table reads
//! the comparison the other way around.
//!
//! Both ready-event scans re-test every non-`Executed` event on every
//! call rather than gating on `Idle` only: an event already marked
//! `Ready` but not picked up by the executor's batch this round must
//! still be re-offered next round, or it is never executed and never
//! removed from `E` (`original_source/OoO_EventSet.cpp`'s
//! `GetReadyEventsOoO_Serial` does the same full re-scan, not a
//! one-shot `Idle` transition).

use std::collections::{BTreeMap, VecDeque};

use ordered_float::OrderedFloat;

use crate::entity::Entity;
use crate::itl::ItlTable;
use crate::vertex::{NewEvent, VertexIndex};

/// Bounded scan window for the parallel-discovery variant of
/// `get_ready_events`, kept small so the inner independence loop stays
/// cache-friendly. Unused by the serial executor (which calls the
/// unbounded `get_ready_events_serial`), but preserved as a C3
/// operation for a future parallel extension per the design notes.
pub const OMEGA: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Idle,
    Ready,
    Executed,
}

/// One pending event. `new_events` is populated only after `run`
/// completes and is folded into `E` by `update_event_set`.
#[derive(Debug)]
struct PendingEvent {
    id: u64,
    vertex: VertexIndex,
    time: f64,
    entity: Option<Entity>,
    status: EventStatus,
    new_events: Vec<NewEvent>,
}

/// Opaque handle to a specific pending event, used by the executor to
/// drive it through `Ready -> Executed` without re-scanning `E`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHandle {
    key: (OrderedFloat<f64>, VertexIndex),
    id: u64,
}

impl EventHandle {
    pub fn vertex(&self) -> VertexIndex {
        self.key.1
    }

    pub fn time(&self) -> f64 {
        self.key.0.into_inner()
    }
}

/// Diagnostic report from the unbounded ready-event scan: the ready
/// events themselves, plus the mean/std of their positional indices
/// within `E` at scan time.
pub struct ReadyEventsReport {
    pub handles: Vec<EventHandle>,
    pub mean_index: f64,
    pub std_index: f64,
}

type Key = (OrderedFloat<f64>, VertexIndex);

pub struct EventSet {
    e: BTreeMap<Key, VecDeque<PendingEvent>>,
    itl: ItlTable,
    max_sim_time: f64,
    sim_time: f64,
    next_id: u64,
}

impl EventSet {
    pub fn new(itl: ItlTable, max_sim_time: f64) -> Self {
        Self {
            e: BTreeMap::new(),
            itl,
            max_sim_time,
            sim_time: 0.0,
            next_id: 0,
        }
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn max_sim_time(&self) -> f64 {
        self.max_sim_time
    }

    pub fn len(&self) -> usize {
        self.e.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.e.values().all(VecDeque::is_empty)
    }

    /// Returns the earliest pending event's `(time, vertex)`, if any.
    pub fn peek_first(&self) -> Option<(f64, VertexIndex)> {
        self.e
            .iter()
            .find(|(_, q)| !q.is_empty())
            .map(|(k, _)| (k.0.into_inner(), k.1))
    }

    /// Inserts a new `Idle` event directly.
    pub fn add_event(&mut self, vertex: VertexIndex, time: f64, entity: Option<Entity>) {
        let id = self.next_id;
        self.next_id += 1;
        let key = (OrderedFloat(time), vertex);
        self.e.entry(key).or_default().push_back(PendingEvent {
            id,
            vertex,
            time,
            entity,
            status: EventStatus::Idle,
            new_events: Vec::new(),
        });
    }

    /// Strict in-order pop: removes and returns the earliest pending
    /// event, taking its entity. Used only by the in-order executor
    /// (`mode == 0`), which never consults the ITL table.
    pub fn pop_earliest(&mut self) -> Option<(VertexIndex, f64, Option<Entity>)> {
        let key = *self.e.iter().find(|(_, q)| !q.is_empty())?.0;
        let queue = self.e.get_mut(&key).expect("key came from iteration");
        let event = queue.pop_front().expect("non-empty per find above");
        if queue.is_empty() {
            self.e.remove(&key);
        }
        Some((event.vertex, event.time, event.entity))
    }

    /// Bounded parallel-discovery variant of the independence scan:
    /// examines at most `OMEGA` candidates in `(time, vertex_index)`
    /// order, (re-)transitioning every independent non-`Executed` event
    /// to `Ready`. Re-tests events already `Ready` rather than skipping
    /// them — see the module docs for why a one-shot `Idle` gate loses
    /// events the executor didn't get to this round.
    pub fn get_ready_events(&mut self) -> Vec<EventHandle> {
        let itl = &self.itl;
        let mut ready = Vec::new();
        let mut earlier = Vec::new();
        let mut scanned = 0usize;
        'outer: for (&key, queue) in self.e.iter_mut() {
            for event in queue.iter_mut() {
                if scanned == OMEGA {
                    break 'outer;
                }
                scanned += 1;
                if event.status != EventStatus::Executed && is_independent(itl, &earlier, event.time, event.vertex) {
                    event.status = EventStatus::Ready;
                    ready.push(EventHandle { key, id: event.id });
                }
                earlier.push((event.time, event.vertex));
            }
        }
        ready
    }

    /// Unbounded ready-event scan with positional diagnostics. This is
    /// the variant the serial executor actually drives (spec 4.4: "scanned
    /// without the ω window in this mode"). Like `get_ready_events`, this
    /// re-tests every non-`Executed` event each call, so an event left
    /// `Ready` but unexecuted by the previous batch is re-offered instead
    /// of being skipped forever.
    pub fn get_ready_events_serial(&mut self) -> ReadyEventsReport {
        let itl = &self.itl;
        let mut ready = Vec::new();
        let mut earlier = Vec::new();
        let mut indices = Vec::new();
        let mut i = 0usize;
        for (&key, queue) in self.e.iter_mut() {
            for event in queue.iter_mut() {
                if event.status != EventStatus::Executed && is_independent(itl, &earlier, event.time, event.vertex) {
                    event.status = EventStatus::Ready;
                    ready.push(EventHandle { key, id: event.id });
                    indices.push(i as f64);
                }
                earlier.push((event.time, event.vertex));
                i += 1;
            }
        }
        let (mean, std) = mean_std(&indices);
        ReadyEventsReport {
            handles: ready,
            mean_index: mean,
            std_index: std,
        }
    }

    /// Executes the event identified by `handle`: runs its vertex body
    /// through `graph`, takes its entity, stores the emitted successor
    /// events, and transitions it `Ready -> Executed`.
    pub fn execute(
        &mut self,
        handle: EventHandle,
        graph: &mut crate::graph::VertexGraph,
    ) {
        let queue = self.e.get_mut(&handle.key).expect("handle refers to a live key");
        let event = queue
            .iter_mut()
            .find(|e| e.id == handle.id)
            .expect("handle refers to a live event");
        assert_eq!(
            event.status,
            EventStatus::Ready,
            "event {} at {} must be Ready before Execute",
            event.vertex,
            event.time
        );
        let entity = event.entity.take();
        let new_events = graph.execute(event.vertex, event.time, entity);
        event.new_events = new_events;
        event.status = EventStatus::Executed;
    }

    /// Folds every `Executed` event's successors into `E`, advances
    /// `sim_time`, and removes the executed events. Returns whether the
    /// simulation should continue.
    pub fn update_event_set(&mut self) -> bool {
        let mut to_insert: Vec<(VertexIndex, f64, Option<Entity>)> = Vec::new();
        let mut advanced_to = self.sim_time;

        for queue in self.e.values_mut() {
            queue.retain_mut(|event| {
                if event.status != EventStatus::Executed {
                    return true;
                }
                if event.time > advanced_to {
                    advanced_to = event.time;
                }
                for new_event in event.new_events.drain(..) {
                    to_insert.push((new_event.target, new_event.time, new_event.entity));
                }
                false
            });
        }
        self.e.retain(|_, q| !q.is_empty());
        self.sim_time = advanced_to;

        for (vertex, time, entity) in to_insert {
            self.add_event(vertex, time, entity);
        }

        !self.is_empty() && self.sim_time <= self.max_sim_time
    }
}

fn is_independent(itl: &ItlTable, earlier: &[(f64, VertexIndex)], time: f64, vertex: VertexIndex) -> bool {
    earlier.iter().all(|&(t_earlier, v_earlier)| {
        let gap = time - t_earlier;
        gap < itl.get(v_earlier, vertex)
    })
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::graph::VertexGraph;
    use crate::itl::build_itl;
    use crate::sv::SvIndex;
    use crate::vertex::Vertex;

    struct Noop {
        name: String,
        inputs: Vec<SvIndex>,
        outputs: Vec<SvIndex>,
    }

    impl Vertex for Noop {
        fn io_svs(&self) -> (&[SvIndex], &[SvIndex]) {
            (&self.inputs, &self.outputs)
        }
        fn run(
            &mut self,
            _t: f64,
            _e: Option<Entity>,
            _svs: &mut crate::sv::SvRegistry,
            _o: &mut Vec<NewEvent>,
        ) {
        }
        fn name(&self) -> &str {
            &self.name
        }
    }

    fn noop(name: &str, inputs: Vec<SvIndex>, outputs: Vec<SvIndex>) -> Box<dyn Vertex> {
        Box::new(Noop {
            name: name.to_string(),
            inputs,
            outputs,
        })
    }

    /// Spec scenario 4: self-loop, two events 0.5 apart with ITL[A][A]=1
    /// are not mutually independent.
    #[test]
    fn self_loop_events_are_dependent_within_the_limit() {
        let mut g = VertexGraph::new();
        let s0 = g.create_sv("s0", 0, -1, 100);
        let a = g.add_vertex(noop("A", vec![s0], vec![s0]));
        g.add_edge(a, a, 1.0);
        let itl = build_itl(&g);

        let mut es = EventSet::new(itl, 1000.0);
        es.add_event(a, 0.0, None);
        es.add_event(a, 0.5, None);

        let report = es.get_ready_events_serial();
        // Only the first (no earlier events to conflict with) is ready.
        assert_eq!(report.handles.len(), 1);
        assert_eq!(report.handles[0].time(), 0.0);
    }

    #[test]
    fn independent_islands_are_both_ready() {
        let mut g = VertexGraph::new();
        let s0 = g.create_sv("s0", 0, -1, 100);
        let s1 = g.create_sv("s1", 0, -1, 100);
        let a1 = g.add_vertex(noop("A1", vec![s0], vec![s0]));
        let a2 = g.add_vertex(noop("A2", vec![s1], vec![s1]));
        let itl = build_itl(&g);

        let mut es = EventSet::new(itl, 1000.0);
        es.add_event(a1, 0.0, None);
        es.add_event(a2, 0.0, None);

        let report = es.get_ready_events_serial();
        assert_eq!(report.handles.len(), 2);
    }

    #[test]
    fn update_event_set_removes_executed_and_folds_new_events() {
        let mut g = VertexGraph::new();
        let s0 = g.create_sv("s0", 0, -1, 100);
        let a = g.add_vertex(noop("A", vec![s0], vec![s0]));
        let itl = build_itl(&g);

        let mut es = EventSet::new(itl, 1000.0);
        es.add_event(a, 0.0, None);
        let report = es.get_ready_events_serial();
        assert_eq!(report.handles.len(), 1);
        es.execute(report.handles[0], &mut g);

        assert!(es.update_event_set());
        assert_eq!(es.sim_time(), 0.0);
        assert!(es.is_empty());
    }

    #[test]
    fn update_event_set_signals_termination_past_max_time() {
        let mut g = VertexGraph::new();
        let s0 = g.create_sv("s0", 0, -1, 100);
        let a = g.add_vertex(noop("A", vec![s0], vec![s0]));
        let itl = build_itl(&g);

        let mut es = EventSet::new(itl, 0.0);
        es.add_event(a, 5.0, None);
        let report = es.get_ready_events_serial();
        es.execute(report.handles[0], &mut g);
        assert!(!es.update_event_set());
    }

    #[test]
    fn empty_event_set_has_no_first_event() {
        let g = VertexGraph::new();
        let itl = build_itl(&g);
        let es = EventSet::new(itl, 10.0);
        assert!(es.is_empty());
        assert_eq!(es.peek_first(), None);
    }
}
