//! C4: serial executor.
//!
//! Drives the simulation loop in one of three modes selected by an
//! integer (spec 4.4): strict in-order (`mode == 0`), power-of-two OoO
//! batches (`mode > 0`), or percentage OoO batches via seeded shuffle
//! (`mode < 0`).

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::SimResult;
use crate::event_set::EventSet;
use crate::graph::VertexGraph;
use crate::rng::SimRng;
use crate::trace::{load_reference_trace, ExecutionTrace};

/// Execution mode selector. `0` is strict in-order; `Positive(n)` is a
/// power-of-two OoO batch of size `2^n`; `Percentage(p)` executes a
/// random `p%` of the ready set (`p = -mode * 10` in spec terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    InOrder,
    PowerOfTwoBatch(u32),
    PercentageBatch(u32),
}

impl ExecMode {
    /// Parses the spec's `num_serial_OoO_execs` integer selector.
    pub fn from_mode(mode: i32) -> Self {
        match mode.cmp(&0) {
            std::cmp::Ordering::Equal => ExecMode::InOrder,
            std::cmp::Ordering::Greater => ExecMode::PowerOfTwoBatch(mode as u32),
            std::cmp::Ordering::Less => ExecMode::PercentageBatch((-mode) as u32 * 10),
        }
    }
}

/// Summary statistics returned once the simulation terminates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecSummary {
    pub events_executed: u64,
    pub final_sim_time: f64,
}

pub struct SerialExecutor {
    mode: ExecMode,
    rng: SimRng,
    events_executed: u64,
    trace: Option<ExecutionTrace>,
}

impl SerialExecutor {
    pub fn new(mode: ExecMode, seed: u64, tracing_enabled: bool) -> Self {
        Self {
            mode,
            rng: SimRng::new(seed),
            events_executed: 0,
            trace: tracing_enabled.then(ExecutionTrace::new),
        }
    }

    pub fn events_executed(&self) -> u64 {
        self.events_executed
    }

    /// Runs to termination and, if a trace was requested, writes it to
    /// `trace_path`. If `reference_trace_path` is also supplied, the
    /// OoO run reports match/displacement stats instead of a raw trace
    /// (spec 4.4) — only meaningful for the OoO modes.
    pub fn run(
        &mut self,
        graph: &mut VertexGraph,
        events: &mut EventSet,
        trace_path: Option<&Path>,
        reference_trace_path: Option<&Path>,
    ) -> SimResult<ExecSummary> {
        match self.mode {
            ExecMode::InOrder => self.run_in_order(graph, events),
            ExecMode::PowerOfTwoBatch(_) | ExecMode::PercentageBatch(_) => {
                self.run_out_of_order(graph, events)
            }
        }

        if let Some(trace) = &self.trace {
            if let (Some(trace_path), Some(reference_path)) = (trace_path, reference_trace_path) {
                let reference = load_reference_trace(reference_path)?;
                trace.compare_and_write(&reference, trace_path)?;
            } else if let Some(trace_path) = trace_path {
                trace.write_plain(trace_path)?;
            }
        }

        Ok(ExecSummary {
            events_executed: self.events_executed,
            final_sim_time: events.sim_time(),
        })
    }

    fn record_trace(&mut self, time: f64, vertex_name: &str) {
        if let Some(trace) = &mut self.trace {
            trace.record(self.events_executed, time, vertex_name);
        }
    }

    /// `mode == 0`: pop earliest, execute, advance, repeat. No
    /// independence test — the in-order schedule is trivially correct.
    fn run_in_order(&mut self, graph: &mut VertexGraph, events: &mut EventSet) {
        loop {
            let Some((time, _vertex)) = events.peek_first() else {
                break;
            };
            if time > events.max_sim_time() {
                break;
            }
            let Some((vertex, time, entity)) = events.pop_earliest() else {
                break;
            };
            let name = graph.vertex_name(vertex).to_string();
            let new_events = graph.execute(vertex, time, entity);
            for new_event in new_events {
                events.add_event(new_event.target, new_event.time, new_event.entity);
            }
            self.events_executed += 1;
            self.record_trace(time, &name);
            debug!(vertex = %name, time, "executed in-order");
        }
        info!(executed = self.events_executed, "in-order run complete");
    }

    /// `mode != 0`: repeatedly fetch the unbounded ready-event report,
    /// execute a subset per the mode, fold results back in.
    fn run_out_of_order(&mut self, graph: &mut VertexGraph, events: &mut EventSet) {
        loop {
            let report = events.get_ready_events_serial();
            if report.handles.is_empty() && events.is_empty() {
                break;
            }

            let to_execute = self.select_batch(report.handles);
            for handle in &to_execute {
                let name = graph.vertex_name(handle.vertex()).to_string();
                events.execute(*handle, graph);
                self.events_executed += 1;
                self.record_trace(handle.time(), &name);
            }

            if !events.update_event_set() {
                break;
            }
        }
        info!(executed = self.events_executed, mode = ?self.mode, "out-of-order run complete");
    }

    fn select_batch(
        &mut self,
        mut ready: Vec<crate::event_set::EventHandle>,
    ) -> Vec<crate::event_set::EventHandle> {
        match self.mode {
            ExecMode::PowerOfTwoBatch(n) => {
                let batch_size = 2usize.saturating_pow(n);
                ready.truncate(batch_size.min(ready.len()));
                ready
            }
            ExecMode::PercentageBatch(pct) => {
                let num = ((ready.len() as f64) * (pct as f64) / 100.0).ceil() as usize;
                self.rng.shuffle(&mut ready);
                ready.truncate(num.min(ready.len()));
                ready
            }
            ExecMode::InOrder => ready,
        }
    }
}

/// Default location for the ITL table cache, relative to the current
/// working directory (spec 6: "relative to the executable's directory").
pub fn default_itl_cache_path(model_name: &str) -> PathBuf {
    PathBuf::from("ITL_tables").join(format!("{model_name}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::itl::build_itl;
    use crate::sv::SvIndex;
    use crate::vertex::{NewEvent, Vertex};

    struct Incrementer {
        name: String,
        inputs: Vec<SvIndex>,
        outputs: Vec<SvIndex>,
    }

    impl Vertex for Incrementer {
        fn io_svs(&self) -> (&[SvIndex], &[SvIndex]) {
            (&self.inputs, &self.outputs)
        }
        fn run(
            &mut self,
            _time: f64,
            _entity: Option<Entity>,
            svs: &mut crate::sv::SvRegistry,
            _out: &mut Vec<NewEvent>,
        ) {
            for &sv in &self.outputs {
                if svs.get(sv).get() < 50 {
                    svs.get_mut(sv).inc(1);
                }
            }
        }
        fn name(&self) -> &str {
            &self.name
        }
    }

    /// Spec scenario 1: two-vertex pipeline, in-order vs OoO agree.
    #[test]
    fn in_order_and_power_of_two_ooo_agree_on_event_count() {
        let build = || {
            let mut g = VertexGraph::new();
            let s0 = g.create_sv("s0", 0, -1, 100);
            let s1 = g.create_sv("s1", 0, -1, 100);
            let a = g.add_vertex(Box::new(Incrementer {
                name: "A".into(),
                inputs: vec![s0],
                outputs: vec![s0],
            }));
            let b = g.add_vertex(Box::new(Incrementer {
                name: "B".into(),
                inputs: vec![s0],
                outputs: vec![s1],
            }));
            g.add_edge(a, b, 5.0);
            (g, a, b)
        };

        let (mut g1, a1, _b1) = build();
        let itl1 = build_itl(&g1);
        let mut es1 = EventSet::new(itl1, 100.0);
        es1.add_event(a1, 0.0, None);
        es1.add_event(a1, 3.0, None);
        let mut exec1 = SerialExecutor::new(ExecMode::InOrder, 1, false);
        let summary1 = exec1.run(&mut g1, &mut es1, None, None).unwrap();

        let (mut g2, a2, _b2) = build();
        let itl2 = build_itl(&g2);
        let mut es2 = EventSet::new(itl2, 100.0);
        es2.add_event(a2, 0.0, None);
        es2.add_event(a2, 3.0, None);
        let mut exec2 = SerialExecutor::new(ExecMode::PowerOfTwoBatch(1), 1, false);
        let summary2 = exec2.run(&mut g2, &mut es2, None, None).unwrap();

        assert_eq!(summary1.events_executed, summary2.events_executed);
    }

    #[test]
    fn empty_event_set_terminates_immediately() {
        let mut g = VertexGraph::new();
        let itl = build_itl(&g);
        let mut es = EventSet::new(itl, 10.0);
        let mut exec = SerialExecutor::new(ExecMode::InOrder, 1, false);
        let summary = exec.run(&mut g, &mut es, None, None).unwrap();
        assert_eq!(summary.events_executed, 0);
        assert_eq!(summary.final_sim_time, 0.0);
    }

    #[test]
    fn mode_parsing_matches_spec_selector() {
        assert_eq!(ExecMode::from_mode(0), ExecMode::InOrder);
        assert_eq!(ExecMode::from_mode(3), ExecMode::PowerOfTwoBatch(3));
        assert_eq!(ExecMode::from_mode(-5), ExecMode::PercentageBatch(50));
    }

    /// Spec scenario 6: two runs with mode=-5 and the same seed produce
    /// identical executed-event counts.
    #[test]
    fn percentage_batch_reproducible_for_same_seed() {
        let build = || {
            let mut g = VertexGraph::new();
            let s0 = g.create_sv("s0", 0, -1, 100);
            let a = g.add_vertex(Box::new(Incrementer {
                name: "A".into(),
                inputs: vec![s0],
                outputs: vec![s0],
            }));
            let b = g.add_vertex(Box::new(Incrementer {
                name: "B".into(),
                inputs: vec![s0],
                outputs: vec![s0],
            }));
            (g, a, b)
        };

        let (mut g1, a1, b1) = build();
        let itl1 = build_itl(&g1);
        let mut es1 = EventSet::new(itl1, 100.0);
        for i in 0..10 {
            es1.add_event(if i % 2 == 0 { a1 } else { b1 }, i as f64, None);
        }
        let mut exec1 = SerialExecutor::new(ExecMode::PercentageBatch(50), 99, false);
        let summary1 = exec1.run(&mut g1, &mut es1, None, None).unwrap();

        let (mut g2, a2, b2) = build();
        let itl2 = build_itl(&g2);
        let mut es2 = EventSet::new(itl2, 100.0);
        for i in 0..10 {
            es2.add_event(if i % 2 == 0 { a2 } else { b2 }, i as f64, None);
        }
        let mut exec2 = SerialExecutor::new(ExecMode::PercentageBatch(50), 99, false);
        let summary2 = exec2.run(&mut g2, &mut es2, None, None).unwrap();

        assert_eq!(summary1.events_executed, summary2.events_executed);
    }
}
