//! Command-line entry point: `sim-kernel <config-file>`.
//!
//! Wires config parsing (C0) to the vertex graph (C1), the ITL builder
//! (C2), the pending event set (C3), and the serial executor (C4).
//! Concrete topologies are out of scope for the crate itself, so this
//! binary runs against the same minimal two-vertex pipeline the
//! `pipeline` example demonstrates, parameterized by the config file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ooo_sim_kernel::config::RunConfig;
use ooo_sim_kernel::entity::Entity;
use ooo_sim_kernel::event_set::EventSet;
use ooo_sim_kernel::executor::{default_itl_cache_path, ExecMode, SerialExecutor};
use ooo_sim_kernel::graph::VertexGraph;
use ooo_sim_kernel::itl::build_or_load_itl;
use ooo_sim_kernel::sv::SvRegistry;
use ooo_sim_kernel::vertex::{NewEvent, Vertex};

/// An out-of-order discrete-event simulation kernel.
#[derive(Parser)]
#[command(name = "sim-kernel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the model's config file (spec 6's `key: value` format).
    config_file: PathBuf,
}

struct Source {
    out_sv: ooo_sim_kernel::sv::SvIndex,
}

impl Vertex for Source {
    fn io_svs(&self) -> (&[ooo_sim_kernel::sv::SvIndex], &[ooo_sim_kernel::sv::SvIndex]) {
        (&[], std::slice::from_ref(&self.out_sv))
    }
    fn run(&mut self, _time: f64, _entity: Option<Entity>, svs: &mut SvRegistry, _out: &mut Vec<NewEvent>) {
        svs.get_mut(self.out_sv).inc(1);
    }
    fn name(&self) -> &str {
        "A"
    }
}

struct Sink {
    in_sv: ooo_sim_kernel::sv::SvIndex,
    out_sv: ooo_sim_kernel::sv::SvIndex,
}

impl Vertex for Sink {
    fn io_svs(&self) -> (&[ooo_sim_kernel::sv::SvIndex], &[ooo_sim_kernel::sv::SvIndex]) {
        (std::slice::from_ref(&self.in_sv), std::slice::from_ref(&self.out_sv))
    }
    fn run(&mut self, _time: f64, _entity: Option<Entity>, svs: &mut SvRegistry, _out: &mut Vec<NewEvent>) {
        svs.get_mut(self.out_sv).inc(1);
    }
    fn name(&self) -> &str {
        "B"
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli.config_file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "sim-kernel terminated with a fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &std::path::Path) -> ooo_sim_kernel::SimResult<()> {
    let config = RunConfig::from_file(config_path)?;
    tracing::info!(model = %config.model_name, max_sim_time = config.max_sim_time, "loaded config");

    let mut graph = VertexGraph::new();
    let s0 = graph.create_sv("s0", 0, -1, 1_000_000);
    let s1 = graph.create_sv("s1", 0, -1, 1_000_000);
    let a = graph.add_vertex(Box::new(Source { out_sv: s0 }));
    let b = graph.add_vertex(Box::new(Sink { in_sv: s0, out_sv: s1 }));
    graph.add_edge(a, b, 5.0);

    let cache_path = default_itl_cache_path(&config.model_name);
    let itl = build_or_load_itl(&graph, &cache_path)?;

    let mut events = EventSet::new(itl, config.max_sim_time);
    events.add_event(a, 0.0, None);
    events.add_event(a, 3.0, None);

    let mode = ExecMode::from_mode(config.num_serial_ooo_execs);
    let mut executor = SerialExecutor::new(mode, config.dist_seed, false);
    let summary = executor.run(&mut graph, &mut events, None, None)?;

    tracing::info!(
        events_executed = summary.events_executed,
        final_sim_time = summary.final_sim_time,
        "run complete"
    );
    Ok(())
}
