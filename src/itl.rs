//! C2: shortest-path + ITL builder.
//!
//! Runs once before any event is executed. Computes all-pairs shortest
//! delays (Floyd-Warshall) over the vertex graph, then derives the
//! Independence Time Limit table in the two phases described in
//! `original_source/OoO_SimModel.cpp`: a writer-based bound (Phase 1)
//! tightened by an immediate-affect closure (Phase 2).

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{SimError, SimResult};
use crate::graph::VertexGraph;
use crate::sv::SvIndex;
use crate::vertex::VertexIndex;

/// Sentinel standing in for "+infinity" / "no path". Matches the
/// original source's use of `numeric_limits<float>::max()` rather than
/// `f64::INFINITY`, so the cached CSV round-trips through ordinary
/// finite float parsing instead of `inf`/`nan` text handling.
pub const INFINITE_DELAY: f64 = f64::MAX;

fn is_infinite_delay(d: f64) -> bool {
    d >= INFINITE_DELAY
}

/// Dense `V x V` matrix of non-negative floats (with `INFINITE_DELAY`
/// sentinel), indexed `[earlier_vertex][later_vertex]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItlTable {
    v: usize,
    data: Vec<f64>,
}

impl ItlTable {
    fn filled(v: usize, value: f64) -> Self {
        Self {
            v,
            data: vec![value; v * v],
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.v
    }

    #[inline]
    pub fn get(&self, earlier: VertexIndex, later: VertexIndex) -> f64 {
        self.data[earlier.0 * self.v + later.0]
    }

    #[inline]
    fn set(&mut self, earlier: VertexIndex, later: VertexIndex, value: f64) {
        self.data[earlier.0 * self.v + later.0] = value;
    }

    /// Writes the table as one row per earlier-event vertex index, `V`
    /// comma-separated floats per row, newline-terminated.
    pub fn write_csv(&self, path: &Path) -> SimResult<()> {
        let mut file = std::fs::File::create(path)?;
        for row in 0..self.v {
            let line: Vec<String> = (0..self.v)
                .map(|col| {
                    let value = self.data[row * self.v + col];
                    if is_infinite_delay(value) {
                        format!("{INFINITE_DELAY}")
                    } else {
                        value.to_string()
                    }
                })
                .collect();
            writeln!(file, "{}", line.join(","))?;
        }
        Ok(())
    }

    /// Reads a table back, failing fatally (via panic) if the cached
    /// dimensions disagree with the current model's vertex count.
    /// Structural inconsistency in cached artifacts is an all-or-nothing
    /// condition per spec, not something the caller can recover from
    /// locally.
    pub fn read_csv(path: &Path, expected_v: usize) -> SimResult<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut data = Vec::with_capacity(expected_v * expected_v);
        let mut rows = 0usize;
        for (row_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut cols = 0usize;
            for field in line.split(',') {
                let value: f64 = field.trim().parse().map_err(|_| SimError::ItlCacheMalformed {
                    path: path.to_path_buf(),
                    row: row_no,
                    detail: format!("field {field:?} is not a float"),
                })?;
                data.push(value);
                cols += 1;
            }
            assert_eq!(
                cols, expected_v,
                "ITL cache {path:?} row {row_no} has {cols} columns, expected {expected_v}"
            );
            rows += 1;
        }
        assert_eq!(
            rows, expected_v,
            "ITL cache {path:?} has {rows} rows, expected {expected_v}"
        );
        Ok(Self { v: expected_v, data })
    }
}

/// All-pairs shortest path distances over the vertex graph's edges.
/// Self-loops present in the input edge list are ignored for this
/// step (the spec initializes the diagonal to zero unconditionally).
fn floyd_warshall(graph: &VertexGraph) -> Vec<Vec<f64>> {
    let v = graph.num_vertices();
    let mut dist = vec![vec![INFINITE_DELAY; v]; v];
    for i in 0..v {
        dist[i][i] = 0.0;
    }
    for edge in graph.edges() {
        if edge.from.0 != edge.to.0 {
            let slot = &mut dist[edge.from.0][edge.to.0];
            if edge.min_delay < *slot {
                *slot = edge.min_delay;
            }
        }
    }
    for k in 0..v {
        for i in 0..v {
            if is_infinite_delay(dist[i][k]) {
                continue;
            }
            for j in 0..v {
                if is_infinite_delay(dist[k][j]) {
                    continue;
                }
                let through_k = dist[i][k] + dist[k][j];
                if through_k < dist[i][j] {
                    dist[i][j] = through_k;
                }
            }
        }
    }
    dist
}

/// `R(l)`: vertices reachable from `l` with a finite-weight path.
fn reachability_sets(dist: &[Vec<f64>]) -> Vec<BTreeSet<usize>> {
    dist.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|(_, &d)| !is_infinite_delay(d))
                .map(|(m, _)| m)
                .collect()
        })
        .collect()
}

/// Builds the ITL table for `graph`, or loads it from `cache_path` if
/// present. `cache_path`'s parent directory is created if missing.
pub fn build_or_load_itl(graph: &VertexGraph, cache_path: &Path) -> SimResult<ItlTable> {
    let v = graph.num_vertices();
    if cache_path.exists() {
        info!(path = %cache_path.display(), "loading cached ITL table");
        return ItlTable::read_csv(cache_path, v);
    }
    info!(vertices = v, "building ITL table");
    let table = build_itl(graph);
    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    table.write_csv(cache_path)?;
    Ok(table)
}

/// Computes the ITL table from scratch, ignoring any cache.
pub fn build_itl(graph: &VertexGraph) -> ItlTable {
    let v = graph.num_vertices();
    let dist = floyd_warshall(graph);
    let reach = reachability_sets(&dist);

    // U(S): vertices whose write-footprint intersects SV set S.
    let writers_of = |s: &BTreeSet<SvIndex>| -> BTreeSet<usize> {
        (0..v)
            .filter(|&l| {
                graph
                    .outputs(VertexIndex(l))
                    .iter()
                    .any(|sv| s.contains(sv))
            })
            .collect()
    };

    let mut itl = ItlTable::filled(v, INFINITE_DELAY);

    // Phase 1: writer-based bound.
    for k in 0..v {
        let s_k: BTreeSet<SvIndex> = graph
            .inputs(VertexIndex(k))
            .iter()
            .chain(graph.outputs(VertexIndex(k)).iter())
            .copied()
            .collect();
        let u_sk = writers_of(&s_k);

        for j in 0..v {
            let x_jk: Vec<usize> = reach[j].intersection(&u_sk).copied().collect();
            let bound = x_jk
                .iter()
                .map(|&x| dist[j][x])
                .fold(INFINITE_DELAY, f64::min);
            itl.set(VertexIndex(j), VertexIndex(k), bound);
        }
    }
    debug!("ITL phase 1 complete");

    // Phase 2: immediate-affect tightening.
    for i in 0..v {
        let z_i: BTreeSet<usize> = (0..v)
            .filter(|&l| itl.get(VertexIndex(i), VertexIndex(l)) == 0.0)
            .collect();
        for h in 0..v {
            let x_hi: Vec<usize> = reach[h].intersection(&z_i).copied().collect();
            if x_hi.is_empty() {
                continue;
            }
            let bound = x_hi.iter().map(|&x| dist[h][x]).fold(INFINITE_DELAY, f64::min);
            let current = itl.get(VertexIndex(h), VertexIndex(i));
            if bound < current {
                itl.set(VertexIndex(h), VertexIndex(i), bound);
            }
        }
    }
    debug!("ITL phase 2 complete");

    itl
}
