//! Configuration file parsing: spec 6's plain-text `key: value` format.
//!
//! Kept as a small hand-rolled parser rather than reaching for `config`/
//! `toml`, since the format spec 6 defines isn't actually TOML and
//! inventing one to fit a generic config crate would be the tail
//! wagging the dog. Unknown keys are ignored, per spec.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{SimError, SimResult};

/// The parsed `key: value` pairs from a config file, plus the typed
/// fields every model needs regardless of topology.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub model_name: String,
    pub max_sim_time: f64,
    pub dist_seed: u64,
    pub num_serial_ooo_execs: i32,
    pub num_threads: u32,
    pub dist_params_file: Option<PathBuf>,
    raw: HashMap<String, String>,
}

impl RunConfig {
    pub fn from_file(path: &Path) -> SimResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| SimError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = parse_kv(path, &contents)?;

        let model_name = get_required(path, &raw, "model_name")?;
        let max_sim_time = get_required_f64(path, &raw, "max_sim_time")?;
        let dist_seed = get_required(path, &raw, "dist_seed")?
            .parse()
            .map_err(|_| SimError::ConfigInvalidValue {
                key: "dist_seed".into(),
                value: raw["dist_seed"].clone(),
            })?;
        let num_serial_ooo_execs = raw
            .get("num_serial_OoO_execs")
            .map(|v| {
                v.parse().map_err(|_| SimError::ConfigInvalidValue {
                    key: "num_serial_OoO_execs".into(),
                    value: v.clone(),
                })
            })
            .transpose()?
            .unwrap_or(0);
        let num_threads = raw
            .get("num_threads")
            .map(|v| {
                v.parse().map_err(|_| SimError::ConfigInvalidValue {
                    key: "num_threads".into(),
                    value: v.clone(),
                })
            })
            .transpose()?
            .unwrap_or(1);
        let dist_params_file = raw.get("dist_params_file").map(PathBuf::from);

        Ok(Self {
            model_name,
            max_sim_time,
            dist_seed,
            num_serial_ooo_execs,
            num_threads,
            dist_params_file,
            raw,
        })
    }

    /// Looks up a key this struct doesn't promote to a typed field
    /// directly (e.g. topology-specific sizes); unknown keys are
    /// otherwise ignored per spec.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.raw.get(key).map(String::as_str)
    }
}

fn parse_kv(path: &Path, contents: &str) -> SimResult<HashMap<String, String>> {
    let mut map = HashMap::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            return Err(SimError::ConfigMalformed {
                path: path.to_path_buf(),
                line_no: line_no + 1,
                line: line.to_string(),
            });
        };
        map.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(map)
}

fn get_required(path: &Path, raw: &HashMap<String, String>, key: &str) -> SimResult<String> {
    let _ = path;
    raw.get(key)
        .cloned()
        .ok_or_else(|| SimError::ConfigMissingKey(key.to_string()))
}

fn get_required_f64(path: &Path, raw: &HashMap<String, String>, key: &str) -> SimResult<f64> {
    let value = get_required(path, raw, key)?;
    value.parse().map_err(|_| SimError::ConfigInvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Distribution-parameter file: triples of doubles on successive lines
/// (intra-arrival, service, transit), each `(min, mode, max)`. Consumed
/// by topology modules, not by the core; parsing is provided here only
/// as a shared utility since the format is externally specified.
#[derive(Debug, Clone, Copy)]
pub struct DistTriple {
    pub min: f64,
    pub mode: f64,
    pub max: f64,
}

pub fn parse_dist_params_file(path: &Path) -> SimResult<Vec<DistTriple>> {
    let contents = std::fs::read_to_string(path).map_err(|source| SimError::DistParamsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut triples = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let values: Vec<f64> = line
            .split_whitespace()
            .filter_map(|field| field.parse().ok())
            .collect();
        if values.len() == 3 {
            triples.push(DistTriple {
                min: values[0],
                mode: values[1],
                max: values[2],
            });
        }
    }
    Ok(triples)
}
