use serde::Deserialize;

use crate::error::Result;
use crate::memory::{MemorySize, Policy};

#[derive(Debug, PartialEq, Deserialize)]
pub struct Config {
    pub policy: Policy,
    #[serde(rename = "memory_bits")]
    pub memory: MemorySize,
    pub log_level: String,

    /// Text trace to replay. Empty means the trace is sampled from a process.
    #[serde(default)]
    pub trace_file: String,
    /// Where to write the page-over-time plot data, nothing is written if empty.
    #[serde(default)]
    pub plot_file: String,
    /// Where to write the per-step results, nothing is written if empty.
    #[serde(default)]
    pub steps_file: String,
    /// Print every step of the instrumented pass.
    pub steps: bool,
}

impl Config {
    pub fn new(file: &str) -> Result<Config> {
        let mut cfg = config::Config::builder()
            .set_default("policy", "fifo")?
            .set_default("memory_bits", 20)?
            .set_default("log_level", "info")?
            .set_default("steps", true)?;
        if !file.is_empty() {
            cfg = cfg.add_source(config::File::with_name(file))
        }
        cfg = cfg.add_source(config::Environment::with_prefix("PAGESIM"));
        Ok(cfg.build()?.try_deserialize()?)
    }
}
