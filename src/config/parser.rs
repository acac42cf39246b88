/*!
 * Configuration Parser
 * Reads the whitespace-separated `KEY VALUE` configuration format
 */

use super::types::{ConfigError, ConfigResult, SimConfig};
use crate::scheduler::SchedulerPolicy;
use ahash::AHashMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

const NUM_CPU: &str = "NUM_CPU";
const SCHEDULER_TYPE: &str = "SCHEDULER_TYPE";
const TIME_QUANTUM: &str = "TIME_QUANTUM";
const BATCH_FREQUENCY: &str = "BATCH_FREQUENCY";
const MIN_INSTRUCTIONS: &str = "MIN_INSTRUCTIONS";
const MAX_INSTRUCTIONS: &str = "MAX_INSTRUCTIONS";
const DELAY_PER_EXEC: &str = "DELAY_PER_EXEC";
const TOTAL_MEMORY: &str = "TOTAL_MEMORY";
const FRAME_SIZE: &str = "FRAME_SIZE";
const MIN_MEMORY_PER_PROCESS: &str = "MIN_MEMORY_PER_PROCESS";
const MAX_MEMORY_PER_PROCESS: &str = "MAX_MEMORY_PER_PROCESS";

const KNOWN_KEYS: [&str; 11] = [
    NUM_CPU,
    SCHEDULER_TYPE,
    TIME_QUANTUM,
    BATCH_FREQUENCY,
    MIN_INSTRUCTIONS,
    MAX_INSTRUCTIONS,
    DELAY_PER_EXEC,
    TOTAL_MEMORY,
    FRAME_SIZE,
    MIN_MEMORY_PER_PROCESS,
    MAX_MEMORY_PER_PROCESS,
];

impl SimConfig {
    /// Load and validate configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "Parsing configuration");
        text.parse()
    }
}

impl FromStr for SimConfig {
    type Err = ConfigError;

    fn from_str(text: &str) -> ConfigResult<Self> {
        let entries = collect_entries(text)?;
        let scheduler = required(&entries, SCHEDULER_TYPE)
            .and_then(|value| parse_policy(SCHEDULER_TYPE, value))?;

        // FCFS never reads the quantum, so it may be left out
        let quantum = match entries.get(TIME_QUANTUM) {
            Some(value) => parse_number(TIME_QUANTUM, value)?,
            None if scheduler == SchedulerPolicy::Fcfs => 0,
            None => return Err(ConfigError::MissingKey(TIME_QUANTUM.to_string())),
        };

        let config = SimConfig {
            num_cpu: required_number(&entries, NUM_CPU)?,
            scheduler,
            quantum,
            batch_frequency: required_number(&entries, BATCH_FREQUENCY)?,
            min_instructions: required_number(&entries, MIN_INSTRUCTIONS)?,
            max_instructions: required_number(&entries, MAX_INSTRUCTIONS)?,
            delay_per_exec: required_number(&entries, DELAY_PER_EXEC)?,
            total_memory_kb: required_number(&entries, TOTAL_MEMORY)?,
            frame_size_kb: required_number(&entries, FRAME_SIZE)?,
            min_memory_kb: required_number(&entries, MIN_MEMORY_PER_PROCESS)?,
            max_memory_kb: required_number(&entries, MAX_MEMORY_PER_PROCESS)?,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Normalize `num-cpu` / `Num_Cpu` style keys to `NUM_CPU`
fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_uppercase().replace('-', "_")
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn collect_entries(text: &str) -> ConfigResult<AHashMap<String, String>> {
    let mut entries = AHashMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (key, value) = match (fields.next(), fields.next(), fields.next()) {
            (Some(key), Some(value), None) => (normalize_key(key), unquote(value).to_string()),
            _ => {
                return Err(ConfigError::MalformedLine {
                    line: index + 1,
                    content: line.to_string(),
                })
            }
        };

        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn!(key = %key, line = index + 1, "Ignoring unknown configuration key");
            continue;
        }

        // Later lines override earlier ones
        entries.insert(key, value);
    }

    Ok(entries)
}

fn required<'a>(entries: &'a AHashMap<String, String>, key: &str) -> ConfigResult<&'a str> {
    entries
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

fn required_number<T>(entries: &AHashMap<String, String>, key: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    required(entries, key).and_then(|value| parse_number(key, value))
}

fn parse_number<T>(key: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_policy(key: &str, value: &str) -> ConfigResult<SchedulerPolicy> {
    SchedulerPolicy::from_str(value).map_err(|reason| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    })
}
