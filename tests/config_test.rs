/*!
 * Configuration Tests
 * Loading `KEY VALUE` configuration files from disk
 */

use pretty_assertions::assert_eq;
use sched_sim_kernel::{ConfigError, SchedulerPolicy, SimConfig};
use std::io::Write;
use tempfile::NamedTempFile;

const VALID: &str = "\
# Four cores, round-robin
NUM_CPU 4
SCHEDULER_TYPE \"rr\"
TIME_QUANTUM 5
BATCH_FREQUENCY 1
MIN_INSTRUCTIONS 1000
MAX_INSTRUCTIONS 2000
DELAY_PER_EXEC 0

TOTAL_MEMORY 16384
FRAME_SIZE 16
MIN_MEMORY_PER_PROCESS 64
MAX_MEMORY_PER_PROCESS 4096
";

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_valid_file() {
    let file = write_config(VALID);
    let config = SimConfig::from_file(file.path()).unwrap();

    assert_eq!(
        config,
        SimConfig {
            num_cpu: 4,
            scheduler: SchedulerPolicy::RoundRobin,
            quantum: 5,
            batch_frequency: 1,
            min_instructions: 1000,
            max_instructions: 2000,
            delay_per_exec: 0,
            total_memory_kb: 16384,
            frame_size_kb: 16,
            min_memory_kb: 64,
            max_memory_kb: 4096,
        }
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    let err = SimConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.txt"));
}

#[test]
fn test_missing_key_is_reported() {
    let file = write_config(&VALID.replace("FRAME_SIZE 16\n", ""));
    assert_eq!(
        SimConfig::from_file(file.path()).unwrap_err(),
        ConfigError::MissingKey("FRAME_SIZE".to_string())
    );
}

#[test]
fn test_unparsable_number_is_invalid_value() {
    let file = write_config(&VALID.replace("NUM_CPU 4", "NUM_CPU four"));
    let err = SimConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "NUM_CPU"));
}

#[test]
fn test_frame_size_must_divide_total() {
    let file = write_config(&VALID.replace("FRAME_SIZE 16", "FRAME_SIZE 48"));
    let err = SimConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "FRAME_SIZE"));
}

#[test]
fn test_zero_frame_size_rejected() {
    let file = write_config(&VALID.replace("FRAME_SIZE 16", "FRAME_SIZE 0"));
    assert!(SimConfig::from_file(file.path()).is_err());
}

#[test]
fn test_round_robin_without_quantum_rejected() {
    let file = write_config(&VALID.replace("TIME_QUANTUM 5\n", ""));
    assert_eq!(
        SimConfig::from_file(file.path()).unwrap_err(),
        ConfigError::MissingKey("TIME_QUANTUM".to_string())
    );
}

#[test]
fn test_memory_range_must_fit_pool() {
    let file = write_config(&VALID.replace(
        "MAX_MEMORY_PER_PROCESS 4096",
        "MAX_MEMORY_PER_PROCESS 32768",
    ));
    assert!(matches!(
        SimConfig::from_file(file.path()).unwrap_err(),
        ConfigError::Invalid { .. }
    ));
}

#[test]
fn test_malformed_line_reports_line_number() {
    let file = write_config(&format!("{}EXTRA 1 2\n", VALID));
    let err = SimConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedLine { line: 14, .. }));
}

#[test]
fn test_config_serializes_for_reports() {
    let config: SimConfig = VALID.parse().unwrap();
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["scheduler"], "rr");
    assert_eq!(json["frame_size_kb"], 16);
}
