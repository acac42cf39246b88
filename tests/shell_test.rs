/*!
 * Shell Tests
 * Command sessions driven through `Shell::handle_line`
 */

use pretty_assertions::assert_eq;
use sched_sim_kernel::{Outcome, Shell, SimulationSnapshot, SimulationTiming};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const CONFIG: &str = "\
NUM_CPU 2
SCHEDULER_TYPE rr
TIME_QUANTUM 2
BATCH_FREQUENCY 1
MIN_INSTRUCTIONS 50
MAX_INSTRUCTIONS 60
DELAY_PER_EXEC 1
TOTAL_MEMORY 1024
FRAME_SIZE 64
MIN_MEMORY_PER_PROCESS 64
MAX_MEMORY_PER_PROCESS 256
";

fn shell_in(dir: &Path) -> Shell {
    let config_path = dir.join("config.txt");
    std::fs::write(&config_path, CONFIG).unwrap();
    Shell::new(config_path).with_seed(17).with_timing(SimulationTiming {
        tick_interval: Duration::from_millis(10),
        batch_interval: Duration::from_millis(100),
    })
}

async fn run(shell: &mut Shell, line: &str) -> String {
    match shell.handle_line(line).await {
        Outcome::Continue(text) => text,
        Outcome::Exit(text) => panic!("unexpected exit: {}", text),
    }
}

#[tokio::test(start_paused = true)]
async fn test_initialize_once() {
    let dir = TempDir::new().unwrap();
    let mut shell = shell_in(dir.path());

    let first = run(&mut shell, "initialize").await;
    assert!(first.starts_with("System initialized: 2 CPU(s), rr scheduler, 1024 KB paging memory."));
    assert_eq!(run(&mut shell, "initialize").await, "System already initialized.");

    shell.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_screen_session() {
    let dir = TempDir::new().unwrap();
    let mut shell = shell_in(dir.path());
    run(&mut shell, "initialize").await;

    let created = run(&mut shell, "screen -s worker").await;
    assert!(created.starts_with("Process worker created with "));
    assert!(run(&mut shell, "screen -s worker").await.contains("already in use"));

    let listing = run(&mut shell, "screen -ls").await;
    assert!(listing.contains("Total CPUs: 2"));
    assert!(listing.contains("Active CPUs: 0"));
    assert!(listing.contains("- worker ("));

    assert_eq!(
        run(&mut shell, "screen -r worker").await,
        "[Entering worker shell] type 'process-smi' or 'exit'"
    );
    assert_eq!(shell.prompt(), "[worker]> ");

    let view = run(&mut shell, "process-smi").await;
    assert!(view.contains("Process: worker"));
    assert!(view.contains("State: READY"));
    assert_eq!(run(&mut shell, "vmstat").await, "Unknown command: vmstat");

    assert_eq!(run(&mut shell, "exit").await, "");
    assert_eq!(shell.attached(), None);

    assert!(run(&mut shell, "screen -r ghost").await.contains("not found"));

    shell.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_test_and_stop() {
    let dir = TempDir::new().unwrap();
    let mut shell = shell_in(dir.path());
    run(&mut shell, "initialize").await;

    assert_eq!(run(&mut shell, "scheduler-test").await, "Starting scheduler test...");
    assert_eq!(
        run(&mut shell, "scheduler-test").await,
        "Scheduler test already running."
    );

    tokio::time::sleep(Duration::from_millis(350)).await;

    // Three batch processes so far, none near completion
    let smi = run(&mut shell, "process-smi").await;
    assert!(smi.contains("Total CPUs: 2"));
    for name in ["p001", "p002", "p003"] {
        assert!(smi.contains(&format!("- {} (", name)), "{} missing", name);
    }

    let stopped = run(&mut shell, "scheduler-stop").await;
    assert_eq!(stopped, "Stopped scheduler test. Released 3 process(es).");

    let vmstat = run(&mut shell, "vmstat").await;
    assert!(vmstat.contains("Used Memory : 0 KB"));
    assert!(vmstat.contains("| IDLE | PAGED OUT |"));

    shell.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_report_util_text_and_json() {
    let dir = TempDir::new().unwrap();
    let mut shell = shell_in(dir.path());
    run(&mut shell, "initialize").await;
    run(&mut shell, "screen -s alpha").await;

    let text_path = dir.path().join("report.txt");
    let reply = run(&mut shell, &format!("report-util {}", text_path.display())).await;
    assert_eq!(reply, format!("Report written to {}", text_path.display()));
    let report = std::fs::read_to_string(&text_path).unwrap();
    assert!(report.starts_with("=== SCHED-SIM REPORT ==="));
    assert!(report.contains("- alpha (ID: 1)"));

    let json_path = dir.path().join("report.json");
    run(&mut shell, &format!("report-util {} --json", json_path.display())).await;
    let snapshot: SimulationSnapshot =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(snapshot.processes.len(), 1);
    assert_eq!(snapshot.processes[0].name, "alpha");

    shell.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_exit_shuts_down() {
    let dir = TempDir::new().unwrap();
    let mut shell = shell_in(dir.path());
    run(&mut shell, "initialize").await;

    assert_eq!(
        shell.handle_line("exit").await,
        Outcome::Exit("Exiting emulator...".to_string())
    );
    assert!(!shell.is_initialized());
}

#[tokio::test]
async fn test_bad_config_leaves_shell_uninitialized() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.txt");
    std::fs::write(&config_path, CONFIG.replace("FRAME_SIZE 64", "FRAME_SIZE 100")).unwrap();
    let mut shell = Shell::new(config_path);

    let reply = run(&mut shell, "initialize").await;
    assert!(reply.contains("FRAME_SIZE"));
    assert!(!shell.is_initialized());
    assert_eq!(
        run(&mut shell, "screen -ls").await,
        "Please initialize the system first."
    );
}
