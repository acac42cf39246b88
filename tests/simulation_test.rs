/*!
 * Simulation Tests
 * Aggregate behaviour and the timer-driven simulation task
 */

use pretty_assertions::assert_eq;
use sched_sim_kernel::{
    KernelError, Pid, ProcessError, ProcessState, SchedulerPolicy, SimConfig, Simulation,
    SimulationSnapshot, SimulationTask, SimulationTiming,
};
use std::time::Duration;

fn config() -> SimConfig {
    SimConfig {
        num_cpu: 2,
        scheduler: SchedulerPolicy::RoundRobin,
        quantum: 2,
        batch_frequency: 1,
        min_instructions: 3,
        max_instructions: 6,
        delay_per_exec: 1,
        total_memory_kb: 512,
        frame_size_kb: 64,
        min_memory_kb: 64,
        max_memory_kb: 128,
    }
}

fn timing() -> SimulationTiming {
    SimulationTiming {
        tick_interval: Duration::from_millis(10),
        batch_interval: Duration::from_millis(200),
    }
}

#[test]
fn test_batch_admission_evicts_oldest() {
    // Each process fills the whole pool
    let mut sim = Simulation::with_seed(
        SimConfig {
            min_memory_kb: 512,
            max_memory_kb: 512,
            ..config()
        },
        3,
    )
    .unwrap();

    let first = sim.spawn_batch().unwrap();
    let second = sim.spawn_batch().unwrap();
    assert!(second.in_memory);
    assert!(!sim.info(first.pid).unwrap().in_memory);
    assert_eq!(sim.memory().paged_out(), 8);
}

#[test]
fn test_batch_name_collision_is_skipped() {
    let mut sim = Simulation::with_seed(config(), 3).unwrap();
    sim.create_process("p002").unwrap();

    assert!(sim.spawn_batch().is_none());
    let next = sim.spawn_batch().unwrap();
    assert_eq!((next.pid, next.name.as_str()), (Pid(3), "p003"));
    assert_eq!(sim.processes().len(), 2);
}

#[test]
fn test_snapshot_is_consistent_after_ticks() {
    let mut sim = Simulation::with_seed(config(), 21).unwrap();
    for name in ["a", "b", "c"] {
        sim.create_process(name).unwrap();
    }
    sim.tick();

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.tick, 1);
    assert_eq!(snapshot.active_cpus(), 2);
    assert_eq!(snapshot.ready_queue, vec![Pid(3)]);
    assert_eq!(
        snapshot.processes.iter().map(|p| p.state).collect::<Vec<_>>(),
        vec![
            ProcessState::Running(0),
            ProcessState::Running(1),
            ProcessState::Ready
        ]
    );

    let used: u64 = snapshot
        .processes
        .iter()
        .filter(|p| p.in_memory)
        .map(|p| p.memory_required_kb)
        .sum();
    assert_eq!(snapshot.memory.used_kb, used);
}

#[test]
fn test_snapshot_json_carries_state() {
    let mut sim = Simulation::with_seed(config(), 4).unwrap();
    sim.create_process("alpha").unwrap();
    let snapshot = sim.snapshot();

    let json = serde_json::to_string(&snapshot).unwrap();
    let back: SimulationSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back.processes[0].name, "alpha");
    assert_eq!(back.processes[0].state, ProcessState::Ready);
    assert_eq!(back.config, snapshot.config);
}

#[tokio::test(start_paused = true)]
async fn test_task_generates_batches_while_running() {
    let sim = Simulation::with_seed(config(), 8).unwrap();
    let task = SimulationTask::spawn_with_timing(sim, timing());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(task.snapshot().await.unwrap().processes.is_empty());

    task.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(650)).await;

    let snapshot = task.snapshot().await.unwrap();
    assert_eq!(snapshot.processes.len(), 3);
    assert_eq!(snapshot.processes[0].name, "p001");
    assert!(snapshot.running);

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_task_runs_processes_to_completion() {
    let sim = Simulation::with_seed(
        SimConfig {
            batch_frequency: 3600,
            ..config()
        },
        8,
    )
    .unwrap();
    let task = SimulationTask::spawn_with_timing(
        sim,
        SimulationTiming {
            tick_interval: Duration::from_millis(10),
            batch_interval: Duration::from_secs(3600),
        },
    );

    task.create_process("one").await.unwrap();
    task.create_process("two").await.unwrap();
    task.start().await.unwrap();

    // At most 12 instructions on two cores
    tokio::time::sleep(Duration::from_millis(200)).await;

    let snapshot = task.snapshot().await.unwrap();
    assert_eq!(snapshot.finished().count(), 2);
    assert_eq!(snapshot.memory.used_kb, 0);

    let err = task.process("one").await.unwrap_err();
    assert!(matches!(err, KernelError::Process(ProcessError::NotFound(_))));

    task.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_releases_everything() {
    let sim = Simulation::with_seed(config(), 2).unwrap();
    let task = SimulationTask::spawn_with_timing(sim, timing());

    for name in ["a", "b", "c"] {
        task.create_process(name).await.unwrap();
    }
    task.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(15)).await;

    let released = task.stop().await.unwrap();
    assert_eq!(released.len(), 3);

    let snapshot = task.snapshot().await.unwrap();
    assert!(!snapshot.running);
    assert_eq!(snapshot.active_cpus(), 0);
    assert!(snapshot.ready_queue.is_empty());
    assert_eq!(snapshot.memory.used_kb, 0);

    task.shutdown().await;
}
