/*!
 * Report Rendering
 * Text views over a `SimulationSnapshot`
 *
 * Each view is a `Display` wrapper so the same text goes to the terminal or
 * to a report file.
 */

use crate::process::{ProcessInfo, ProcessState};
use crate::simulation::SimulationSnapshot;
use std::fmt;
use time::macros::format_description;
use time::OffsetDateTime;

fn created_at(timestamp: OffsetDateTime) -> Result<String, fmt::Error> {
    let format =
        format_description!("[month]/[day]/[year] [hour repr:12]:[minute]:[second][period]");
    timestamp.format(format).map_err(|_| fmt::Error)
}

fn memory_status(process: &ProcessInfo) -> &'static str {
    if process.in_memory {
        "IN MEMORY"
    } else {
        "PAGED OUT"
    }
}

fn write_cpu_summary(f: &mut fmt::Formatter<'_>, snapshot: &SimulationSnapshot) -> fmt::Result {
    writeln!(f, "CPU Information:")?;
    writeln!(f, "Total CPUs: {}", snapshot.cpu_count())?;
    writeln!(f, "Active CPUs: {}", snapshot.active_cpus())?;
    writeln!(f, "CPU Utilization: {:.2}%", snapshot.cpu_utilization())
}

/// `screen -ls`
pub struct ScreenList<'a>(pub &'a SimulationSnapshot);

impl fmt::Display for ScreenList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        write_cpu_summary(f, snapshot)?;

        writeln!(f)?;
        writeln!(f, "=== PROCESSING ===")?;
        for p in snapshot.unfinished() {
            writeln!(
                f,
                "- {} ({}) | ID: {} | {} | Memory: {} KB | InMemory: {} | Instructions: {}/{}",
                p.name,
                created_at(p.created_at)?,
                p.pid,
                p.state,
                p.memory_required_kb,
                p.in_memory,
                p.progress(),
                p.total_instructions
            )?;
        }

        writeln!(f)?;
        write!(f, "=== PROCESS FINISHED ===")?;
        for p in snapshot.finished() {
            write!(
                f,
                "\n- {} ({}) | ID: {} | Memory: {} KB | Instructions: {}/{}",
                p.name,
                created_at(p.created_at)?,
                p.pid,
                p.memory_required_kb,
                p.total_instructions,
                p.total_instructions
            )?;
        }
        Ok(())
    }
}

/// `process-smi`
pub struct ProcessSmi<'a>(pub &'a SimulationSnapshot);

impl fmt::Display for ProcessSmi<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        let memory = &snapshot.memory;

        writeln!(f, "=== process-smi ===")?;
        write_cpu_summary(f, snapshot)?;
        writeln!(f)?;
        writeln!(
            f,
            "Memory Usage: {} KB / {} KB ({:.2}%)",
            memory.used_kb, memory.total_kb, memory.usage_percentage
        )?;

        writeln!(f)?;
        writeln!(f, "--- Cores ---")?;
        for cpu in &snapshot.cpus {
            match cpu.running.and_then(|pid| snapshot.processes.iter().find(|p| p.pid == pid)) {
                Some(p) => writeln!(f, "Core {}: {} (ID: {})", cpu.id, p.name, p.pid)?,
                None => writeln!(f, "Core {}: idle", cpu.id)?,
            }
        }

        writeln!(f)?;
        writeln!(f, "=== PROCESSING ===")?;
        for p in snapshot.unfinished() {
            writeln!(
                f,
                "- {} ({}) | ID: {} | {} | {} | Memory: {} KB | Progress: {}/{}",
                p.name,
                created_at(p.created_at)?,
                p.pid,
                p.state,
                memory_status(p),
                p.memory_required_kb,
                p.progress(),
                p.total_instructions
            )?;
        }

        writeln!(f)?;
        write!(f, "=== PROCESS FINISHED ===")?;
        for p in snapshot.finished() {
            write!(
                f,
                "\n- {} ({}) | ID: {} | FINISHED | {} | Memory: {} KB | Progress: {}/{}",
                p.name,
                created_at(p.created_at)?,
                p.pid,
                memory_status(p),
                p.memory_required_kb,
                p.total_instructions,
                p.total_instructions
            )?;
        }
        Ok(())
    }
}

fn write_memory_block(f: &mut fmt::Formatter<'_>, snapshot: &SimulationSnapshot) -> fmt::Result {
    let memory = &snapshot.memory;
    writeln!(f, "Mode        : {}", memory.mode)?;
    writeln!(f, "Total Memory: {} KB", memory.total_kb)?;
    writeln!(f, "Used Memory : {} KB", memory.used_kb)?;
    writeln!(f, "Free Memory : {} KB", memory.free_kb)?;
    writeln!(f, "Frame Size  : {} KB", memory.frame_size_kb)?;
    writeln!(f, "Free Frames : {}/{}", memory.free_frames, memory.total_frames)?;
    writeln!(f, "Paged In    : {}", memory.paged_in)?;
    writeln!(f, "Paged Out   : {}", memory.paged_out)?;
    writeln!(f, "Pressure    : {}", memory.memory_pressure())
}

/// `vmstat`
pub struct VmStat<'a>(pub &'a SimulationSnapshot);

impl fmt::Display for VmStat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(f, "=== vmstat ===")?;
        write_memory_block(f, snapshot)?;
        write!(f, "--- Process States ---")?;
        for p in &snapshot.processes {
            write!(
                f,
                "\n- {} (ID: {}) | {} | {} | {} KB",
                p.name,
                p.pid,
                p.state,
                memory_status(p),
                p.memory_required_kb
            )?;
        }
        Ok(())
    }
}

/// Single-process view shown inside `screen -r`
pub struct ProcessView<'a>(pub &'a ProcessInfo);

impl fmt::Display for ProcessView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.0;
        writeln!(f, "Process: {}", p.name)?;
        writeln!(f, "ID: {}", p.pid)?;
        writeln!(f, "Created: {}", created_at(p.created_at)?)?;
        writeln!(f, "State: {}", p.state)?;
        writeln!(
            f,
            "Memory: {} KB ({} pages, {})",
            p.memory_required_kb,
            p.page_count,
            memory_status(p)
        )?;
        writeln!(f, "Instructions: {}/{}", p.progress(), p.total_instructions)?;
        write!(f, "Remaining Instructions: {}", p.remaining_instructions)?;
        if p.state == ProcessState::Finished {
            write!(f, "\nFinished!")?;
        }
        Ok(())
    }
}

/// Text written by `report-util`
pub struct ReportFile<'a>(pub &'a SimulationSnapshot);

impl fmt::Display for ReportFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        let config = &snapshot.config;

        writeln!(f, "=== SCHED-SIM REPORT ===")?;
        writeln!(f, "Generated   : {}", created_at(snapshot.taken_at)?)?;
        writeln!(f, "Tick        : {}", snapshot.tick)?;
        writeln!(
            f,
            "Scheduler   : {} (quantum {}, delay {})",
            config.scheduler, config.quantum, config.delay_per_exec
        )?;
        writeln!(f)?;
        write_cpu_summary(f, snapshot)?;
        writeln!(f, "Dispatches  : {}", snapshot.scheduler.dispatches)?;
        writeln!(f, "Preemptions : {}", snapshot.scheduler.preemptions)?;
        writeln!(f, "Completions : {}", snapshot.scheduler.completions)?;
        writeln!(f)?;
        write_memory_block(f, snapshot)?;
        writeln!(f)?;
        writeln!(f, "--- Process List ---")?;
        for p in &snapshot.processes {
            writeln!(
                f,
                "- {} (ID: {}) | {} KB | {} | {} | Progress: {}/{}",
                p.name,
                p.pid,
                p.memory_required_kb,
                memory_status(p),
                p.state,
                p.progress(),
                p.total_instructions
            )?;
        }
        Ok(())
    }
}
