//! Default process metrics.
//!
//! Refreshed from `sysinfo` on every scrape and published as gauges under
//! the configured prefix (`todo_app_process_*`).

use metrics::{describe_gauge, gauge, Recorder};
use std::sync::Mutex;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Snapshot of the current process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessStats {
    pub resident_memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    pub cpu_usage_percent: f32,
    pub start_time_seconds: u64,
    pub run_time_seconds: u64,
}

pub struct ProcessCollector {
    prefix: String,
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ProcessCollector {
    pub fn new(prefix: impl Into<String>) -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!(error = %e, "Process metrics unavailable on this platform");
                None
            }
        };

        Self {
            prefix: prefix.into(),
            pid,
            system: Mutex::new(System::new()),
        }
    }

    fn name(&self, suffix: &str) -> String {
        format!("{}process_{}", self.prefix, suffix)
    }

    pub fn describe(&self, recorder: &dyn Recorder) {
        metrics::with_local_recorder(recorder, || {
            describe_gauge!(self.name("resident_memory_bytes"), "Resident memory size in bytes");
            describe_gauge!(self.name("virtual_memory_bytes"), "Virtual memory size in bytes");
            describe_gauge!(self.name("cpu_usage_percent"), "CPU usage of the process in percent");
            describe_gauge!(
                self.name("start_time_seconds"),
                "Start time of the process since unix epoch in seconds"
            );
            describe_gauge!(self.name("run_time_seconds"), "Time the process has been running in seconds");
        });
    }

    /// Refresh the process entry and read it.
    pub fn snapshot(&self) -> Option<ProcessStats> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
        let process = system.process(pid)?;

        Some(ProcessStats {
            resident_memory_bytes: process.memory(),
            virtual_memory_bytes: process.virtual_memory(),
            cpu_usage_percent: process.cpu_usage(),
            start_time_seconds: process.start_time(),
            run_time_seconds: process.run_time(),
        })
    }

    /// Publish a fresh snapshot into `recorder`. Does nothing when the
    /// process cannot be inspected.
    pub fn collect(&self, recorder: &dyn Recorder) {
        let Some(stats) = self.snapshot() else {
            return;
        };

        metrics::with_local_recorder(recorder, || {
            gauge!(self.name("resident_memory_bytes")).set(stats.resident_memory_bytes as f64);
            gauge!(self.name("virtual_memory_bytes")).set(stats.virtual_memory_bytes as f64);
            gauge!(self.name("cpu_usage_percent")).set(stats.cpu_usage_percent as f64);
            gauge!(self.name("start_time_seconds")).set(stats.start_time_seconds as f64);
            gauge!(self.name("run_time_seconds")).set(stats.run_time_seconds as f64);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        let collector = ProcessCollector::new("todo_app_");
        assert_eq!(collector.name("resident_memory_bytes"), "todo_app_process_resident_memory_bytes");
    }

    #[test]
    fn test_snapshot_reads_current_process() {
        let collector = ProcessCollector::new("todo_app_");
        if let Some(stats) = collector.snapshot() {
            assert!(stats.resident_memory_bytes > 0);
        }
    }
}
