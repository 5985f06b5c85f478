//! Process-level metrics computed at scrape time.
//!
//! On Linux the values come from `/proc/self`; anything that cannot be read is
//! skipped for that scrape. Other platforms only report the start time.

use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::metrics::{fmt_f64, Collector};

const CPU_USER: &str = "process_cpu_user_seconds_total";
const CPU_SYSTEM: &str = "process_cpu_system_seconds_total";
const CPU_TOTAL: &str = "process_cpu_seconds_total";
const START_TIME: &str = "process_start_time_seconds";
const RESIDENT_MEMORY: &str = "process_resident_memory_bytes";
const VIRTUAL_MEMORY: &str = "process_virtual_memory_bytes";
const OPEN_FDS: &str = "process_open_fds";
const MAX_FDS: &str = "process_max_fds";

/// Conventional `USER_HZ`; `/proc/self/stat` reports CPU time in these ticks.
#[cfg(target_os = "linux")]
const CLOCK_TICKS_PER_SEC: f64 = 100.0;

pub struct ProcessCollector {
    start_time: f64,
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector {
    /// The start time is taken when the collector is built, i.e. at startup.
    pub fn new() -> Self {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Self { start_time }
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }
}

fn family(out: &mut String, name: &str, kind: &str, help: &str, value: f64) {
    let _ = writeln!(out, "# HELP {} {}", name, help);
    let _ = writeln!(out, "# TYPE {} {}", name, kind);
    let _ = writeln!(out, "{} {}", name, fmt_f64(value));
}

impl Collector for ProcessCollector {
    fn names(&self) -> Vec<&str> {
        vec![
            CPU_USER,
            CPU_SYSTEM,
            CPU_TOTAL,
            START_TIME,
            RESIDENT_MEMORY,
            VIRTUAL_MEMORY,
            OPEN_FDS,
            MAX_FDS,
        ]
    }

    fn render(&self, out: &mut String) {
        #[cfg(target_os = "linux")]
        {
            if let Some((user, system)) = linux::cpu_seconds() {
                family(out, CPU_USER, "counter", "Total user CPU time spent in seconds.", user);
                family(out, CPU_SYSTEM, "counter", "Total system CPU time spent in seconds.", system);
                family(
                    out,
                    CPU_TOTAL,
                    "counter",
                    "Total user and system CPU time spent in seconds.",
                    user + system,
                );
            }
        }

        family(
            out,
            START_TIME,
            "gauge",
            "Start time of the process since unix epoch in seconds.",
            self.start_time,
        );

        #[cfg(target_os = "linux")]
        {
            if let Some((rss, vsize)) = linux::memory_bytes() {
                family(out, RESIDENT_MEMORY, "gauge", "Resident memory size in bytes.", rss);
                family(out, VIRTUAL_MEMORY, "gauge", "Virtual memory size in bytes.", vsize);
            }
            if let Some(open) = linux::open_fds() {
                family(out, OPEN_FDS, "gauge", "Number of open file descriptors.", open);
            }
            if let Some(max) = linux::max_fds() {
                family(out, MAX_FDS, "gauge", "Maximum number of open file descriptors.", max);
            }
        }
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use std::fs;

    use super::CLOCK_TICKS_PER_SEC;

    /// (user, system) CPU seconds from `/proc/self/stat`.
    pub(super) fn cpu_seconds() -> Option<(f64, f64)> {
        let stat = fs::read_to_string("/proc/self/stat").ok()?;
        parse_stat_cpu(&stat)
    }

    // The comm field may contain spaces and parens; fields resume after the last ')'.
    // utime and stime are fields 14 and 15, i.e. indexes 11 and 12 after it.
    pub(super) fn parse_stat_cpu(stat: &str) -> Option<(f64, f64)> {
        let rest = &stat[stat.rfind(')')? + 1..];
        let fields: Vec<&str> = rest.split_whitespace().collect();
        let utime: f64 = fields.get(11)?.parse().ok()?;
        let stime: f64 = fields.get(12)?.parse().ok()?;
        Some((utime / CLOCK_TICKS_PER_SEC, stime / CLOCK_TICKS_PER_SEC))
    }

    /// (resident, virtual) bytes from `/proc/self/status`.
    pub(super) fn memory_bytes() -> Option<(f64, f64)> {
        let status = fs::read_to_string("/proc/self/status").ok()?;
        let rss = status_kb(&status, "VmRSS:")?;
        let vsize = status_kb(&status, "VmSize:")?;
        Some((rss * 1024.0, vsize * 1024.0))
    }

    fn status_kb(status: &str, key: &str) -> Option<f64> {
        let line = status.lines().find(|l| l.starts_with(key))?;
        line[key.len()..].split_whitespace().next()?.parse().ok()
    }

    pub(super) fn open_fds() -> Option<f64> {
        let entries = fs::read_dir("/proc/self/fd").ok()?;
        Some(entries.count() as f64)
    }

    pub(super) fn max_fds() -> Option<f64> {
        let limits = fs::read_to_string("/proc/self/limits").ok()?;
        let line = limits.lines().find(|l| l.starts_with("Max open files"))?;
        // "Max open files  <soft>  <hard>  files"
        line["Max open files".len()..]
            .split_whitespace()
            .next()?
            .parse()
            .ok()
    }
}
