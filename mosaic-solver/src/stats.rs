//! Evaluator statistics tracking.

use std::time::Instant;

use tracing::info;

/// Get current process memory usage in bytes (RSS - Resident Set Size).
/// Returns None if unable to determine.
#[cfg(target_os = "macos")]
pub fn get_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    // macOS: use mach APIs
    extern "C" {
        fn mach_task_self() -> u32;
        fn task_info(
            target_task: u32,
            flavor: i32,
            task_info_out: *mut libc::c_void,
            task_info_out_cnt: *mut u32,
        ) -> i32;
    }

    #[repr(C)]
    struct TaskBasicInfo {
        suspend_count: i32,
        virtual_size: u64,
        resident_size: u64,
        user_time: (i32, i32),
        system_time: (i32, i32),
        policy: i32,
    }

    const TASK_BASIC_INFO_64: i32 = 5;
    const TASK_BASIC_INFO_64_COUNT: u32 = 10;

    unsafe {
        let mut info = MaybeUninit::<TaskBasicInfo>::uninit();
        let mut count = TASK_BASIC_INFO_64_COUNT;

        let result = task_info(
            mach_task_self(),
            TASK_BASIC_INFO_64,
            info.as_mut_ptr() as *mut libc::c_void,
            &mut count,
        );

        if result == 0 {
            Some(info.assume_init().resident_size)
        } else {
            None
        }
    }
}

#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    // Linux: read from /proc/self/status
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Statistics collected during evaluation.
#[derive(Debug, Default)]
pub struct EvalStats {
    /// Positions whose Grundy value was computed from their options
    pub positions_evaluated: u64,

    /// Memo hits (Grundy or bracket table)
    pub cache_hits: u64,

    /// Positions where neither side can move
    pub terminal_positions: u64,

    /// Bracket nodes cut off by the depth limit
    pub depth_stubs: u64,

    /// Maximum search stack depth reached
    pub max_depth: u64,

    /// For rate calculation
    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_positions: u64,
}

impl EvalStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Get current positions per second
    pub fn positions_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.positions_evaluated as f64 / elapsed;
            }
        }
        0.0
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        match self.last_log_time {
            Some(last) => last.elapsed().as_secs() >= interval_secs,
            None => true,
        }
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, table_size: usize) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        // Rate since last log
        let rate = match self.last_log_time {
            Some(last) => {
                let elapsed = last.elapsed().as_secs_f64();
                let positions = self.positions_evaluated - self.last_log_positions;
                if elapsed > 0.0 {
                    positions as f64 / elapsed
                } else {
                    0.0
                }
            }
            None => self.positions_per_sec(),
        };

        let mem = get_memory_usage().map(format_bytes).unwrap_or_default();

        info!(
            elapsed = %format!(
                "{:02}:{:02}:{:02}",
                elapsed_total / 3600,
                (elapsed_total % 3600) / 60,
                elapsed_total % 60
            ),
            positions = self.positions_evaluated,
            unique = table_size,
            cache_hits = self.cache_hits,
            rate = %format!("{:.0}/s", rate),
            depth = self.max_depth,
            terminals = self.terminal_positions,
            mem = %mem,
            "evaluation progress"
        );

        self.last_log_time = Some(now);
        self.last_log_positions = self.positions_evaluated;
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Positions evaluated: {}", self.positions_evaluated);
        println!("Cache hits: {}", self.cache_hits);
        println!("Terminal positions: {}", self.terminal_positions);
        println!("Depth stubs: {}", self.depth_stubs);
        println!("Max depth: {}", self.max_depth);

        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                println!(
                    "Average rate: {:.0} positions/sec",
                    self.positions_evaluated as f64 / elapsed
                );
            }
        }
        if let Some(mem) = get_memory_usage() {
            println!("Memory: {}", format_bytes(mem));
        }
    }
}
