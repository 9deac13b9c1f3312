use std::fs::File;
use std::io::{self, Write};

use crate::metrics::{HwSample, TickMetrics};

/// Collector-mode sink: appends one header-less CSV row per tick to
/// `scheduler_<pid>.csv` (spec §4.D). No decision is ever produced; the
/// effector is never invoked in this mode.
pub struct Collector {
    file: File,
}

impl Collector {
    /// Opens (creating or truncating) `scheduler_<pid>.csv` in the current
    /// working directory. Failure to open is `StartupFatal`.
    pub fn open(pid: i32) -> io::Result<Self> {
        let path = format!("scheduler_{pid}.csv");
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Appends one row: elapsed_ms, cycles, instructions, cache_misses,
    /// branches, branch_misses.
    pub fn record(&mut self, metrics: &TickMetrics, total: HwSample) -> io::Result<()> {
        writeln!(
            self.file,
            "{},{},{},{},{},{}",
            metrics.elapsed_ms,
            total.cycles,
            total.instructions,
            total.cache_misses,
            total.branches,
            total.branch_misses,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn rows_are_headerless_csv_in_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let guard = CwdGuard::enter(dir.path());

        let mut collector = Collector::open(4242).unwrap();
        let total = HwSample {
            cycles: 100,
            instructions: 200,
            cache_misses: 3,
            branches: 40,
            branch_misses: 1,
        };
        let metrics = TickMetrics { elapsed_ms: 20, ..Default::default() };
        collector.record(&metrics, total).unwrap();
        drop(collector);

        let contents = fs::read_to_string(dir.path().join("scheduler_4242.csv")).unwrap();
        assert_eq!(contents, "20,100,200,3,40,1\n");
        drop(guard);
    }

    /// Restores the process's working directory on drop, so tests running
    /// concurrently in the same binary don't fight over `std::env::set_current_dir`.
    struct CwdGuard(std::path::PathBuf);

    impl CwdGuard {
        fn enter(path: &std::path::Path) -> Self {
            let prev = std::env::current_dir().unwrap();
            std::env::set_current_dir(path).unwrap();
            Self(prev)
        }
    }

    impl Drop for CwdGuard {
        fn drop(&mut self) {
            let _ = std::env::set_current_dir(&self.0);
        }
    }
}
