use anyhow::{Context, Result};

use crate::config::sibling::Opts as SiblingOpts;
use crate::config::{Cpu, Opts, Proc, StatFormat};
use crate::count::group::CounterGroup;
use crate::count::Counter;
use crate::event::hw::Hardware;
use crate::metrics::HwSample;

/// Opens and owns one hardware counter group per online CPU: cycles
/// (leader), retired instructions, last-level cache misses, retired
/// branches, and branch mispredictions (siblings, in that order).
///
/// Counters run unconditionally from [`PerfSampler::init`] until
/// [`PerfSampler::shutdown`]; [`PerfSampler::consume_hw`] reads the group and
/// atomically resets it (`PERF_IOC_FLAG_GROUP`), so every read already is
/// the delta since the previous one.
pub struct PerfSampler {
    groups: Vec<CounterGroup>,
}

impl PerfSampler {
    /// Number of online CPUs, as reported by `sysconf(_SC_NPROCESSORS_ONLN)`.
    pub fn nprocs() -> usize {
        let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        n.max(1) as usize
    }

    /// Opens a counter group on every online CPU. Failure to open any
    /// counter is fatal to startup (spec §4.B, §7 `StartupFatal`).
    pub fn init() -> Result<Self> {
        let nprocs = Self::nprocs();
        let mut groups = Vec::with_capacity(nprocs);

        for cpu in 0..nprocs as u32 {
            groups.push(Self::open_group(cpu).with_context(|| {
                format!("failed to open hardware counter group on cpu {cpu}")
            })?);
        }

        Ok(Self { groups })
    }

    fn open_group(cpu: u32) -> Result<CounterGroup> {
        let target = (Cpu(cpu), Proc::ALL);

        let mut opts = Opts::default();
        opts.enable = false;
        opts.stat_format = StatFormat {
            siblings: true,
            ..Default::default()
        };

        let leader = Counter::new(Hardware::CpuCycle, target, opts)?;
        let mut group = CounterGroup::from(leader);

        for event in [
            Hardware::Instr,
            Hardware::CacheMiss,
            Hardware::BranchInstr,
            Hardware::BranchMiss,
        ] {
            group.add(event, SiblingOpts::default())?;
        }

        // All five counters start ticking together, atomically, right now.
        group.enable()?;

        Ok(group)
    }

    /// Returns the delta counts on `cpu` since the previous consume (or
    /// since [`init`][Self::init]), then rearms the group for the next tick.
    pub fn consume_hw(&self, cpu: usize) -> Result<HwSample> {
        let group = self
            .groups
            .get(cpu)
            .with_context(|| format!("no counter group for cpu {cpu}"))?;

        let stat = group.leader().stat()?;
        group.clear_count()?;

        let sample = HwSample {
            cycles: stat.count,
            instructions: stat.siblings[0].count,
            cache_misses: stat.siblings[1].count,
            branches: stat.siblings[2].count,
            branch_misses: stat.siblings[3].count,
        };

        Ok(sample)
    }

    /// Disables every counter group. File descriptors close when `self`
    /// drops; this just stops them accumulating first.
    pub fn shutdown(&mut self) {
        for group in &self.groups {
            if let Err(err) = group.disable() {
                tracing::warn!(%err, "failed to disable counter group during shutdown");
            }
        }
    }
}
