/// Per-CPU hardware sample: counts accumulated on one CPU since the previous
/// consume. Always non-negative; the sampler resets the underlying counters
/// on every read (spec §3).
#[derive(Clone, Copy, Debug, Default)]
pub struct HwSample {
    pub cycles: u64,
    pub instructions: u64,
    pub cache_misses: u64,
    pub branches: u64,
    pub branch_misses: u64,
}

impl HwSample {
    /// Sums two samples, used to fold per-CPU deltas into a tick total.
    pub fn add(self, other: HwSample) -> HwSample {
        HwSample {
            cycles: self.cycles + other.cycles,
            instructions: self.instructions + other.instructions,
            cache_misses: self.cache_misses + other.cache_misses,
            branches: self.branches + other.branches,
            branch_misses: self.branch_misses + other.branch_misses,
        }
    }
}

/// Derived scalars for one tick, computed from the sum of per-CPU deltas
/// (summing before dividing avoids per-CPU ratio skew, spec §9).
#[derive(Clone, Copy, Debug, Default)]
pub struct TickMetrics {
    pub mkpi: f64,
    pub branch_miss_rate: f64,
    pub ipc: f64,
    pub cpu_pct: f64,
    pub elapsed_ms: u64,
}

/// Computes a tick's metrics from the summed hardware sample.
///
/// A zero denominator (cycles, instructions or branches) substitutes 0.0 for
/// the affected ratio instead of producing NaN/inf (the `DivisionGuard` kind
/// in the error table).
pub fn compute(total: HwSample, cpu_pct: f64, elapsed_ms: u64) -> TickMetrics {
    let mkpi = if total.instructions == 0 {
        0.0
    } else {
        (total.cache_misses as f64) * 1000.0 / (total.instructions as f64)
    };

    let branch_miss_rate = if total.branches == 0 {
        0.0
    } else {
        (total.branch_misses as f64) / (total.branches as f64)
    };

    let ipc = if total.cycles == 0 {
        0.0
    } else {
        (total.instructions as f64) / (total.cycles as f64)
    };

    TickMetrics {
        mkpi,
        branch_miss_rate,
        ipc,
        cpu_pct,
        elapsed_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_from_nonzero_counters() {
        let total = HwSample {
            cycles: 1000,
            instructions: 2000,
            cache_misses: 10,
            branches: 400,
            branch_misses: 8,
        };
        let m = compute(total, 42.0, 1234);
        assert_eq!(m.mkpi, 5.0);
        assert_eq!(m.branch_miss_rate, 0.02);
        assert_eq!(m.ipc, 2.0);
        assert_eq!(m.cpu_pct, 42.0);
        assert_eq!(m.elapsed_ms, 1234);
    }

    #[test]
    fn zero_denominators_substitute_zero() {
        let m = compute(HwSample::default(), 0.0, 0);
        assert_eq!(m.mkpi, 0.0);
        assert_eq!(m.branch_miss_rate, 0.0);
        assert_eq!(m.ipc, 0.0);
    }

    #[test]
    fn sum_folds_per_cpu_deltas() {
        let a = HwSample { cycles: 1, instructions: 2, cache_misses: 3, branches: 4, branch_misses: 5 };
        let b = HwSample { cycles: 10, instructions: 20, cache_misses: 30, branches: 40, branch_misses: 50 };
        let sum = a.add(b);
        assert_eq!(sum.cycles, 11);
        assert_eq!(sum.branch_misses, 55);
    }
}
