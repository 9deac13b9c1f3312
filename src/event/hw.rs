use super::{try_from, EventConfig};
use crate::ffi::bindings as b;

/// Hardware events exposed by the CPU's performance monitoring unit.
///
/// These map onto `PERF_TYPE_HARDWARE` and `PERF_TYPE_HW_CACHE`, the two
/// `perf_event_open` event types backed directly by PMU counters rather than
/// by kernel-software accounting or tracepoints.
#[derive(Clone, Copy, Debug)]
pub enum Hardware {
    CpuCycle,
    BusCycle,
    RefCpuCycle,

    Cache(Type, Op, OpResult),
    /// Shorthand for `Cache(Ll, Read, Miss)`, the last-level cache miss count
    /// `perf stat`'s `cache-misses` reports.
    CacheMiss,
    /// Shorthand for `Cache(Ll, Read, Access)`, paired with [`CacheMiss`][Hardware::CacheMiss]
    /// to compute a miss rate.
    CacheAccess,

    BranchMiss,
    BranchInstr,

    BackendStalledCycle,
    FrontendStalledCycle,

    Instr,
}

#[derive(Clone, Copy, Debug)]
pub enum Type {
    L1d,
    L1i,
    Ll,
    Dtlb,
    Itlb,
    Bpu,
    Node,
}

#[derive(Clone, Copy, Debug)]
pub enum Op {
    Read,
    Write,
    Prefetch,
}

#[derive(Clone, Copy, Debug)]
pub enum OpResult {
    Miss,
    Access,
}

impl Type {
    fn raw(self) -> u64 {
        (match self {
            Type::L1d => b::PERF_COUNT_HW_CACHE_L1D,
            Type::L1i => b::PERF_COUNT_HW_CACHE_L1I,
            Type::Ll => b::PERF_COUNT_HW_CACHE_LL,
            Type::Dtlb => b::PERF_COUNT_HW_CACHE_DTLB,
            Type::Itlb => b::PERF_COUNT_HW_CACHE_ITLB,
            Type::Bpu => b::PERF_COUNT_HW_CACHE_BPU,
            Type::Node => b::PERF_COUNT_HW_CACHE_NODE,
        }) as u64
    }
}

impl Op {
    fn raw(self) -> u64 {
        (match self {
            Op::Read => b::PERF_COUNT_HW_CACHE_OP_READ,
            Op::Write => b::PERF_COUNT_HW_CACHE_OP_WRITE,
            Op::Prefetch => b::PERF_COUNT_HW_CACHE_OP_PREFETCH,
        }) as u64
    }
}

impl OpResult {
    fn raw(self) -> u64 {
        (match self {
            OpResult::Miss => b::PERF_COUNT_HW_CACHE_RESULT_MISS,
            OpResult::Access => b::PERF_COUNT_HW_CACHE_RESULT_ACCESS,
        }) as u64
    }
}

try_from!(Hardware, value, {
    let cfg = match *value {
        Hardware::CpuCycle => EventConfig {
            ty: b::PERF_TYPE_HARDWARE,
            config: b::PERF_COUNT_HW_CPU_CYCLES as u64,
        },
        Hardware::BusCycle => EventConfig {
            ty: b::PERF_TYPE_HARDWARE,
            config: b::PERF_COUNT_HW_BUS_CYCLES as u64,
        },
        Hardware::RefCpuCycle => EventConfig {
            ty: b::PERF_TYPE_HARDWARE,
            config: b::PERF_COUNT_HW_REF_CPU_CYCLES as u64,
        },
        Hardware::Instr => EventConfig {
            ty: b::PERF_TYPE_HARDWARE,
            config: b::PERF_COUNT_HW_INSTRUCTIONS as u64,
        },
        Hardware::BranchInstr => EventConfig {
            ty: b::PERF_TYPE_HARDWARE,
            config: b::PERF_COUNT_HW_BRANCH_INSTRUCTIONS as u64,
        },
        Hardware::BranchMiss => EventConfig {
            ty: b::PERF_TYPE_HARDWARE,
            config: b::PERF_COUNT_HW_BRANCH_MISSES as u64,
        },
        Hardware::BackendStalledCycle => EventConfig {
            ty: b::PERF_TYPE_HARDWARE,
            config: b::PERF_COUNT_HW_STALLED_CYCLES_BACKEND as u64,
        },
        Hardware::FrontendStalledCycle => EventConfig {
            ty: b::PERF_TYPE_HARDWARE,
            config: b::PERF_COUNT_HW_STALLED_CYCLES_FRONTEND as u64,
        },
        Hardware::CacheMiss => EventConfig {
            ty: b::PERF_TYPE_HW_CACHE,
            config: Type::Ll.raw() | (Op::Read.raw() << 8) | (OpResult::Miss.raw() << 16),
        },
        Hardware::CacheAccess => EventConfig {
            ty: b::PERF_TYPE_HW_CACHE,
            config: Type::Ll.raw() | (Op::Read.raw() << 8) | (OpResult::Access.raw() << 16),
        },
        Hardware::Cache(ty, op, result) => EventConfig {
            ty: b::PERF_TYPE_HW_CACHE,
            config: ty.raw() | (op.raw() << 8) | (result.raw() << 16),
        },
    };

    Ok(crate::event::Event(cfg))
});
