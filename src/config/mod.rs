use std::io::Result;

use crate::ffi::bindings as b;
use crate::ffi::Attr;

pub(super) mod attr;
pub mod sibling;
mod target;

pub use target::*;

/// Per-counter configuration passed to [`Counter::new`][crate::count::Counter::new].
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Privilege levels to exclude from the count.
    pub exclude: Priv,

    /// Whether the counter starts enabled. `Counter::enable` can always
    /// be called later regardless of this setting.
    pub enable: bool,

    /// Layout of the value(s) returned by [`Counter::stat`][crate::count::Counter::stat].
    pub stat_format: StatFormat,
}

/// Privilege levels to exclude from counting.
///
/// Leaving every field `false` counts across all of them, which is what a
/// system-wide, cross-process sampler wants.
#[derive(Clone, Copy, Debug, Default)]
pub struct Priv {
    /// User space.
    pub user: bool,

    /// Kernel space.
    pub kernel: bool,

    /// Hypervisor.
    pub hv: bool,

    /// Host mode.
    pub host: bool,

    /// Guest mode.
    pub guest: bool,

    /// Idle task.
    pub idle: bool,
}

/// Controls the layout of [`Stat`][crate::count::Stat] returned by a read.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatFormat {
    /// Contains the [event ID][crate::count::SiblingStat::id].
    pub id: bool,

    /// Contains the [enabled time][crate::count::Stat::time_enabled] of the counter.
    pub time_enabled: bool,

    /// Contains the [running time][crate::count::Stat::time_running] of the counter.
    pub time_running: bool,

    /// Contains the [number of lost records][crate::count::SiblingStat::lost_records].
    pub lost_records: bool,

    /// Contains [sibling event counts][crate::count::Stat::siblings].
    pub siblings: bool,
}

impl StatFormat {
    pub(crate) fn as_read_format(&self) -> Result<u64> {
        let mut val = 0;
        macro_rules! when {
            ($field:ident, $flag:ident) => {
                if self.$field {
                    val |= b::$flag as u64;
                }
            };
        }
        when!(id, PERF_FORMAT_ID);
        when!(time_enabled, PERF_FORMAT_TOTAL_TIME_ENABLED);
        when!(time_running, PERF_FORMAT_TOTAL_TIME_RUNNING);
        when!(lost_records, PERF_FORMAT_LOST);
        when!(siblings, PERF_FORMAT_GROUP);
        Ok(val)
    }
}

pub(crate) fn apply_exclude(attr: &mut Attr, exclude: &Priv) {
    macro_rules! when {
        ($bool:ident, $then:tt) => {
            if exclude.$bool {
                attr.$then(1);
            }
        };
    }
    when!(user, set_exclude_user);
    when!(kernel, set_exclude_kernel);
    when!(hv, set_exclude_hv);
    when!(host, set_exclude_host);
    when!(guest, set_exclude_guest);
    when!(idle, set_exclude_idle);
}
