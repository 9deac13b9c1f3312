//! Build-time and environment knobs.
//!
//! The policy mode is a build-time constant per the reference design, but we
//! also accept a `SCHED_MODE` environment override so the same binary can be
//! exercised under all three modes in tests (§8 scenarios) without a rebuild.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::cluster::ClusterState;

/// Control loop period. Not configurable: the 20ms cadence is load-bearing
/// for the "best-effort, tolerate jitter" scheduling model (spec §5).
pub const TICK_PERIOD_MS: u64 = 20;

/// Affinity masks, keyed by [`ClusterState`], for an 8-core big.LITTLE part
/// with cores 0-3 LITTLE and 4-7 BIG.
pub const MASK_LITTLE: &str = "0-3";
pub const MASK_BIG: &str = "4-7";
pub const MASK_BOTH: &str = "0-7";

/// Shell command lines used to launch the external policy process.
pub const POLICY_CMD_PREDICTOR: &str = "python3 ./predictor.py";
pub const POLICY_CMD_AGENT: &str = "python3 ./agent.py";

/// Which policy adapter drives cluster decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Telemetry only: log metrics to CSV, never re-pin.
    Collect,
    /// Consult the regression-model policy process.
    Predictor,
    /// Consult the learned-agent policy process.
    Agent,
}

/// Build-time default. Flip this to retarget the binary without relying on
/// the environment override below.
pub const DEFAULT_MODE: Mode = Mode::Collect;

#[derive(Debug)]
pub struct UnknownMode(String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown SCHED_MODE {:?}, expected collect|predictor|agent", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "collect" | "collector" => Ok(Mode::Collect),
            "predictor" => Ok(Mode::Predictor),
            "agent" => Ok(Mode::Agent),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

impl Mode {
    /// Resolves the active mode: `SCHED_MODE` env var if set, else [`DEFAULT_MODE`].
    pub fn resolve() -> Result<Self, UnknownMode> {
        match env::var("SCHED_MODE") {
            Err(_) => Ok(DEFAULT_MODE),
            Ok(val) => val.parse(),
        }
    }
}

/// Affinity mask string for a given cluster state.
pub fn mask_for(state: ClusterState) -> &'static str {
    match state {
        ClusterState::Little => MASK_LITTLE,
        ClusterState::Big => MASK_BIG,
        ClusterState::Both => MASK_BOTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_for_each_cluster_state() {
        assert_eq!(mask_for(ClusterState::Little), "0-3");
        assert_eq!(mask_for(ClusterState::Big), "4-7");
        assert_eq!(mask_for(ClusterState::Both), "0-7");
    }

    #[test]
    fn unknown_mode_rejected() {
        assert!("nope".parse::<Mode>().is_err());
    }

    #[test]
    fn known_modes_parse_case_insensitively() {
        assert_eq!("PREDICTOR".parse::<Mode>().unwrap(), Mode::Predictor);
        assert_eq!("agent".parse::<Mode>().unwrap(), Mode::Agent);
    }
}
