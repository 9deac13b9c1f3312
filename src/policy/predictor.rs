use std::io;

use super::wire::{decode_hexf64, encode_hexf64, PolicyPipe};
use crate::cluster::ClusterState;
use crate::metrics::TickMetrics;

/// Regression-model policy adapter (spec §4.D "Predictor mode").
///
/// Once per tick, probes the policy process once per candidate cluster
/// state with a request describing that candidate, and picks the argmax of
/// the returned MIPS estimates.
pub struct Predictor {
    pipe: PolicyPipe,
}

impl Predictor {
    pub fn new(pipe: PolicyPipe) -> Self {
        Self { pipe }
    }

    pub fn decide(&mut self, metrics: &TickMetrics, current: ClusterState) -> io::Result<ClusterState> {
        let mut estimates = [0.0_f64; 3];

        for (i, candidate) in ClusterState::ENUM_ORDER.into_iter().enumerate() {
            let (has_big, has_little) = candidate.has_big_little();
            let line = format!(
                "{} {} {} {} {} {}",
                encode_hexf64(metrics.mkpi),
                encode_hexf64(metrics.branch_miss_rate),
                encode_hexf64(metrics.ipc),
                has_big as u8,
                has_little as u8,
                encode_hexf64(metrics.cpu_pct),
            );
            self.pipe.write_line(&line)?;

            let reply = self.pipe.read_line()?;
            estimates[i] = reply
                .trim()
                .parse()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        }

        Ok(pick_best(estimates, current))
    }
}

/// Argmax over `(LITTLE, BIG, BOTH)` estimates, retaining `current` if every
/// estimate is non-positive.
///
/// Tie-break: the reference implementation's comparison is a strict `>`, so
/// equal estimates keep whichever candidate was compared last; probed in
/// `LITTLE, BIG, BOTH` order, that means BOTH wins a three-way tie. We make
/// that explicit rather than leaving it implicit (spec §9 "Open question").
fn pick_best(estimates: [f64; 3], current: ClusterState) -> ClusterState {
    let mut best: Option<(ClusterState, f64)> = None;

    for (candidate, mips) in ClusterState::ENUM_ORDER.into_iter().zip(estimates) {
        let is_better = match best {
            None => true,
            Some((_, best_mips)) => mips >= best_mips,
        };
        if is_better {
            best = Some((candidate, mips));
        }
    }

    match best {
        Some((candidate, mips)) if mips > 0.0 => candidate,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hexf64_roundtrips() {
        for v in [0.0, 1.0, -3.5, f64::MAX, f64::MIN_POSITIVE] {
            let encoded = encode_hexf64(v);
            let decoded = decode_hexf64(&encoded).unwrap();
            assert_eq!(v.to_bits(), decoded.to_bits());
        }
    }

    #[test]
    fn monotone_big_wins() {
        // (LITTLE, BIG, BOTH) = (1000.0, 2000.0, 1500.0)
        let state = pick_best([1000.0, 2000.0, 1500.0], ClusterState::Both);
        assert_eq!(state, ClusterState::Big);
    }

    #[test]
    fn three_way_tie_favors_both() {
        let state = pick_best([500.0, 500.0, 500.0], ClusterState::Little);
        assert_eq!(state, ClusterState::Both);
    }

    #[test]
    fn all_non_positive_retains_current() {
        let state = pick_best([-1.0, 0.0, -5.0], ClusterState::Little);
        assert_eq!(state, ClusterState::Little);
    }
}
