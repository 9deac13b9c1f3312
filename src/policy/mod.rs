pub mod agent;
pub mod collector;
pub mod predictor;
pub mod wire;

use std::io;

use self::agent::Agent;
use self::collector::Collector;
use self::predictor::Predictor;
use crate::cluster::ClusterState;
use crate::metrics::{HwSample, TickMetrics};

/// The active policy adapter. Exactly one variant is live for the lifetime
/// of a run (spec §4.D: mode is selected at build/launch time).
pub enum PolicyAdapter {
    Collect(Collector),
    Predictor(Predictor),
    Agent(Agent),
}

impl PolicyAdapter {
    /// Drives one tick of the active adapter.
    ///
    /// Returns `Some(next_state)` when a re-pin decision was made, `None`
    /// when the adapter doesn't make decisions (collector mode) or chose to
    /// retain the current state.
    pub fn on_tick(
        &mut self,
        metrics: &TickMetrics,
        total: HwSample,
        current: ClusterState,
    ) -> io::Result<Option<ClusterState>> {
        match self {
            PolicyAdapter::Collect(sink) => {
                sink.record(metrics, total)?;
                Ok(None)
            }
            PolicyAdapter::Predictor(predictor) => {
                let next = predictor.decide(metrics, current)?;
                Ok((next != current).then_some(next))
            }
            PolicyAdapter::Agent(agent) => {
                let next = agent.decide(metrics, current)?;
                Ok((next != current).then_some(next))
            }
        }
    }
}
