use std::io;

use super::wire::{encode_hexf64, PolicyPipe};
use crate::cluster::ClusterState;
use crate::metrics::TickMetrics;

/// Learned-agent policy adapter (spec §4.D "Agent mode").
///
/// Once per tick, sends one request and maps the single-token reply
/// directly onto a cluster state.
pub struct Agent {
    pipe: PolicyPipe,
}

impl Agent {
    pub fn new(pipe: PolicyPipe) -> Self {
        Self { pipe }
    }

    pub fn decide(&mut self, metrics: &TickMetrics, current: ClusterState) -> io::Result<ClusterState> {
        let line = format!(
            "{} {} {}",
            encode_hexf64(metrics.mkpi),
            encode_hexf64(metrics.branch_miss_rate),
            encode_hexf64(metrics.ipc),
        );
        self.pipe.write_line(&line)?;

        let reply = self.pipe.read_line()?;
        Ok(map_reply(reply.trim(), current))
    }
}

/// Maps a reply token onto a cluster state, retaining `current` for any
/// token other than `4L`, `4B`, `4B4L` (`InvalidPolicyReply`, logged by the
/// caller).
fn map_reply(token: &str, current: ClusterState) -> ClusterState {
    match token {
        "4L" => ClusterState::Little,
        "4B" => ClusterState::Big,
        "4B4L" => ClusterState::Both,
        other => {
            tracing::warn!(reply = other, "agent returned an unrecognized token, retaining current state");
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_map_to_cluster_states() {
        assert_eq!(map_reply("4L", ClusterState::Both), ClusterState::Little);
        assert_eq!(map_reply("4B", ClusterState::Both), ClusterState::Big);
        assert_eq!(map_reply("4B4L", ClusterState::Little), ClusterState::Both);
    }

    #[test]
    fn unknown_token_retains_current() {
        assert_eq!(map_reply("HELLO", ClusterState::Big), ClusterState::Big);
    }
}
