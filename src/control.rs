use std::fs;
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::cluster::ClusterState;
use crate::effector;
use crate::error::SchedulerError;
use crate::lifecycle::Lifecycle;
use crate::metrics::{self, HwSample};
use crate::sampler::PerfSampler;
use crate::settings;
use crate::supervisor::WorkloadStatus;
use crate::time;

/// Drives the fixed-period control loop until the workload exits.
///
/// Per tick, in this strict order (spec §4.F, §5): poll workload liveness →
/// CPU% → perf-consume (summed across CPUs) → policy-request/reply →
/// affinity-apply. The policy never sees tick N+1's request before tick N's
/// reply has been read.
pub fn run(lifecycle: &mut Lifecycle) -> Result<()> {
    let workload_pid = lifecycle
        .supervisor
        .workload_pid()
        .expect("workload spawned during Lifecycle::start");
    let workload_start = lifecycle
        .supervisor
        .workload_start()
        .expect("workload spawned during Lifecycle::start");

    let mut current = ClusterState::default();
    let period = Duration::from_millis(settings::TICK_PERIOD_MS);

    loop {
        let status = lifecycle.supervisor.poll_workload();
        let alive = status == WorkloadStatus::Alive;

        let cpu_pct = lifecycle.supervisor.workload_cpu_usage();
        let total = sum_hw_samples(&lifecycle.sampler);
        let elapsed_ms = time::to_millis(time::now(), workload_start);
        let tick_metrics = metrics::compute(total, cpu_pct, elapsed_ms);

        match lifecycle
            .adapter
            .on_tick(&tick_metrics, total, current)
        {
            Ok(Some(next)) if alive => {
                let mask = settings::mask_for(next);
                // Advance the committed state regardless of the effector's
                // success, to avoid a per-tick retry storm (`EffectorFailure`).
                effector::apply(mask, workload_pid);
                current = next;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(%err, "policy adapter failed");
                return Err(SchedulerError::Pipe(err).into());
            }
        }

        if !alive {
            fs::write(
                format!("scheduler_{}.time", process::id()),
                elapsed_ms.to_string(),
            )?;
            return Ok(());
        }

        thread::sleep(period);
    }
}

fn sum_hw_samples(sampler: &PerfSampler) -> HwSample {
    let mut total = HwSample::default();
    for cpu in 0..PerfSampler::nprocs() {
        match sampler.consume_hw(cpu) {
            Ok(sample) => total = total.add(sample),
            Err(err) => tracing::warn!(%err, cpu, "failed to consume hardware counters"),
        }
    }
    total
}
