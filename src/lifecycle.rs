use std::process;

use anyhow::{Context, Result};

use crate::error::SchedulerError;
use crate::policy::collector::Collector;
use crate::policy::wire::PolicyPipe;
use crate::policy::{agent::Agent, predictor::Predictor, PolicyAdapter};
use crate::sampler::PerfSampler;
use crate::settings::{self, Mode};
use crate::supervisor::ProcessSupervisor;

/// Single owning aggregate for every resource the supervisor acquires:
/// the workload and policy children, the hardware counter groups, and the
/// collector's log file. Its destructor runs [`Lifecycle::cleanup`], so no
/// exit path — normal or error — can leak a handle (spec §9, I5).
pub struct Lifecycle {
    pub supervisor: ProcessSupervisor,
    pub sampler: PerfSampler,
    pub adapter: PolicyAdapter,
    cleaned: bool,
}

impl Lifecycle {
    /// Startup order: mode-specific adapter init (log file or policy
    /// process) → spawn workload → perf init (spec §4.G). Any failure rolls
    /// back everything acquired so far and returns a `StartupFatal`.
    pub fn start(mode: Mode, argv: &[String]) -> Result<Self> {
        let supervisor_pid = process::id() as i32;
        let mut supervisor = ProcessSupervisor::new();

        let adapter = Self::init_adapter(mode, supervisor_pid, &mut supervisor).map_err(|err| {
            SchedulerError::startup(err)
        })?;

        if let Err(err) = supervisor
            .spawn_workload(argv)
            .context("spawning workload")
        {
            supervisor.terminate_all();
            return Err(SchedulerError::startup(err).into());
        }

        let sampler = match PerfSampler::init().context("initializing hardware counters") {
            Ok(sampler) => sampler,
            Err(err) => {
                supervisor.terminate_all();
                return Err(SchedulerError::startup(err).into());
            }
        };

        Ok(Self {
            supervisor,
            sampler,
            adapter,
            cleaned: false,
        })
    }

    fn init_adapter(
        mode: Mode,
        supervisor_pid: i32,
        supervisor: &mut ProcessSupervisor,
    ) -> Result<PolicyAdapter> {
        match mode {
            Mode::Collect => {
                let collector = Collector::open(supervisor_pid).context("opening collector CSV")?;
                Ok(PolicyAdapter::Collect(collector))
            }
            Mode::Predictor => {
                let (stdin, stdout) = supervisor
                    .spawn_policy(settings::POLICY_CMD_PREDICTOR)
                    .context("spawning predictor policy process")?;
                Ok(PolicyAdapter::Predictor(Predictor::new(PolicyPipe::new(
                    stdin, stdout,
                ))))
            }
            Mode::Agent => {
                let (stdin, stdout) = supervisor
                    .spawn_policy(settings::POLICY_CMD_AGENT)
                    .context("spawning agent policy process")?;
                Ok(PolicyAdapter::Agent(Agent::new(PolicyPipe::new(
                    stdin, stdout,
                ))))
            }
        }
    }

    /// Releases every owned resource in reverse acquisition order: policy
    /// pipes/child, workload child, hardware counters. Safe to call more
    /// than once and from any exit path (I5, P7).
    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.supervisor.terminate_all();
        self.sampler.shutdown();
        self.cleaned = true;
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.cleanup();
    }
}
