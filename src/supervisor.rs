use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use anyhow::{Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use crate::time::{self, Timestamp};

/// Liveness of the workload as observed by [`ProcessSupervisor::poll_workload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadStatus {
    Alive,
    Exited,
}

struct WorkloadHandle {
    child: Child,
    pid: i32,
    start: Timestamp,
    /// Set once [`ProcessSupervisor::poll_workload`] observes the child has
    /// exited and reaps it via `try_wait`. Termination must not re-signal or
    /// re-wait a handle that's already been reaped (spec §4.G "SIGTERM + wait
    /// if still alive"): the PID could have been recycled by the OS by then.
    reaped: bool,
}

/// Owns the workload child and the optional policy child: their PIDs,
/// stdio pipes, and termination (spec §4.C).
///
/// At most one workload and one policy process are alive at a time (I1, I2);
/// both are `Option`s with no partially-open state in between.
pub struct ProcessSupervisor {
    workload: Option<WorkloadHandle>,
    policy: Option<Child>,
}

impl ProcessSupervisor {
    pub fn new() -> Self {
        Self {
            workload: None,
            policy: None,
        }
    }

    /// Installs `PR_SET_PDEATHSIG SIGTERM` in the child before exec, so an
    /// abnormal supervisor death (SIGKILL, panic-abort) doesn't orphan it.
    fn die_with_parent(cmd: &mut Command) {
        unsafe {
            cmd.pre_exec(|| {
                if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM as libc::c_ulong) != 0 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    /// Forks and execs the workload, inheriting the supervisor's environment
    /// and stdio. Fatal to startup on failure (`StartupFatal`).
    pub fn spawn_workload(&mut self, argv: &[String]) -> Result<()> {
        let (program, args) = argv
            .split_first()
            .context("workload argv must not be empty")?;

        let child = Command::new(program)
            .args(args)
            .spawn()
            .with_context(|| format!("failed to spawn workload {program:?}"))?;

        let pid = child.id() as i32;
        self.workload = Some(WorkloadHandle {
            child,
            pid,
            start: time::now(),
            reaped: false,
        });
        Ok(())
    }

    /// Forks and execs `shell_command` via `sh -c`, wiring its stdin/stdout
    /// as anonymous pipes. Returns the supervisor's ends: writes go to the
    /// policy's stdin, reads come from its stdout.
    pub fn spawn_policy(&mut self, shell_command: &str) -> Result<(ChildStdin, ChildStdout)> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(shell_command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped());
        Self::die_with_parent(&mut cmd);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn policy process {shell_command:?}"))?;

        let stdin = child.stdin.take().context("policy child has no stdin")?;
        let stdout = child.stdout.take().context("policy child has no stdout")?;

        self.policy = Some(child);
        Ok((stdin, stdout))
    }

    /// Workload PID, if a workload has been spawned.
    pub fn workload_pid(&self) -> Option<i32> {
        self.workload.as_ref().map(|w| w.pid)
    }

    /// Timestamp the workload was spawned at.
    pub fn workload_start(&self) -> Option<Timestamp> {
        self.workload.as_ref().map(|w| w.start)
    }

    /// The workload's current CPU utilization percentage, aggregated across
    /// all of its threads, via `ps -L -o %cpu= -p <pid>`.
    ///
    /// A parse failure yields 0.0 and is never fatal (`TransientSample`).
    pub fn workload_cpu_usage(&self) -> f64 {
        let Some(pid) = self.workload_pid() else {
            return 0.0;
        };

        let output = Command::new("ps")
            .args(["-L", "-o", "%cpu=", "-p"])
            .arg(pid.to_string())
            .output();

        let output = match output {
            Ok(out) if out.status.success() => out,
            Ok(out) => {
                tracing::debug!(?pid, status = ?out.status, "ps exited non-zero");
                return 0.0;
            }
            Err(err) => {
                tracing::debug!(?pid, %err, "failed to invoke ps");
                return 0.0;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let total: f64 = stdout
            .lines()
            .filter_map(|line| line.trim().parse::<f64>().ok())
            .sum();

        total
    }

    /// Non-blockingly checks whether the workload has exited.
    ///
    /// Reaping happens here, once: a later `terminate_all` must not try to
    /// wait on a PID this already collected the exit status of.
    pub fn poll_workload(&mut self) -> WorkloadStatus {
        let Some(handle) = self.workload.as_mut() else {
            return WorkloadStatus::Exited;
        };

        if handle.reaped {
            return WorkloadStatus::Exited;
        }

        match handle.child.try_wait() {
            Ok(Some(_status)) => {
                handle.reaped = true;
                WorkloadStatus::Exited
            }
            Ok(None) => WorkloadStatus::Alive,
            Err(err) => {
                tracing::warn!(%err, pid = handle.pid, "failed to poll workload status");
                WorkloadStatus::Alive
            }
        }
    }

    /// Sends SIGTERM to both children (if present) and waits for each,
    /// releasing them in reverse acquisition order. Idempotent: calling it
    /// again once both are gone is a no-op (I5, P7).
    ///
    /// A workload already reaped by [`Self::poll_workload`] is skipped
    /// entirely (spec §4.G "workload child: SIGTERM + wait if still alive") —
    /// signaling its PID again risks ESRCH at best and a PID-reuse race at
    /// worst.
    pub fn terminate_all(&mut self) {
        if let Some(mut policy) = self.policy.take() {
            terminate_child(&mut policy, "policy");
        }
        if let Some(mut workload) = self.workload.take() {
            if !workload.reaped {
                terminate_child(&mut workload.child, "workload");
            }
        }
    }
}

fn terminate_child(child: &mut Child, label: &str) {
    let pid = Pid::from_raw(child.id() as i32);
    if let Err(err) = kill(pid, Signal::SIGTERM) {
        tracing::debug!(%err, %label, "SIGTERM failed, process likely already gone");
    }
    if let Err(err) = child.wait() {
        tracing::warn!(%err, %label, "failed to wait for child during termination");
    }
}
