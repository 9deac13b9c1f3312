use std::process::Command;

/// Applies a cluster decision by re-pinning the workload's CPU affinity via
/// the OS `taskset` utility (spec §4.E).
///
/// A non-zero exit or a failure to invoke the tool is logged but not fatal;
/// the caller still advances the committed cluster state to avoid a
/// per-tick retry storm against a utility that's unlikely to start working
/// on the very next tick (`EffectorFailure`).
pub fn apply(mask: &str, pid: i32) -> bool {
    let result = Command::new("taskset")
        .args(["-pac", mask, &pid.to_string()])
        .output();

    match result {
        Ok(out) if out.status.success() => true,
        Ok(out) => {
            tracing::warn!(
                ?mask,
                pid,
                status = ?out.status,
                stderr = %String::from_utf8_lossy(&out.stderr),
                "taskset exited non-zero"
            );
            false
        }
        Err(err) => {
            tracing::warn!(%err, ?mask, pid, "failed to invoke taskset");
            false
        }
    }
}
