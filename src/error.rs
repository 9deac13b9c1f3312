use thiserror::Error;

/// Fatal failure classes from the error-kinds table: anything here aborts
/// startup or the loop and runs [`crate::lifecycle::Lifecycle::cleanup`].
///
/// Everything else in the table (transient CPU-usage parse failures, the
/// division guards, an unrecognized agent reply, a non-zero affinity
/// exit code, the workload going away) is handled inline where it happens —
/// logged and survived, never raised as an error — so it has no variant here.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("startup failed: {0}")]
    Startup(#[source] anyhow::Error),

    #[error("policy pipe failure: {0}")]
    Pipe(#[source] std::io::Error),
}

impl SchedulerError {
    pub fn startup(err: impl Into<anyhow::Error>) -> Self {
        SchedulerError::Startup(err.into())
    }
}
