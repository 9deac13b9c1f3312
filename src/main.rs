use std::process::ExitCode;

use biglittle_sched::control;
use biglittle_sched::lifecycle::Lifecycle;
use biglittle_sched::settings::Mode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() {
        eprintln!("usage: supervisor <workload_argv...>");
        return ExitCode::from(1);
    }

    let mode = match Mode::resolve() {
        Ok(mode) => mode,
        Err(err) => {
            tracing::error!(%err, "invalid mode");
            return ExitCode::from(1);
        }
    };

    match run(mode, &argv) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "supervisor exiting on error");
            ExitCode::from(1)
        }
    }
}

fn run(mode: Mode, argv: &[String]) -> anyhow::Result<()> {
    let mut lifecycle = Lifecycle::start(mode, argv)?;
    let result = control::run(&mut lifecycle);
    lifecycle.cleanup();
    result
}
