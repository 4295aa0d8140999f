use aurashell::config::{ShellArgs, ShellConfig};
use aurashell::env::Environment;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args: ShellArgs = argh::from_env();
    let config = ShellConfig::from_args(args, &Environment::new());
    init_logging(&config.log_level);
    tracing::debug!(history = %config.history_file.display(), "starting");
    aurashell::repl::run(&config)
}

/// Logs go to stderr so they never mix with command output. `RUST_LOG` wins
/// over `--log-level`.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(aurashell::config::DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
