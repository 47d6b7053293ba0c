//! Reload Wrapper (v1)
//!
//! Runs a load balancer as a child process and reloads it without downtime
//! whenever its configuration changes on disk.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────────────┐
//!                   │                      RELOAD WRAPPER                      │
//!                   │                                                          │
//!   config volume   │  ┌─────────┐                                             │
//!   ────────────────┼─▶│ watcher │──┐                                          │
//!                   │  └─────────┘  │    ┌────────────┐    ┌──────────────┐   │
//!   SIGINT/TERM/USR1│  ┌─────────┐  ├───▶│ dispatcher │───▶│ orchestrator │   │
//!   ────────────────┼─▶│ signals │──┤    │   (loop)   │    │ check+spawn  │   │
//!                   │  └─────────┘  │    └─────┬──────┘    └──────┬───────┘   │
//!                   │  ┌─────────┐  │          │ forward           │ register  │
//!                   │  │  exit   │──┘          ▼                   ▼           │
//!                   │  │ watchers│◀──────┌───────────────────────────────┐     │
//!                   │  └─────────┘       │     registry (pid → handle)   │     │
//!                   │                    └──────────────┬────────────────┘     │
//!                   └───────────────────────────────────┼──────────────────────┘
//!                                                       ▼
//!                                     haproxy -f cfg [-x sock -sf pids...]
//! ```

use clap::Parser;

use reload_wrapper::config::loader::resolve_from_env;
use reload_wrapper::config::ObservabilityConfig;
use reload_wrapper::lifecycle::startup;
use reload_wrapper::observability::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "reload-wrapper")]
#[command(
    about = "Supervise a load balancer and reload it when its configuration changes",
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Arguments passed unchanged to every instance of the load balancer.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let config = match resolve_from_env(cli.args) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    init_logging(&config.observability);

    tracing::info!("reload-wrapper v{} starting", env!("CARGO_PKG_VERSION"));

    let code = match startup::start(config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            1
        }
    };
    std::process::exit(code);
}
