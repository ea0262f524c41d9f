//! dingtalk-hook
//!
//! Routes Alertmanager webhook notifications to DingTalk robots.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                  DINGTALK HOOK                    │
//!                         │                                                   │
//!   Alertmanager POST     │  ┌────────┐    ┌──────────┐    ┌─────────────┐   │
//!   ──────────────────────┼─▶│  http  │───▶│ runtime  │───▶│   routing   │   │
//!                         │  │ server │    │ snapshot │    │ first match │   │
//!                         │  └────────┘    └────▲─────┘    │ + mentions  │   │
//!                         │                     │          └──────┬──────┘   │
//!                         │           ┌─────────┴──────┐          ▼          │
//!                         │           │ reload: file / │   ┌─────────────┐   │   DingTalk
//!                         │           │ SIGHUP / admin │   │  dingtalk   │───┼──▶ robots
//!                         │           └────────────────┘   │ render+sign │   │
//!                         │                                └─────────────┘   │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dingtalk_hook::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "dingtalk-hook", version)]
#[command(about = "Route Alertmanager notifications to DingTalk robots", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override server.listen_address
    #[arg(short, long)]
    listen: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,

    /// Do not watch the configuration file for changes
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.check {
        return match startup::check(&cli.config) {
            Ok(runtime) => {
                println!(
                    "{}: ok ({} routes, {} mention rules, {} channels)",
                    cli.config.display(),
                    runtime.router.len(),
                    runtime.mentions.len(),
                    runtime.channels.len()
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {}", cli.config.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    let options = StartupOptions {
        config_path: cli.config,
        listen: cli.listen,
        watch: !cli.no_watch,
    };

    match startup::run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
