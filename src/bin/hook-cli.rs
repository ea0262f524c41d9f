use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "hook-cli")]
#[command(about = "Management CLI for dingtalk-hook", long_about = None)]
struct Cli {
    /// Base URL of the admin API
    #[arg(short, long, default_value = "http://localhost:8060/admin")]
    url: String,

    #[arg(short, long, env = "DINGTALK_HOOK_ADMIN_TOKEN", default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show generation and reload status
    Status,
    /// Reload the configuration file
    Reload,
    /// List compiled routes and mention rules
    Routes,
    /// Dry-run routing for a webhook payload stored in a file
    Match { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if !cli.token.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.token))?,
        );
    }

    let res = match cli.command {
        Commands::Status => {
            client.get(format!("{base}/status")).headers(headers).send().await?
        }
        Commands::Reload => {
            client.post(format!("{base}/reload")).headers(headers).send().await?
        }
        Commands::Routes => {
            client.get(format!("{base}/routes")).headers(headers).send().await?
        }
        Commands::Match { file } => {
            let body = std::fs::read(&file)?;
            client
                .post(format!("{base}/match"))
                .headers(headers)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
