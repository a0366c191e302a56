use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use runbot_core::config::{ConfigLoader, RunbotConfig};
use runbot_core::engine::DockerEngine;
use runbot_core::store::{self, BehaviorStore, EnvironmentRegistry};
use runbot_gateway::{Caller, EvalGateway};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

mod console_sink;

use console_sink::ConsoleSink;

#[derive(Parser, Debug)]
#[clap(
    name = "Runbot",
    author,
    version = "0.1.0",
    about = "Sandboxed code evaluation over per-user container environments"
)]
struct Cli {
    #[clap(
        long,
        short,
        default_value = "runbot.yaml",
        help = "Path to the YAML configuration file; defaults apply when absent"
    )]
    config: String,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(
        long,
        default_value = "console",
        help = "Author id attributed to messages read from stdin"
    )]
    author: String,

    #[clap(
        long,
        help = "Grant the console author the privileged capability (env build commands)"
    )]
    privileged: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    env_logger::Builder::new().filter_level(level).init();

    let config = if Path::new(&cli.config).exists() {
        ConfigLoader::from_file(&cli.config).await?
    } else {
        log::info!("no config file at {}, using defaults", cli.config);
        RunbotConfig::default()
    };

    let pool = store::open(&config.database.path).await?;
    let registry = EnvironmentRegistry::new(pool.clone());
    let behaviors = BehaviorStore::new(pool, config.eval.default_behavior);
    let engine = Arc::new(DockerEngine::new()?);
    let gateway = EvalGateway::new(engine, registry, behaviors, config);

    let caller = Caller::new(cli.author, cli.privileged);
    let sink = ConsoleSink::new();

    log::info!(
        "reading commands from stdin as `{}`{}",
        caller.id,
        if caller.privileged { " (privileged)" } else { "" }
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = String::new();

    while let Some(line) = lines.next_line().await? {
        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(&line);

        // A fenced code block spans stdin lines; hold the message until
        // its fences balance.
        if pending.matches("```").count() % 2 == 1 {
            continue;
        }

        let message = std::mem::take(&mut pending);
        if let Err(e) = gateway.handle(&caller, &message, &sink).await {
            log::error!("request failed: {}", e);
        }
    }

    Ok(())
}
