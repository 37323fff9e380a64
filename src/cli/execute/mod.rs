//! Execute command - runs one execution from a trigger payload

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use validator::Validate;

use crate::config::AppConfig;
use crate::domain::TriggerPayload;
use crate::infrastructure::logging::init_logging;
use crate::RecapRuntime;

#[derive(Args, Debug)]
pub struct ExecuteArgs {
    /// Trigger JSON file, or `-` for stdin
    #[arg(long, short, default_value = "-")]
    pub trigger: PathBuf,
}

/// Run one execution; the process exits non-zero when it fails
pub async fn run(args: ExecuteArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);

    let trigger = read_trigger(&args.trigger)?;
    let runtime = RecapRuntime::from_config(&config).await?;

    let outcome = runtime.execute(trigger).await?;
    runtime.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(failure) = &outcome.failure {
        anyhow::bail!(
            "execution {} failed at {}: {}",
            outcome.execution_id,
            failure.stage,
            failure.message
        );
    }

    Ok(())
}

fn read_trigger(path: &Path) -> anyhow::Result<TriggerPayload> {
    let raw = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read trigger from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read trigger file {}", path.display()))?
    };

    parse_trigger(&raw)
}

fn parse_trigger(raw: &str) -> anyhow::Result<TriggerPayload> {
    let trigger: TriggerPayload =
        serde_json::from_str(raw).context("trigger is not a valid payload")?;
    trigger.validate().context("trigger failed validation")?;
    Ok(trigger)
}
