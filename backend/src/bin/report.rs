//! Presence report command-line tool.
//!
//! Prints attendance aggregations as JSON.
//!
//! # Usage
//!
//! ```bash
//! presence-report subjects
//! presence-report weekday <subject_id>
//! presence-report mean <subject_id>
//! presence-report totals <subject_id>
//! presence-report start-end <subject_id>
//! presence-report months
//! presence-report locations <YYYY-MM>
//! presence-report categories <YYYY-MM> [category]
//! ```
//!
//! # Environment Variables
//!
//! - `PRESENCE_CONFIG`: path of a `presence.toml` (default: standard locations)
//! - `PRESENCE_DATA_CSV`, `PRESENCE_SCHEMA`, `PRESENCE_CACHE_TTL_SECS`: overrides
//! - `RUST_LOG`: Log level (default: info)

use std::env;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use presence_analyzer::config::{AnalyzerConfig, ENV_DATA_CSV};
use presence_analyzer::models::{Category, SubjectId};
use presence_analyzer::services::PresenceService;

const USAGE: &str = "usage: presence-report \
    <subjects|weekday|mean|totals|start-end|months|locations|categories> [args]";

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (command, rest) = args.split_first().ok_or_else(|| anyhow!(USAGE))?;

    let config = load_config()?;
    info!(
        "Reading {} ({} schema)",
        config.source.csv_path.display(),
        config.source.schema
    );
    let service = PresenceService::from_config(&config);

    match command.as_str() {
        "subjects" => print_json(&service.subjects()?),
        "weekday" => print_json(&service.weekday_durations(subject_arg(rest)?)?),
        "mean" => print_json(&service.weekday_mean_durations(subject_arg(rest)?)?),
        "totals" => print_json(&service.weekday_totals(subject_arg(rest)?)?),
        "start-end" => print_json(&service.weekday_start_end_means(subject_arg(rest)?)?),
        "months" => print_json(&service.months_available()?),
        "locations" => print_json(&service.location_totals(month_arg(rest)?)?),
        "categories" => {
            let category = rest
                .get(1)
                .map(|raw| {
                    raw.parse::<Category>()
                        .map_err(|e| anyhow!("'{}': {}", raw, e))
                })
                .transpose()?;
            print_json(&service.location_category_totals(month_arg(rest)?, category)?)
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

fn load_config() -> anyhow::Result<AnalyzerConfig> {
    let mut config = match env::var("PRESENCE_CONFIG") {
        Ok(path) => AnalyzerConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        Err(_) if env::var(ENV_DATA_CSV).is_ok() => return Ok(AnalyzerConfig::from_env()?),
        Err(_) => AnalyzerConfig::from_default_location()?,
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn subject_arg(rest: &[String]) -> anyhow::Result<SubjectId> {
    let raw = rest.first().ok_or_else(|| anyhow!("missing <subject_id>"))?;
    raw.parse()
        .with_context(|| format!("invalid subject id '{}'", raw))
}

fn month_arg(rest: &[String]) -> anyhow::Result<&str> {
    rest.first()
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing <YYYY-MM>"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
