mod cli;

use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands, Domain, Format};
use gardenops::config::{Config, OutputFormat};
use gardenops::error::Result;
use gardenops::logic::rules::RuleInfo;
use gardenops::logic::{BatchEvaluator, RuleSets, RulesEngine};
use gardenops::models::{Finding, PlantContext, SunExposureContext, ZoneContext};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
    install_panic_hook();

    let mut config = match Config::load(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("See config/config.yaml.example for the expected layout");
            std::process::exit(1);
        }
    };
    if let Some(format) = cli.format {
        config.output.format = match format {
            Format::Json => OutputFormat::Json,
            Format::Text => OutputFormat::Text,
        };
    }

    let RuleSets {
        plant_health,
        irrigation_zone,
        sun_exposure,
    } = RuleSets::build(&config.engine)?;

    match cli.command {
        Commands::Evaluate { domain, file } => {
            let findings = match domain {
                Domain::Plant => plant_health.evaluate(&read_plant_context(&file)?),
                Domain::Zone => irrigation_zone.evaluate(&read_document::<ZoneContext>(&file)?),
                Domain::Sun => sun_exposure.evaluate(&read_document::<SunExposureContext>(&file)?),
            };
            print_findings(&config, &findings)?;
        }
        Commands::Batch { domain, file } => {
            let results = match domain {
                Domain::Plant => {
                    let today = Local::now().date_naive();
                    let contexts = read_document::<Vec<PlantContext>>(&file)?
                        .into_iter()
                        .map(|c| c.with_derived_timeline(today))
                        .collect();
                    run_batch(&config, plant_health, contexts).await?
                }
                Domain::Zone => {
                    run_batch(&config, irrigation_zone, read_document(&file)?).await?
                }
                Domain::Sun => run_batch(&config, sun_exposure, read_document(&file)?).await?,
            };
            print_batch(&config, &results)?;
        }
        Commands::Rules { domain } => {
            let mut rules: Vec<RuleInfo> = Vec::new();
            if domain.is_none() || domain == Some(Domain::Plant) {
                rules.extend(plant_health.list_rules());
            }
            if domain.is_none() || domain == Some(Domain::Zone) {
                rules.extend(irrigation_zone.list_rules());
            }
            if domain.is_none() || domain == Some(Domain::Sun) {
                rules.extend(sun_exposure.list_rules());
            }
            print_rules(&config, &rules)?;
        }
    }

    Ok(())
}

/// Report panics through tracing instead of raw stderr text. Rule panics are
/// caught by the engine, which logs its own warning after this hook runs.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(location = %location, "panic: {}", message);
    }));
}

/// Parse a YAML or JSON document. YAML is a superset of JSON, so one parser covers both.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn read_plant_context(path: &Path) -> Result<PlantContext> {
    let ctx: PlantContext = read_document(path)?;
    Ok(ctx.with_derived_timeline(Local::now().date_naive()))
}

async fn run_batch<C: Send + Sync + 'static>(
    config: &Config,
    engine: RulesEngine<C>,
    contexts: Vec<C>,
) -> Result<Vec<Vec<Finding>>> {
    let evaluator = BatchEvaluator::new(Arc::new(engine), &config.batch);
    evaluator.evaluate_all(contexts).await
}

fn print_json<T: Serialize + ?Sized>(config: &Config, value: &T) -> Result<()> {
    let json = if config.output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn print_findings(config: &Config, findings: &[Finding]) -> Result<()> {
    match config.output.format {
        OutputFormat::Json => print_json(config, findings),
        OutputFormat::Text => {
            if findings.is_empty() {
                println!("No findings.");
            }
            for finding in findings {
                print_finding_text(finding);
            }
            Ok(())
        }
    }
}

fn print_batch(config: &Config, results: &[Vec<Finding>]) -> Result<()> {
    match config.output.format {
        OutputFormat::Json => print_json(config, results),
        OutputFormat::Text => {
            for (i, findings) in results.iter().enumerate() {
                println!("── Context {} ({} findings)", i + 1, findings.len());
                for finding in findings {
                    print_finding_text(finding);
                }
            }
            Ok(())
        }
    }
}

fn print_finding_text(finding: &Finding) {
    println!(
        "{} [{}] {} {} ({} confidence)",
        finding.severity.symbol(),
        finding.severity,
        finding.code,
        finding.title,
        finding.confidence
    );
    println!("    {}", finding.explanation);
    println!("    Measured: {}  Optimal: {}", finding.measured_value, finding.optimal_range);
    println!("    → {}", finding.recommended_action);
}

fn print_rules(config: &Config, rules: &[RuleInfo]) -> Result<()> {
    match config.output.format {
        OutputFormat::Json => print_json(config, rules),
        OutputFormat::Text => {
            for rule in rules {
                println!(
                    "{:<16} {:<20} {}",
                    rule.code,
                    rule.category.as_str(),
                    rule.name
                );
            }
            Ok(())
        }
    }
}
