//! Lead scoring command-line entry point
//!
//! Reads lead records as a JSON array, writes JSON. Logs go to stderr so
//! stdout stays machine-readable.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use lead_scoring_config::{load_settings, Settings};
use lead_scoring_engine::{
    ConversionModel, EvaluationReport, FeatureImportance, Lead, LeadScoringEngine,
};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let settings = load_settings(&cli.config_dir, cli.env.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            cli.config_dir.display()
        )
    })?;

    init_tracing(&settings);
    tracing::debug!(
        config_dir = %cli.config_dir.display(),
        env = cli.env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Score {
            input,
            model,
            output,
        } => {
            let leads = read_leads(&input)?;
            let engine = build_engine(&settings, model.as_deref())?;
            let scored = engine.score_all(&leads);
            write_json(&scored, output.as_deref())
        }

        Commands::Train {
            input,
            model,
            seed,
            test_fraction,
            trees,
        } => {
            let mut settings = settings;
            if let Some(seed) = seed {
                settings.training.seed = seed;
            }
            if let Some(fraction) = test_fraction {
                settings.training.test_fraction = fraction;
            }
            if let Some(trees) = trees {
                settings.training.n_trees = trees;
            }
            settings
                .training
                .validate()
                .context("Invalid training parameters")?;

            let leads = read_leads(&input)?;
            let outcome = ConversionModel::train(&leads, &settings.training)
                .context("Failed to train conversion model")?;
            outcome
                .model
                .save(&model)
                .with_context(|| format!("Failed to save model to {}", model.display()))?;

            write_json(
                &TrainingSummary {
                    model: model.display().to_string(),
                    feature_importance: outcome.model.feature_importance(),
                    evaluation: outcome.evaluation,
                },
                None,
            )
        }

        Commands::Shortlist {
            input,
            min_score,
            include_converted,
            top,
            model,
        } => {
            let mut ranking = settings.ranking.clone();
            if let Some(min_score) = min_score {
                ranking.min_score = min_score;
            }
            if include_converted {
                ranking.exclude_converted = false;
            }

            let leads = read_leads(&input)?;
            let engine = build_engine(&settings, model.as_deref())?;
            let mut shortlist = engine
                .shortlist(&leads, &ranking)
                .context("Failed to build shortlist")?;
            if let Some(top) = top {
                shortlist.truncate(top);
            }
            write_json(&shortlist, None)
        }

        Commands::Analyze { input, output_dir } => {
            let leads = read_leads(&input)?;
            let mut engine = LeadScoringEngine::from_settings(&settings);
            let report = engine
                .analyze(&leads, &settings)
                .context("Lead analysis failed")?;

            fs::create_dir_all(&output_dir)
                .with_context(|| format!("Failed to create {}", output_dir.display()))?;

            // The engine now carries the trained model, so these include probabilities
            let scored = engine.score_all(&leads);
            let promising = engine.shortlist(&leads, &settings.ranking)?;

            write_json(&scored, Some(output_dir.join("leads_with_scores.json").as_path()))?;
            write_json(&promising, Some(output_dir.join("promising_leads.json").as_path()))?;
            write_json(&report, Some(output_dir.join("analysis_report.json").as_path()))?;

            tracing::info!(
                output_dir = %output_dir.display(),
                leads = scored.len(),
                promising = promising.len(),
                "Analysis results written"
            );
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct TrainingSummary {
    model: String,
    evaluation: EvaluationReport,
    feature_importance: Vec<FeatureImportance>,
}

fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("lead_scoring={},leadscore={}", level, level).into()
    });

    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn build_engine(settings: &Settings, model: Option<&Path>) -> Result<LeadScoringEngine> {
    let engine = LeadScoringEngine::from_settings(settings);
    match model {
        Some(path) => {
            let model = ConversionModel::load(path)
                .with_context(|| format!("Failed to load model from {}", path.display()))?;
            Ok(engine.with_model(model))
        }
        None => Ok(engine),
    }
}

/// Parse a JSON array of leads; out-of-domain numbers are reported, then
/// read as 0 by the scorer and encoder
fn read_leads(path: &Path) -> Result<Vec<Lead>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read leads from {}", path.display()))?;
    let leads: Vec<Lead> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse leads in {}", path.display()))?;

    let invalid = leads
        .iter()
        .filter_map(|lead| lead.validate().err())
        .inspect(|err| tracing::warn!(error = %err, "Coercing invalid lead field to 0"))
        .count();

    tracing::info!(
        path = %path.display(),
        leads = leads.len(),
        invalid,
        "Leads loaded"
    );
    Ok(leads)
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match path {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}
