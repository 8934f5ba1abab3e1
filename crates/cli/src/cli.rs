use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "leadscore")]
#[command(about = "Score, rank and model sales leads", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding default.yaml and per-environment overrides
    #[arg(long, global = true, default_value = "config")]
    pub config_dir: PathBuf,

    /// Environment overlay to load (e.g. `production` reads production.yaml)
    #[arg(long, global = true, env = "LEAD_SCORING_ENV")]
    pub env: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every lead in a JSON array
    Score {
        /// JSON array of lead records
        #[arg(short, long)]
        input: PathBuf,

        /// Trained model; adds conversion probabilities
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train the conversion model on labelled leads and save it
    Train {
        /// JSON array of lead records; unlabelled ones are skipped
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the model artifact
        #[arg(short, long)]
        model: PathBuf,

        /// Seed for the hold-out split and the forest
        #[arg(long)]
        seed: Option<u64>,

        /// Fraction of labelled leads held out for evaluation
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Number of trees in the forest
        #[arg(long)]
        trees: Option<usize>,
    },

    /// Print the prioritised call list
    Shortlist {
        #[arg(short, long)]
        input: PathBuf,

        /// Minimum rule score (0-100)
        #[arg(long)]
        min_score: Option<u32>,

        /// Keep leads that already converted
        #[arg(long)]
        include_converted: bool,

        /// Show only the first N leads
        #[arg(long)]
        top: Option<usize>,

        /// Trained model; adds conversion probabilities
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Run the full batch analysis and write the results
    Analyze {
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for leads_with_scores.json, promising_leads.json and
        /// analysis_report.json
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_shortlist() {
        let cli = Cli::try_parse_from([
            "leadscore",
            "shortlist",
            "--input",
            "leads.json",
            "--min-score",
            "70",
            "--top",
            "5",
            "--config-dir",
            "/etc/leadscore",
        ])
        .unwrap();

        assert_eq!(cli.config_dir, PathBuf::from("/etc/leadscore"));
        match cli.command {
            Commands::Shortlist {
                min_score,
                top,
                include_converted,
                ..
            } => {
                assert_eq!(min_score, Some(70));
                assert_eq!(top, Some(5));
                assert!(!include_converted);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_train_requires_model_path() {
        assert!(Cli::try_parse_from(["leadscore", "train", "--input", "leads.json"]).is_err());
    }
}
