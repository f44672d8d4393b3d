use anyhow::Context;
use clap::{Parser, Subcommand};
use mh_assistant::{
    assessment::AssessmentEngine,
    catalog::FeatureCatalog,
    collector::InputCollector,
    config::Config,
    display::{render_assessment_styled, render_catalog_styled},
    models::{Assessment, SymptomSelection},
};
use reqwest::Client;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mh-cli")]
#[command(about = "Mental Health Diagnostic Assistant CLI", long_about = None)]
struct Cli {
    /// Config file to load on top of the defaults
    #[arg(long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List categories and symptoms
    Catalog,

    /// Show the fitted model
    Model,

    /// Assess a set of symptoms
    Assess {
        /// symptom=severity, repeatable
        #[arg(short, long = "symptom", value_name = "SYMPTOM=SEVERITY")]
        symptoms: Vec<String>,

        /// Restrict to these categories, repeatable
        #[arg(short, long = "category", value_name = "CATEGORY")]
        categories: Vec<String>,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,

        /// Assess against a running server instead of locally
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Prompt for categories, symptoms and severities
    Interactive {
        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    config.validate()?;
    Ok(config)
}

fn build_selection(symptoms: &[String], categories: Vec<String>) -> anyhow::Result<SymptomSelection> {
    let mut selection = SymptomSelection::new();
    if !categories.is_empty() {
        selection = selection.with_categories(categories);
    }

    for pair in symptoms {
        let (symptom, severity) = SymptomSelection::parse_pair(pair)?;
        selection = selection.with_symptom(symptom, severity);
    }

    Ok(selection)
}

async fn assess_remote(endpoint: &str, selection: &SymptomSelection) -> anyhow::Result<Assessment> {
    let client = Client::new();
    let response = client
        .post(format!("{}/v1/assessments", endpoint.trim_end_matches('/')))
        .json(selection)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", endpoint))?;

    if !response.status().is_success() {
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body["error"]["message"]
            .as_str()
            .unwrap_or("request failed")
            .to_string();
        anyhow::bail!("Server returned {}: {}", status, message);
    }

    Ok(response.json().await?)
}

fn print_assessment(assessment: &Assessment, json: bool, styled: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(assessment)?);
    } else {
        print!("{}", render_assessment_styled(assessment, styled));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mh_assistant=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let styled = !cli.no_color && io::stdout().is_terminal();

    match cli.command {
        Commands::Catalog => {
            print!("{}", render_catalog_styled(&FeatureCatalog::builtin(), styled));
        }

        Commands::Model => {
            let engine = AssessmentEngine::from_config(&config.model)?;
            let classifier = engine.classifier();
            let metadata = classifier.metadata();

            println!("Model:    {} v{}", metadata.name, metadata.version);
            println!("Type:     {}", metadata.model_type);
            println!("Trained:  {}", metadata.trained_at.to_rfc3339());
            println!(
                "Samples:  {} ({} features)",
                metadata.n_training_samples, metadata.n_features
            );
            println!(
                "Training accuracy: {:.2}",
                metadata.training_metrics.accuracy
            );
            println!("Encoding: {:?}", engine.encoding());
            println!("Classes:  {}", classifier.classes().join(", "));
            println!("Features: {}", classifier.feature_names().join(", "));
        }

        Commands::Assess {
            symptoms,
            categories,
            json,
            endpoint,
        } => {
            let selection = build_selection(&symptoms, categories)?;

            let assessment = match endpoint {
                Some(endpoint) => assess_remote(&endpoint, &selection).await?,
                None => AssessmentEngine::from_config(&config.model)?.assess(&selection)?,
            };

            print_assessment(&assessment, json, styled)?;
        }

        Commands::Interactive { json } => {
            let engine = AssessmentEngine::from_config(&config.model)?;

            println!("{}", mh_assistant::assessment::APP_TITLE);
            println!();

            let stdin = io::stdin();
            let selection = InputCollector::new(engine.catalog(), stdin.lock(), io::stdout())
                .with_style(styled)
                .collect()?;

            println!();
            print_assessment(&engine.assess(&selection)?, json, styled)?;
        }
    }

    Ok(())
}
