//! cv-matcher: semantic CV to job description matching

use clap::Parser;
use colored::Colorize;
use cv_matcher::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use cv_matcher::config::{Config, OutputFormat};
use cv_matcher::error::{MatcherError, Result};
use cv_matcher::input::{Document, DocumentInput, DocumentKind, Side};
use cv_matcher::output::{formatter_for, save_report_to_file, suggest_filename};
use cv_matcher::processing::embedding_manager::{download_model, model_status};
use cv_matcher::processing::Matcher;
use cv_matcher::server;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Match {
            cv,
            cv_text,
            jd,
            jd_text,
            output,
            save,
        } => {
            let format = match output {
                Some(value) => {
                    cli::parse_output_format(&value).map_err(MatcherError::InvalidInput)?
                }
                None => config.output.format,
            };

            let cv_name = cv
                .as_ref()
                .map(|path| path.to_string_lossy().to_string())
                .unwrap_or_default();
            let cv_document = read_document(cv.as_deref())?;
            let jd_document = read_document(jd.as_deref())?;
            let cv_input = DocumentInput::resolve(Side::Cv, cv_document, cv_text)?;
            let jd_input = DocumentInput::resolve(Side::JobDescription, jd_document, jd_text)?;

            let matcher = Arc::new(Matcher::from_config(&config)?);

            let spinner = spinner("Loading embedding model...");
            let warm_up = matcher.warm_up_async().await;
            spinner.finish_and_clear();
            warm_up?;

            info!("Matching CV against job description");
            let result = matcher.match_documents_async(cv_input, jd_input).await?;

            let formatter = formatter_for(format, config.output.color_output && save.is_none());
            let rendered = formatter.format_result(&result)?;

            match save {
                Some(target) => {
                    let path = if target.is_dir() {
                        target.join(suggest_filename(format, &cv_name, true))
                    } else {
                        target
                    };
                    save_report_to_file(&rendered, &path)?;
                    println!("Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Skills { json } => {
            let matcher = Matcher::from_config(&config)?;
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Console
            };
            let formatter = formatter_for(format, config.output.color_output);
            println!("{}", formatter.format_skills(&matcher.list_skills())?);
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let matcher = Arc::new(Matcher::from_config(&config)?);
            server::serve(matcher, &config.server).await?;
        }

        Commands::Models { action } => match action {
            ModelAction::Download => {
                let spinner = spinner(&format!("Downloading {}...", config.embedding.model_id));
                let files = download_model(&config.embedding).await;
                spinner.finish_and_clear();
                let files = files?;
                println!("{} Model ready", "✓".green());
                println!("  config:    {}", files.config.display());
                println!("  tokenizer: {}", files.tokenizer.display());
                println!("  weights:   {}", files.weights.display());
            }
            ModelAction::Info => {
                let status = model_status(&config.embedding);
                println!("Model:      {}", status.model_id);
                println!("Revision:   {}", status.revision);
                println!("Source:     {}", status.source);
                println!("Max length: {}", config.embedding.max_length);
                println!("Device:     {:?}", config.embedding.device);
                if status.available {
                    println!("Status:     {}", "available offline".green());
                } else {
                    println!(
                        "Status:     {} (run `cv-matcher models download`)",
                        "not downloaded".yellow()
                    );
                }
            }
        },

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    MatcherError::Configuration(format!("Failed to serialize config: {}", e))
                })?;
                println!("# {}\n{}", config_path.display(), content);
            }
            Some(ConfigAction::Reset) => {
                Config::default().save_to(&config_path)?;
                println!("Configuration reset: {}", config_path.display());
            }
            Some(ConfigAction::Path) => println!("{}", config_path.display()),
        },
    }

    Ok(())
}

fn read_document(path: Option<&Path>) -> Result<Option<Document>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let bytes = std::fs::read(path).map_err(|e| {
        MatcherError::InvalidInput(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let kind = DocumentKind::from_file_name(&path.to_string_lossy());
    Ok(Some(Document::new(bytes, kind)))
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
