// src/main.rs
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::Read;
use std::path::PathBuf;

use crate::analysis::classifier::WasteClassifier;
use crate::analysis::gemini::GeminiClassifier;
use crate::capture::source::{ImagePayload, ImageSource};
use crate::config::ScanConfig;

mod analysis;
mod capture;
mod config;
mod gui; // GUI module
mod report;
mod scanner;

#[derive(Parser)]
#[command(name = "ecoscan")]
#[command(about = "Waste-sorting scanner with Gemini vision analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a waste item from an image file
    Scan {
        /// Path to the image (JPEG, PNG, ...), or "-" to read a base64 or
        /// data-URL payload from stdin
        image: PathBuf,

        /// Gemini model name (e.g., "gemini-1.5-flash")
        #[arg(long, short = 'm')]
        model: Option<String>,

        /// Gemini API key (default: GEMINI_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Endpoint base URL (default: https://generativelanguage.googleapis.com)
        #[arg(long)]
        endpoint: Option<String>,

        /// Print the raw classification as pretty JSON instead of a report
        #[arg(long)]
        json: bool,
    },
    /// List generation-capable models on the endpoint
    ListModels {
        /// Gemini API key (default: GEMINI_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Endpoint base URL
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Check endpoint reachability and API key configuration
    CheckService {
        /// Gemini API key (default: GEMINI_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Endpoint base URL
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Run the dashboard
    Gui,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            image,
            model,
            api_key,
            endpoint,
            json,
        } => run_scan_cli(image, model, api_key, endpoint, json),
        Commands::ListModels { api_key, endpoint } => list_models(api_key, endpoint),
        Commands::CheckService { api_key, endpoint } => check_service(api_key, endpoint),
        Commands::Gui => gui::run_gui(),
    }
}

fn run_scan_cli(
    image: PathBuf,
    model: Option<String>,
    api_key: Option<String>,
    endpoint: Option<String>,
    json: bool,
) -> Result<()> {
    info!("Starting headless scan mode");

    let config = ScanConfig::from_env().with_overrides(api_key, endpoint, model);

    let payload = if image.as_os_str() == "-" {
        info!("Reading base64 image payload from stdin");
        let mut input = String::new();
        std::io::stdin().lock().read_to_string(&mut input)?;
        ImagePayload::from_base64(input.trim(), "image/jpeg")?
    } else {
        let mut source = capture::file::FileSource::new(image);
        source.acquire()?
    };

    let classifier = match GeminiClassifier::new(config) {
        Ok(classifier) => classifier,
        Err(e) => {
            error!("Failed to initialize classifier: {}", e);
            println!("\nSet your key first:");
            println!("  export GEMINI_API_KEY=<your key>");
            return Err(e.into());
        }
    };

    match classifier.classify(&payload) {
        Ok(classification) => {
            if json {
                println!("{}", report::render_json(&classification)?);
            } else {
                println!("\n{}", report::render_text(&classification));
            }
            Ok(())
        }
        Err(e) => {
            error!("Classification failed: {}", e);
            if e.is_transport() {
                println!("\nThe endpoint could not be reached. Check your network");
                println!("connection, or point --endpoint at a different base URL.");
            } else {
                println!("\nThe model did not produce a usable classification.");
                println!("Try a clearer, closer photo of the item.");
            }
            Err(e.into())
        }
    }
}

fn list_models(api_key: Option<String>, endpoint: Option<String>) -> Result<()> {
    let config = ScanConfig::from_env().with_overrides(api_key, endpoint, None);
    let key = config.require_api_key()?;
    info!("Listing models at {}...", config.endpoint);

    let client = reqwest::blocking::Client::new();
    let api_url = format!("{}/v1beta/models", config.endpoint);

    match client.get(&api_url).query(&[("key", key)]).send() {
        Ok(response) => {
            if response.status().is_success() {
                let data: serde_json::Value = response.json()?;

                println!("\nModels supporting generateContent:");
                if let Some(models) = data["models"].as_array() {
                    for model in models {
                        let supports_generate = model["supportedGenerationMethods"]
                            .as_array()
                            .map(|methods| {
                                methods.iter().any(|m| m.as_str() == Some("generateContent"))
                            })
                            .unwrap_or(false);
                        if !supports_generate {
                            continue;
                        }
                        if let Some(name) = model["name"].as_str() {
                            let name = name.strip_prefix("models/").unwrap_or(name);
                            println!("  - {}", name);
                        }
                    }
                } else {
                    println!("  No models found");
                }
                println!();

                println!("Suggested vision models for waste scanning:");
                println!("  - gemini-1.5-flash (fast, default)");
                println!("  - gemini-1.5-pro (larger, more accurate)");
            } else {
                error!("Endpoint error: {}", response.status());
            }
        }
        Err(e) => {
            error!("Failed to reach endpoint: {}", e);
            println!("\nCheck your network connection and GEMINI_BASE_URL.");
        }
    }

    Ok(())
}

fn check_service(api_key: Option<String>, endpoint: Option<String>) -> Result<()> {
    let config = ScanConfig::from_env().with_overrides(api_key, endpoint, None);
    info!("Checking endpoint at {}...", config.endpoint);

    let key = match config.require_api_key() {
        Ok(key) => {
            println!("✓ API key configured");
            key
        }
        Err(e) => {
            println!("✗ {}", e);
            return Ok(());
        }
    };

    let client = reqwest::blocking::Client::new();
    let api_url = format!("{}/v1beta/models", config.endpoint);

    match client.get(&api_url).query(&[("key", key)]).send() {
        Ok(response) => {
            if response.status().is_success() {
                println!("✓ Endpoint reachable at {}", config.endpoint);

                let data: serde_json::Value = response.json()?;
                if let Some(models) = data["models"].as_array() {
                    println!("✓ {} model(s) available", models.len());
                }
                println!("✓ Configured model: {}", config.model);
            } else if response.status().as_u16() == 400 || response.status().as_u16() == 403 {
                println!("✗ Endpoint rejected the API key: {}", response.status());
                println!("  Generate a key at https://aistudio.google.com/apikey");
            } else {
                println!("✗ Endpoint error: {}", response.status());
            }
        }
        Err(e) => {
            println!("✗ Could not connect to {}", config.endpoint);
            println!("  Error: {}", e);
            println!("\nTroubleshooting:");
            println!("  1. Check your network connection");
            println!("  2. Check GEMINI_BASE_URL if you overrode the endpoint");
        }
    }

    Ok(())
}
