// src/main.rs
//
// Small CLI over the scanner core. Useful for checking how a payload is
// classified and what the product lookup returns, without a camera.
//
//   scanhub classify <content> [raw-format]
//   scanhub content-type <content>
//   scanhub lookup <barcode>
//
// SCANHUB_CONFIG may point at a JSON ScannerConfig; RUST_LOG controls logging.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};

use scanhub::application::ToErrorResponse;
use scanhub::domain::format::{classify, describe};
use scanhub::domain::parse_content_type;
use scanhub::events::EventBus;
use scanhub::integrations::OpenFoodFactsClient;
use scanhub::services::ProductResolver;
use scanhub::{AppResult, ScannerConfig};

const USAGE: &str = "usage:
  scanhub classify <content> [raw-format]
  scanhub content-type <content>
  scanhub lookup <barcode>";

fn load_config() -> AppResult<ScannerConfig> {
    match std::env::var("SCANHUB_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            ScannerConfig::from_json_str(&json)
        }
        Err(_) => Ok(ScannerConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!(USAGE);
    };

    match (command.as_str(), &args[1..]) {
        ("classify", [content, rest @ ..]) if rest.len() <= 1 => {
            let raw_format = rest.first().map(String::as_str).unwrap_or("UNKNOWN");
            let info = describe(classify(raw_format, content));
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        ("content-type", [content]) => {
            let content_type = parse_content_type(content);
            println!("{} ({})", content_type.label(), serde_json::to_string(&content_type)?);
        }

        ("lookup", [barcode]) => {
            let config = load_config().to_error_response().map_err(|e| anyhow!(e))?;
            let client = OpenFoodFactsClient::new(&config.product)
                .context("failed to build HTTP client")?;
            let resolver =
                ProductResolver::new(Arc::new(client), &config.product, Arc::new(EventBus::new()));

            log::info!("Looking up {}", barcode);
            let result = resolver.query(barcode).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        _ => bail!(USAGE),
    }

    Ok(())
}
