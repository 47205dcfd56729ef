use std::error::Error;

use clap::{Parser, Subcommand};

use hotspot_service::config::{self, ServiceConfig};
use hotspot_service::drought::{fetch_drought_areas, print_drought_summary};
use hotspot_service::ingest::arcgis::ArcGisClient;
use hotspot_service::logging::{self, DataSource};
use hotspot_service::pipeline::{print_summary, run_warnings_pipeline, write_report};

/// Clusters active NWS flood and hydrologic warnings into map hotspots.
#[derive(Parser, Debug)]
#[command(name = "hotspot_service", about = "Warning hotspot clustering for NWS feature layers")]
struct Cli {
    /// Path to config file (default: $HOTSPOT_CONFIG, then ./hotspots.toml)
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch warnings from every configured layer and cluster them (default)
    Warnings {
        /// Write the full report as JSON to this file
        #[arg(long)]
        output: Option<String>,

        /// Override clustering radius
        #[arg(long)]
        eps: Option<f64>,

        /// Override minimum neighbourhood size for a core point
        #[arg(long)]
        min_samples: Option<usize>,
    },
    /// Fetch drought intensity areas and summarize them by category
    Drought {
        /// Write the areas as JSON to this file
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config_path = config::resolve_config_path(cli.config.as_deref());
    let cfg = config::load_config_or_default(&config_path)?;

    logging::init_logger(cfg.logging.level, cfg.logging.file.as_deref(), cfg.logging.timestamps);
    logging::debug(DataSource::Config, None, &format!("Loaded configuration from {}", config_path));

    match cli.command.unwrap_or(Command::Warnings {
        output: None,
        eps: None,
        min_samples: None,
    }) {
        Command::Warnings { output, eps, min_samples } => run_warnings(&cfg, output, eps, min_samples),
        Command::Drought { output } => run_drought(&cfg, output),
    }
}

fn run_warnings(
    cfg: &ServiceConfig,
    output: Option<String>,
    eps: Option<f64>,
    min_samples: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    // Overrides are validated the same way as the config file.
    let params = cfg.clustering.with_overrides(eps, min_samples).params()?;

    let client = ArcGisClient::new(&cfg.warnings.base_url, cfg.http.timeout())?;
    let report = run_warnings_pipeline(&client, &cfg.warnings, &params);
    print_summary(&report);

    if let Some(path) = output {
        write_report(&report, &path)?;
        logging::info(DataSource::System, None, &format!("Report written to {}", path));
    }
    Ok(())
}

fn run_drought(cfg: &ServiceConfig, output: Option<String>) -> Result<(), Box<dyn Error>> {
    let client = ArcGisClient::new(&cfg.drought.base_url, cfg.http.timeout())?;
    let areas = fetch_drought_areas(&client, &cfg.drought);
    print_drought_summary(&areas);

    if let Some(path) = output {
        let file = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &areas)?;
        logging::info(DataSource::System, None, &format!("Drought areas written to {}", path));
    }
    Ok(())
}
