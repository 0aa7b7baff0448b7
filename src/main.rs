use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tile_catalog::{
    catalog::TileCatalog,
    chains::ResourceChains,
    config::{AppConfig, ConfigLoader},
    filter::FilterCriteria,
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Tile catalog viewer")]
struct Cli {
    /// Path to a YAML config file; relative paths inside it resolve against its directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the tile dataset (JSON array or name-keyed object)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Override the resource-chain table (YAML)
    #[arg(long)]
    chains: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Print the filtered catalog as JSON instead of serving the UI
    #[arg(long)]
    list: bool,

    #[arg(long, requires = "list")]
    search: Option<String>,

    #[arg(long = "type", requires = "list")]
    kind: Option<String>,

    #[arg(long, requires = "list")]
    generation: Option<String>,

    #[arg(long, requires = "list")]
    chain: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (loader, config) = match &cli.config {
        Some(path) => {
            let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
            let loader = ConfigLoader::new(base_dir);
            let file = path.file_name().context("config path has no file name")?;
            let config = loader.load(file)?;
            (loader, config)
        }
        None => (ConfigLoader::new("."), AppConfig::default()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let dataset = cli
        .dataset
        .clone()
        .unwrap_or_else(|| loader.resolve(&config.dataset));
    let catalog = TileCatalog::load_or_unavailable(&dataset);

    let chains = match (&cli.chains, &config.chains) {
        (Some(path), _) => ResourceChains::load(&ConfigLoader::new("."), path)?,
        (None, Some(path)) => ResourceChains::load(&loader, path)?,
        (None, None) => {
            ResourceChains::embedded().context("embedded resource-chain table is invalid")?
        }
    };
    info!(chains = chains.len(), "resource chains ready");

    if cli.list {
        let criteria = FilterCriteria {
            search: cli.search,
            kind: cli.kind,
            generation: cli.generation,
            chain: cli.chain,
        };
        let visible = criteria.apply(catalog.tiles(), &chains);
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    web::run(WebServerConfig {
        catalog,
        chains,
        host: cli.host.unwrap_or(config.server.host),
        port: cli.port.unwrap_or(config.server.port),
    })
    .await
}
