use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tunefetch::{Config, Error, TuneFetch, serve_until_shutdown};

#[derive(Parser, Debug)]
#[clap(version, about)]
struct CliArgs {
    /// Path to TOML configuration file. CLI arguments override values in the file.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Address the HTTP server listens on.
    #[clap(long)]
    pub bind: Option<SocketAddr>,

    /// Directory where fetched audio files are stored.
    #[clap(long)]
    pub download_dir: Option<PathBuf>,

    /// Directory with a web frontend to serve at `/`.
    #[clap(long)]
    pub static_dir: Option<PathBuf>,

    /// Disable the Swagger UI.
    #[clap(long)]
    pub no_swagger: bool,
}

impl CliArgs {
    fn resolve_config(&self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };

        if let Some(bind) = self.bind {
            config.server.api.bind_address = bind;
        }
        if let Some(dir) = &self.download_dir {
            config.storage.download_dir = dir.clone();
        }
        if let Some(dir) = &self.static_dir {
            config.server.api.static_dir = Some(dir.clone());
        }
        if self.no_swagger {
            config.server.api.swagger_ui = false;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tunefetch=info,tower_http=info")),
        )
        .try_init()?;

    let config = cli_args.resolve_config()?;
    info!(
        bind_address = %config.server.api.bind_address,
        download_dir = %config.download_dir().display(),
        "Starting tunefetch"
    );

    let service = Arc::new(TuneFetch::new(config).await?);
    serve_until_shutdown(&service).await?;

    Ok(())
}
