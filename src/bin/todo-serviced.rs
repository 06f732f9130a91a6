use clap::Parser;
use todo_service::config::{Config, ServerConfig};
use todo_service::daemon;
use todo_service::error::Result;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "todo-serviced")]
#[command(about = "Todo list HTTP service")]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long, env = "TODO_SERVICE_PORT")]
    port: Option<u16>,

    /// Storage backend: "memory" or "sqlite".
    #[arg(long, env = "TODO_SERVICE_BACKEND")]
    backend: Option<String>,

    #[arg(long, env = "TODO_SERVICE_DB")]
    db: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match self.config.as_deref() {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        let server = config.server.get_or_insert_with(ServerConfig::default);
        if let Some(host) = self.host {
            server.host = Some(host);
        }
        if let Some(port) = self.port {
            server.port = Some(port);
        }

        let storage = config.storage.get_or_insert_with(Default::default);
        if let Some(backend) = self.backend {
            storage.backend = Some(backend);
        }
        if let Some(db) = self.db {
            storage.sqlite_path = Some(db);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,todo_service=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let config = Cli::parse().into_config()?;

    daemon::run_with_shutdown(config, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
        }
    })
    .await
}
