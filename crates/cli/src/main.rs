use anyhow::Context;
use bookstore_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about = "Bookstore catalog API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted
    Serve {
        /// Bind address, overriding `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Listen port, overriding `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective settings as JSON
    Settings,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load bookstore settings")?;

    match cli.command {
        Command::Settings => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookstore_telemetry::init(&settings.telemetry)?;
            tracing::info!(
                env = ?settings.environment,
                host = %settings.server.host,
                port = settings.server.port,
                "bookstore CLI starting server"
            );

            let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(bookstore_app::server::run(settings))
        }
    }
}
