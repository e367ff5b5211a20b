use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;

use view_conn::{
    DisplayBuffer, EndpointDescriptor, SourceSelector, StartPos, StreamRoute,
    ViewConnectionManager,
};

use tailview::config::{self, ClientConfig, CliOverrides};
use tailview::session;
use tailview::terminal::TermSurface;
use tailview::websocket::WsTransport;

#[derive(Parser)]
#[command(name = "tailview")]
#[command(about = "Terminal client for live file view streams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server host (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Connect over TLS (wss)
    #[arg(long, global = true)]
    tls: bool,

    /// Custom config file (defaults to <config dir>/tailview/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a bounded view of a source
    View(ViewArgs),

    /// Follow a source live
    Tail(TailArgs),
}

#[derive(Parser)]
struct ViewArgs {
    /// Source to read, or `not_selected` to start without one
    source: String,

    /// Where in the source to start
    #[arg(long, value_enum)]
    start_pos: Option<StartPosArg>,

    /// Server-side substring filter
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Parser)]
struct TailArgs {
    /// Source to follow, or `not_selected` to start without one
    source: String,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum StartPosArg {
    Head,
    Center,
    Tail,
}

impl From<StartPosArg> for StartPos {
    fn from(arg: StartPosArg) -> Self {
        match arg {
            StartPosArg::Head => StartPos::Head,
            StartPosArg::Center => StartPos::Center,
            StartPosArg::Tail => StartPos::Tail,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the streamed text
    let default_directive = if cli.debug {
        "tailview=debug,view_conn=debug,info"
    } else {
        "tailview=info,view_conn=info,warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let figment = config::load_config(cli.config.as_deref());
    let overrides = CliOverrides {
        host: cli.host.clone(),
        port: cli.port,
        tls: cli.tls,
    };
    let config = ClientConfig::resolve(&figment, &overrides)?;
    info!(host = %config.host, port = config.port, tls = config.tls, "configuration loaded");

    let (route, source) = match cli.command {
        Commands::View(args) => (
            StreamRoute::View {
                start_pos: args.start_pos.map(Into::into),
                filter_text: args.filter,
            },
            args.source,
        ),
        Commands::Tail(args) => (StreamRoute::Tail, args.source),
    };
    let endpoint =
        EndpointDescriptor::new(config.ws_base(), route, SourceSelector::parse(&source));

    let (transport, events) = WsTransport::new();
    let buffer = DisplayBuffer::with_cap(config.soft_cap_bytes);
    let mut manager = ViewConnectionManager::with_buffer(transport, TermSurface::new(), buffer);
    manager.connect(&endpoint);

    let commands = session::spawn_stdin_commands(endpoint);
    session::run_session(manager, events, commands).await
}
