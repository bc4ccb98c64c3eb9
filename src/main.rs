use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use beacon_nodes::canvas::{self, a2ui};
use beacon_nodes::config::Overrides;
use beacon_nodes::{
    CanvasCommand, Config, Dispatcher, HttpGatewayClient, NodeRecord, Placement, SnapshotFormat,
    SnapshotPayload,
};

/// Beacon Nodes - target a node and send it commands through the gateway
#[derive(Parser)]
#[command(name = "beacon-nodes", version, about)]
struct Cli {
    /// Gateway base URL
    #[arg(long = "url", global = true, value_name = "URL")]
    gateway_url: Option<String>,

    /// Gateway bearer token
    #[arg(long, global = true)]
    token: Option<String>,

    /// Gateway call timeout in milliseconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect the node directory
    #[command(subcommand)]
    Nodes(NodesCommand),
    /// Drive a node's canvas
    Canvas(CanvasArgs),
}

#[derive(Subcommand)]
enum NodesCommand {
    /// List known nodes
    List {
        /// Print the directory as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which node a query resolves to
    Resolve {
        /// Node id, name, or address (omit for the default node)
        #[arg(long)]
        node: Option<String>,
    },
}

#[derive(Args)]
struct CanvasArgs {
    /// Node id, name, or address (defaults to the connected canvas node)
    #[arg(long, global = true)]
    node: Option<String>,

    #[command(subcommand)]
    command: CanvasSubcommand,
}

#[derive(Subcommand)]
enum CanvasSubcommand {
    /// Show the canvas
    Present {
        /// URL to load
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        x: Option<f64>,
        #[arg(long)]
        y: Option<f64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
    },
    /// Hide the canvas
    Hide,
    /// Load a URL into the canvas
    Navigate {
        /// URL to load
        url: String,
    },
    /// Evaluate JavaScript in the canvas
    Eval {
        /// JavaScript source
        js: String,
    },
    /// Capture the canvas to an image file
    Snapshot {
        /// Image format
        #[arg(long, value_enum, default_value = "png")]
        format: FormatArg,
        /// Maximum image width in pixels
        #[arg(long)]
        max_width: Option<u32>,
        /// JPEG quality (0.0 - 1.0)
        #[arg(long)]
        quality: Option<f64>,
        /// Output path (defaults to a file in the temp directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// A2UI surfaces
    #[command(subcommand)]
    A2ui(A2uiCommand),
}

#[derive(Subcommand)]
enum A2uiCommand {
    /// Validate and push a JSONL stream
    Push {
        /// Path to a JSONL file
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        jsonl: Option<PathBuf>,
        /// Render plain text instead of a file
        #[arg(long)]
        text: Option<String>,
    },
    /// Reset A2UI surfaces
    Reset,
    /// Validate a JSONL file without contacting the gateway
    Validate {
        /// Path to a JSONL file
        #[arg(long)]
        jsonl: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    #[value(alias = "jpeg")]
    Jpg,
}

impl From<FormatArg> for SnapshotFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => Self::Png,
            FormatArg::Jpg => Self::Jpeg,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,beacon_nodes=info",
        1 => "info,beacon_nodes=debug",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Local validation needs no gateway or config
    if let Command::Canvas(CanvasArgs {
        command: CanvasSubcommand::A2ui(A2uiCommand::Validate { jsonl }),
        ..
    }) = &cli.command
    {
        return validate_file(jsonl).await;
    }

    let config = Config::load(Overrides {
        url: cli.gateway_url,
        token: cli.token,
        timeout_ms: cli.timeout,
    })?;
    tracing::debug!(url = %config.gateway.url, timeout = ?config.gateway.timeout, "loaded configuration");

    let gateway = HttpGatewayClient::new(&config.gateway.url, config.gateway.token.clone());
    let dispatcher = Dispatcher::new(Arc::new(gateway), config.gateway.timeout, &config.capability);

    match cli.command {
        Command::Nodes(NodesCommand::List { json }) => list_nodes(&dispatcher, json).await,
        Command::Nodes(NodesCommand::Resolve { node }) => {
            let node_id = dispatcher.resolve(node.as_deref()).await?;
            println!("{node_id}");
            Ok(())
        }
        Command::Canvas(args) => run_canvas(&dispatcher, args).await,
    }
}

async fn list_nodes(dispatcher: &Dispatcher, json: bool) -> anyhow::Result<()> {
    let nodes = dispatcher.directory().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    if nodes.is_empty() {
        println!("No nodes found");
        return Ok(());
    }

    for node in &nodes {
        println!("{}", format_node(node));
    }

    Ok(())
}

fn format_node(node: &NodeRecord) -> String {
    let state = match node.connected {
        Some(true) => "connected",
        Some(false) => "disconnected",
        None => "paired",
    };
    let caps = node
        .caps
        .as_ref()
        .map_or_else(|| "?".to_string(), |caps| caps.join(","));

    format!(
        "{}\t{}\t{}\t{}\t{state}\t{caps}",
        node.node_id,
        node.label(),
        node.platform.as_deref().unwrap_or("-"),
        node.remote_ip.as_deref().unwrap_or("-"),
    )
}

async fn run_canvas(dispatcher: &Dispatcher, args: CanvasArgs) -> anyhow::Result<()> {
    let node = args.node.as_deref();

    let command = match args.command {
        CanvasSubcommand::Present {
            target,
            x,
            y,
            width,
            height,
        } => CanvasCommand::Present {
            url: target,
            placement: Placement {
                x,
                y,
                width,
                height,
            },
        },
        CanvasSubcommand::Hide => CanvasCommand::Hide,
        CanvasSubcommand::Navigate { url } => CanvasCommand::Navigate { url },
        CanvasSubcommand::Eval { js } => {
            let payload = dispatcher
                .canvas(node, &CanvasCommand::Eval { javascript: js })
                .await?;
            if let Some(result) = canvas::eval_result(&payload) {
                println!("{result}");
            }
            return Ok(());
        }
        CanvasSubcommand::Snapshot {
            format,
            max_width,
            quality,
            out,
        } => {
            let command = CanvasCommand::Snapshot {
                format: format.into(),
                max_width,
                quality,
            };
            let payload = dispatcher.canvas(node, &command).await?;
            let snapshot = SnapshotPayload::from_payload(&payload)?;
            let path = snapshot
                .write(out.as_deref(), &std::env::temp_dir())
                .await?;
            println!("MEDIA:{}", path.display());
            return Ok(());
        }
        CanvasSubcommand::A2ui(A2uiCommand::Push { jsonl, text }) => {
            let stream = match (jsonl, text) {
                (Some(path), _) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, Some(text)) => a2ui::build_text_jsonl(&text),
                (None, None) => anyhow::bail!("provide --jsonl or --text"),
            };
            let summary = dispatcher.push_a2ui(node, &stream).await?;
            println!(
                "pushed {} A2UI {} message(s)",
                summary.message_count, summary.version
            );
            return Ok(());
        }
        CanvasSubcommand::A2ui(A2uiCommand::Reset) => CanvasCommand::A2uiReset,
        CanvasSubcommand::A2ui(A2uiCommand::Validate { jsonl }) => {
            return validate_file(&jsonl).await;
        }
    };

    dispatcher.canvas(node, &command).await?;
    println!("ok");
    Ok(())
}

async fn validate_file(path: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let summary = a2ui::validate_jsonl(&text).map_err(beacon_nodes::Error::from)?;
    println!(
        "valid A2UI {} stream: {} message(s)",
        summary.version, summary.message_count
    );
    Ok(())
}
