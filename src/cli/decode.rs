use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, bail};
use clap::Args;
use tokio::io::{self, AsyncBufRead, BufReader, BufWriter};
use tracing::{info, warn};

use super::CliContext;
use packetdecode::decoder::{DecoderRegistry, ScriptDecoder};
use packetdecode::host::{ErrorPolicy, run_json_lines};
use packetdecode::logger::init_tracing;
use packetdecode::node::{Node, NodeContext};
use packetdecode::process::packet_decode::PacketDecodeNode;

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Rhai script registered as the `default` decoder (falls back to PACKETDECODE_SCRIPT)
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Node configuration (YAML); a default `packetdecode` node when omitted
    #[arg(long)]
    pub node: Option<PathBuf>,

    /// Node id used in logs
    #[arg(long, default_value = "packetdecode")]
    pub node_id: String,

    /// Read messages from this file instead of stdin
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Stop at the first message the node fails on
    #[arg(long)]
    pub fail_fast: bool,

    /// Optional log level override (e.g. error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

pub async fn execute(args: DecodeArgs, context: &CliContext) -> anyhow::Result<()> {
    let settings = &context.settings;
    let log_level = args.log_level.unwrap_or_else(|| settings.log_level.clone());
    let log_dir = args.log_dir.or_else(|| settings.log_dir.clone());
    init_tracing(&log_level, log_dir.as_deref())?;
    info!("using {:?}", context.config_manager);

    let Some(script) = args.script.or_else(|| settings.script.clone()) else {
        bail!("no decoder script given; pass --script or set PACKETDECODE_SCRIPT");
    };
    let decoder = ScriptDecoder::from_file(&script)
        .with_context(|| format!("loading decoder script {}", script.display()))?;
    let decoders = DecoderRegistry::with_default(Arc::new(decoder));

    let node = match &args.node {
        Some(path) => load_node(path)?,
        None => Node(Box::new(PacketDecodeNode::default())),
    };
    let mut ctx = NodeContext::new(args.node_id, decoders);

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };
    let writer = BufWriter::new(io::stdout());

    let policy = if args.fail_fast {
        ErrorPolicy::Stop
    } else {
        ErrorPolicy::Continue
    };

    info!(node = %ctx.node_id(), script = %script.display(), "decoding messages");
    let report = run_json_lines(&*node, &mut ctx, reader, writer, policy).await?;
    if report.failed > 0 {
        warn!("{} of {} messages failed to decode", report.failed, report.received);
    }
    Ok(())
}

pub fn load_node(path: &Path) -> anyhow::Result<Node> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading node configuration {}", path.display()))?;
    serde_yaml_bw::from_str(&text)
        .with_context(|| format!("parsing node configuration {}", path.display()))
}
