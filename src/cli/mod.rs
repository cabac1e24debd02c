use clap::{Parser, Subcommand};

pub mod decode;
pub mod schema;
pub mod validate;

use decode::DecodeArgs;
use schema::SchemaArgs;
use validate::ValidateArgs;

use packetdecode::config::{ConfigManager, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "packetdecode",
    about = "Decode raw sensor packets in a stream of flow messages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode newline-delimited JSON messages from a file or stdin
    Decode(DecodeArgs),

    /// Check a node configuration file
    Validate(ValidateArgs),

    /// Emit JSON‐Schema for the node configuration and messages
    Schema(SchemaArgs),
}

#[derive(Clone, Debug)]
pub struct CliContext {
    pub config_manager: ConfigManager,
    pub settings: Settings,
}

impl CliContext {
    pub async fn new(config_manager: ConfigManager) -> Self {
        let settings = Settings::load(&config_manager).await;
        Self {
            config_manager,
            settings,
        }
    }
}

pub async fn execute(context: &CliContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Decode(args) => decode::execute(args, context).await,
        Commands::Validate(args) => validate::execute(args, context).await,
        Commands::Schema(args) => schema::execute(args, context).await,
    }
}
