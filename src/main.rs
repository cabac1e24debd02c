mod cli;

use clap::Parser;
use cli::{Cli, CliContext, execute};
use packetdecode::config::{ConfigManager, EnvConfigManager, resolve_env_file};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager(EnvConfigManager::new(resolve_env_file()));
    let context = CliContext::new(config_manager).await;

    execute(&context, cli.command).await
}
