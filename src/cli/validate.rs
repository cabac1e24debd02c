use std::path::PathBuf;

use clap::Args;

use super::{CliContext, decode::load_node};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Node configuration file (YAML)
    pub file: PathBuf,
}

pub async fn execute(args: ValidateArgs, _context: &CliContext) -> anyhow::Result<()> {
    let node = load_node(&args.file)?;
    println!("✅ {} node configuration is valid: {:?}", node.type_name(), node);
    Ok(())
}
