use std::{fs, path::Path};

use anyhow::Error;
use schemars::schema_for;
use tracing::info;

use crate::{message::Message, node::NodeType, process::packet_decode::PacketDecodeNode};

/// Write `packetdecode.schema.json` (node configuration) and
/// `message.schema.json` into `out_dir`.
pub fn write_schema(out_dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(out_dir)?;

    let node = PacketDecodeNode::default();
    let node_json = serde_json::to_string_pretty(&node.schema())?;
    let node_file = out_dir.join(format!("{}.schema.json", node.type_name()));
    fs::write(&node_file, node_json)?;
    info!("wrote {}", node_file.display());

    let message_json = serde_json::to_string_pretty(&schema_for!(Message))?;
    let message_file = out_dir.join("message.schema.json");
    fs::write(&message_file, message_json)?;
    info!("wrote {}", message_file.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn writes_both_schemas() {
        let tmp = TempDir::new().unwrap();
        write_schema(tmp.path()).unwrap();

        let node: Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("packetdecode.schema.json")).unwrap())
                .unwrap();
        assert_eq!(node["title"], "packetdecode");
        assert!(node["properties"]["decoder"].is_object());

        let message: Value =
            serde_json::from_str(&fs::read_to_string(tmp.path().join("message.schema.json")).unwrap())
                .unwrap();
        assert_eq!(message["title"], "Message");
    }
}
