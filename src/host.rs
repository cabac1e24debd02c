//! Drives a node over newline-delimited JSON messages.
use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::{
    message::Message,
    node::{NodeContext, NodeType},
};

/// What the host does when a node fails on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log the failure and go on with the next message.
    #[default]
    Continue,
    /// Stop and return the failure.
    Stop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Lines that parsed as messages.
    pub received: usize,
    /// Messages written downstream.
    pub emitted: usize,
    /// Messages the node failed on.
    pub failed: usize,
    /// Lines that were not messages.
    pub rejected: usize,
}

/// Feed every message read from `reader` to `node`, one at a time, and write
/// each forwarded message to `writer` as a single JSON line.
///
/// Output order follows input order. A line that is not a JSON message is
/// logged and skipped.
pub async fn run_json_lines<R, W>(
    node: &dyn NodeType,
    ctx: &mut NodeContext,
    reader: R,
    mut writer: W,
    policy: ErrorPolicy,
) -> anyhow::Result<RunReport>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut report = RunReport::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("reading input")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let msg: Message = match serde_json::from_str(&line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(line = line_no, "skipping input that is not a message: {}", e);
                report.rejected += 1;
                continue;
            }
        };
        report.received += 1;

        match node.process(msg, ctx).await {
            Ok(out) => {
                let mut encoded = serde_json::to_vec(out.message())?;
                encoded.push(b'\n');
                writer.write_all(&encoded).await.context("writing output")?;
                report.emitted += 1;
            }
            Err(err) => {
                report.failed += 1;
                error!(node = %ctx.node_id(), line = line_no, error = %err, "{} node failed", node.type_name());
                if policy == ErrorPolicy::Stop {
                    writer.flush().await?;
                    return Err(anyhow::Error::new(err)
                        .context(format!("node `{}` failed on line {}", ctx.node_id(), line_no)));
                }
            }
        }
    }

    writer.flush().await.context("flushing output")?;
    info!(
        received = report.received,
        emitted = report.emitted,
        failed = report.failed,
        rejected = report.rejected,
        "input exhausted"
    );
    Ok(report)
}
