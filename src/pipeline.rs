//! Command pipelining
//!
//! Queues commands locally, flushes them in a single write, and reads all
//! replies back in order, cutting one round trip per queued command.

use crate::commands::Command;
use crate::connection::Transport;
use crate::error::Result;
use crate::protocol::RespFrame;

/// A batch of commands flushed together
#[derive(Debug, Default)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Pipeline {
            commands: Vec::new(),
        }
    }

    /// Queue a command
    pub fn cmd(&mut self, command: Command) -> &mut Self {
        self.commands.push(command);
        self
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all queued commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Flush all queued commands and collect one reply per command.
    ///
    /// The pipeline is left empty afterwards. Replies are returned raw
    /// (error frames included) so callers can inspect each slot.
    pub fn query<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<Vec<RespFrame>> {
        if self.commands.is_empty() {
            return Ok(Vec::new());
        }
        let commands = std::mem::take(&mut self.commands);
        transport.request_pipeline(commands)
    }
}

/// True when every reply is a non-negative integer.
///
/// The success criterion for a bulk add: each ZADD reports how many members
/// it inserted, and any error or negative reply fails the whole batch.
pub fn all_ints_successful(replies: &[RespFrame]) -> bool {
    replies
        .iter()
        .all(|reply| matches!(reply, RespFrame::Integer(n) if *n >= 0))
}
