use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use time::OffsetDateTime;

/// The log never holds more than this many records; oldest are evicted first.
pub const COMMAND_LOG_CAPACITY: usize = 100;

/// Milliseconds since the unix epoch.
pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Where a command entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSource {
    Viewer,
    Api,
    ApiEmergency,
}

/// One issued robot command. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: String,
    pub params: Value,
    pub timestamp: i64,
    pub source: CommandSource,
}

/// Insertion-ordered command history, bounded at [`COMMAND_LOG_CAPACITY`].
#[derive(Debug, Default)]
pub struct CommandLog {
    entries: VecDeque<CommandRecord>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CommandRecord) {
        self.entries.push_back(record);
        while self.entries.len() > COMMAND_LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<CommandRecord> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandRecord> {
        self.entries.iter()
    }

    /// Occurrence count per command name over records newer than `since_ms`.
    pub fn stats_since(&self, since_ms: i64) -> HashMap<String, u64> {
        let mut stats = HashMap::new();
        for record in self.entries.iter().filter(|r| r.timestamp > since_ms) {
            *stats.entry(record.command.clone()).or_insert(0) += 1;
        }
        stats
    }
}
