use std::fmt;

/// One retained line of the session log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Received from the engine, as framed
    Inbound(String),
    /// Command text sent to the engine
    Outbound(String),
    /// Produced locally (faults, capture results)
    Note(String),
}

impl LogEntry {
    pub fn text(&self) -> &str {
        match self {
            LogEntry::Inbound(s) | LogEntry::Outbound(s) | LogEntry::Note(s) => s,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEntry::Inbound(s) => write!(f, "<< {s}"),
            LogEntry::Outbound(s) => write!(f, ">> {s}"),
            LogEntry::Note(s) => write!(f, "-- {s}"),
        }
    }
}

/// Ordered in-memory log, kept whether or not a line could be interpreted
#[derive(Debug, Clone, Default)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
