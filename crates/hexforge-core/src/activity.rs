//! User-visible activity log.
//!
//! Entries are mirrored to the `log` facade so headless hosts still see them.

use std::time::SystemTime;

/// How prominently an entry should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    /// An encounter result.
    Alert,
    Error,
}

impl Severity {
    /// Entries a host should surface beyond the log panel.
    pub fn is_important(self) -> bool {
        matches!(self, Severity::Warning | Severity::Alert | Severity::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: u64,
    pub text: String,
    pub severity: Severity,
    pub time: SystemTime,
}

/// Append-only list of log entries.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
    next_id: u64,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, severity: Severity) -> &LogEntry {
        let text = text.into();
        match severity {
            Severity::Error => log::error!("{}", text),
            Severity::Warning | Severity::Alert => log::warn!("{}", text),
            Severity::Info | Severity::Success => log::info!("{}", text),
        }
        self.next_id += 1;
        self.entries.push(LogEntry {
            id: self.next_id,
            text,
            severity,
            time: SystemTime::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(text, Severity::Info);
    }

    /// Oldest first.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
