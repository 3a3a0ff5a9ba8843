use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const DEFAULT_HISTORY_SIZE: usize = 20;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub result_count: usize,
}

/// Recent successful searches, most recent first.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<HistoryEntry>,
    #[serde(skip, default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize { DEFAULT_HISTORY_SIZE }

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }
}

impl SearchHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Puts `query` at the front. A query already present moves to the
    /// front instead of appearing twice; the oldest entry is evicted once
    /// capacity is exceeded.
    pub fn record(&mut self, query: &str, result_count: usize) {
        if self.capacity == 0 {
            return;
        }
        self.entries.retain(|e| !e.query.eq_ignore_ascii_case(query));
        self.entries.push_front(HistoryEntry {
            query: query.to_string(),
            timestamp: Utc::now(),
            result_count,
        });
        self.entries.truncate(self.capacity);
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.entries.truncate(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.query.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn get_history_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "invsearch", "invsearch")
        .map(|dirs| dirs.data_dir().join("history.json"))
}

/// Best effort: a missing or unreadable file yields an empty history.
pub fn load_history(path: &Path, capacity: usize) -> SearchHistory {
    let mut history = match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<SearchHistory>(&content) {
            Ok(history) => history,
            Err(e) => {
                warn!("Ignoring unreadable history file {:?}: {}", path, e);
                SearchHistory::default()
            }
        },
        Err(_) => {
            debug!("No history file at {:?}", path);
            SearchHistory::default()
        }
    };
    history.set_capacity(capacity);
    history
}

pub fn save_history(path: &Path, history: &SearchHistory) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content = serde_json::to_string_pretty(history)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_most_recent_first() {
        let mut h = SearchHistory::with_capacity(3);
        h.record("laptop", 2);
        h.record("mouse", 1);
        assert_eq!(h.queries().collect::<Vec<_>>(), vec!["mouse", "laptop"]);
    }

    #[test]
    fn test_oldest_is_evicted_at_capacity() {
        let mut h = SearchHistory::with_capacity(2);
        h.record("a", 1);
        h.record("b", 1);
        h.record("c", 1);
        assert_eq!(h.queries().collect::<Vec<_>>(), vec!["c", "b"]);
    }

    #[test]
    fn test_repeated_query_moves_to_front() {
        let mut h = SearchHistory::with_capacity(5);
        h.record("desk", 3);
        h.record("chair", 4);
        h.record("Desk", 2);
        let entries: Vec<_> = h.entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "Desk");
        assert_eq!(entries[0].result_count, 2);
    }

    #[test]
    fn test_save_and_load_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        let mut h = SearchHistory::with_capacity(5);
        h.record("monitor", 4);
        save_history(&path, &h).unwrap();

        let loaded = load_history(&path, 5);
        assert_eq!(loaded.queries().collect::<Vec<_>>(), vec!["monitor"]);
    }

    #[test]
    fn test_load_garbage_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();
        assert!(load_history(&path, 5).is_empty());
    }
}
