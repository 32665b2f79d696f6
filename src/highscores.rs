//! High score leaderboard and match history
//!
//! Persisted to LocalStorage as two records: the top 10 scores and the 10
//! most recent matches.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::persistence::{self, HISTORY_KEY, SCORES_KEY, Storage, StorageError};
use crate::settings::{DEFAULT_PLAYER_NAME, Difficulty};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;
/// Maximum number of recent matches to keep
pub const MAX_HISTORY: usize = 10;

/// A single finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    /// Level reached
    #[serde(default = "first_level")]
    pub level: u32,
    #[serde(default = "default_player")]
    pub player: String,
    /// Unix timestamp (ms) when the round ended
    #[serde(rename = "date", default, deserialize_with = "lenient_timestamp")]
    pub timestamp: f64,
    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Difficulty,
}

impl ScoreEntry {
    pub fn new(player: &str, score: u32, level: u32, difficulty: Difficulty, timestamp: f64) -> Self {
        Self {
            score,
            level,
            player: player.to_string(),
            timestamp,
            difficulty,
        }
    }
}

fn first_level() -> u32 {
    1
}

fn default_player() -> String {
    DEFAULT_PLAYER_NAME.to_string()
}

/// Older records stored a locale date string; those read as 0.
fn lenient_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(d)?.as_f64().unwrap_or(0.0))
}

fn lenient_difficulty<'de, D: Deserializer<'de>>(d: D) -> Result<Difficulty, D::Error> {
    Ok(Value::deserialize(d)?
        .as_str()
        .and_then(Difficulty::from_str)
        .unwrap_or_default())
}

/// Decode a stored list entry by entry, so one unreadable record does not
/// cost the rest
fn load_entries(storage: &dyn Storage, key: &str) -> Vec<ScoreEntry> {
    let records: Vec<Value> = persistence::load_json(storage, key).unwrap_or_default();
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable {} entry: {}", key, e);
                None
            }
        })
        .collect()
}

/// Ranked leaderboard plus chronological history
#[derive(Debug, Clone, Default)]
pub struct ScoreLedger {
    /// Sorted descending by score; equal scores keep insertion order
    top: Vec<ScoreEntry>,
    /// Most recent first
    history: Vec<ScoreEntry>,
}

impl ScoreLedger {
    /// Create empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the leaderboard
    pub fn qualifies(&self, score: u32) -> bool {
        if self.top.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Must beat the lowest entry; ties lose to the older score
        self.top.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.top.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.top.len()) + 1)
    }

    /// Add a result in memory. Returns the leaderboard rank achieved
    /// (1-indexed) or None if it fell off the board.
    pub fn add_score(&mut self, entry: ScoreEntry) -> Option<usize> {
        self.history.insert(0, entry.clone());
        self.history.truncate(MAX_HISTORY);

        if !self.qualifies(entry.score) {
            return None;
        }

        // Insert after every entry with an equal or higher score
        let pos = self.top.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.top.insert(i, entry);
                i + 1
            }
            None => {
                self.top.push(entry);
                self.top.len()
            }
        };
        self.top.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Add a result and persist both records. Storage failures are logged;
    /// the in-memory ledger is updated regardless.
    pub fn record_result(&mut self, entry: ScoreEntry, storage: &mut dyn Storage) -> Option<usize> {
        let rank = self.add_score(entry);
        if let Err(e) = self.save(storage) {
            log::warn!("Could not save scores: {}", e);
        }
        rank
    }

    /// Up to `n` best entries, best first
    pub fn list_top_scores(&self, n: usize) -> &[ScoreEntry] {
        &self.top[..n.min(self.top.len())]
    }

    /// Up to `n` most recent entries, newest first
    pub fn list_history(&self, n: usize) -> &[ScoreEntry] {
        &self.history[..n.min(self.history.len())]
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.history.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.top.first().map(|e| e.score)
    }

    /// Forget everything and remove both stored records
    pub fn clear(&mut self, storage: &mut dyn Storage) {
        self.top.clear();
        self.history.clear();
        for key in [SCORES_KEY, HISTORY_KEY] {
            if let Err(e) = storage.remove_item(key) {
                log::warn!("Could not remove {}: {}", key, e);
            }
        }
        log::info!("Leaderboard cleared");
    }

    /// Load both records; anything missing or malformed starts empty.
    /// Stored lists are re-sorted and trimmed in case they were edited by hand.
    pub fn load(storage: &dyn Storage) -> Self {
        let mut top = load_entries(storage, SCORES_KEY);
        let mut history = load_entries(storage, HISTORY_KEY);

        top.sort_by(|a, b| b.score.cmp(&a.score));
        top.truncate(MAX_HIGH_SCORES);
        history.truncate(MAX_HISTORY);

        log::info!("Loaded {} high scores, {} recent matches", top.len(), history.len());
        Self { top, history }
    }

    /// Persist both records
    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        persistence::save_json(storage, SCORES_KEY, &self.top)?;
        persistence::save_json(storage, HISTORY_KEY, &self.history)?;
        log::info!("High scores saved ({} entries)", self.top.len());
        Ok(())
    }
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    format_date_relative(js_sys::Date::now(), timestamp)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(timestamp: f64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    format_date_relative(now, timestamp)
}

/// Relative date text for `timestamp` as seen at `now` (both ms)
pub fn format_date_relative(now: f64, timestamp: f64) -> String {
    if timestamp <= 0.0 {
        return "N/A".to_string();
    }
    let diff_mins = (now - timestamp) / 60_000.0;
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        if days == 1 {
            "Yesterday".to_string()
        } else {
            format!("{} days ago", days)
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;

    fn entry(player: &str, score: u32) -> ScoreEntry {
        ScoreEntry::new(player, score, 1, Difficulty::Medium, 1_700_000_000_000.0)
    }

    #[test]
    fn test_top_sorted_and_capped() {
        let mut ledger = ScoreLedger::new();
        for score in [30, 90, 10, 50, 70, 20, 80, 40, 60, 100, 0, 110] {
            ledger.add_score(entry("p", score));
        }
        let scores: Vec<u32> = ledger.list_top_scores(20).iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![110, 100, 90, 80, 70, 60, 50, 40, 30, 20]);
        assert_eq!(ledger.top_score(), Some(110));
    }

    #[test]
    fn test_history_most_recent_first() {
        let mut ledger = ScoreLedger::new();
        for score in 0..12 {
            ledger.add_score(entry("p", score));
        }
        let history: Vec<u32> = ledger.list_history(10).iter().map(|e| e.score).collect();
        assert_eq!(history, vec![11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
        assert_eq!(ledger.list_history(3).len(), 3);
    }

    #[test]
    fn test_equal_scores_keep_insertion_order() {
        let mut ledger = ScoreLedger::new();
        ledger.add_score(entry("first", 50));
        ledger.add_score(entry("second", 50));
        assert_eq!(ledger.add_score(entry("third", 50)), Some(3));

        let names: Vec<&str> = ledger
            .list_top_scores(10)
            .iter()
            .map(|e| e.player.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_and_qualification() {
        let mut ledger = ScoreLedger::new();
        for score in (1..=10).map(|s| s * 10) {
            ledger.add_score(entry("p", score));
        }
        assert!(!ledger.qualifies(10));
        assert_eq!(ledger.potential_rank(55), Some(6));
        assert_eq!(ledger.add_score(entry("p", 5)), None);
        // A non-qualifying round still shows up in history
        assert_eq!(ledger.list_history(1)[0].score, 5);
    }

    #[test]
    fn test_persist_and_reload() {
        let mut storage = MemoryStorage::new();
        let mut ledger = ScoreLedger::new();
        ledger.record_result(entry("Ana", 40), &mut storage);
        ledger.record_result(entry("Budi", 70), &mut storage);

        let reloaded = ScoreLedger::load(&storage);
        assert_eq!(reloaded.list_top_scores(10), ledger.list_top_scores(10));
        assert_eq!(reloaded.list_history(10)[0].player, "Budi");
    }

    #[test]
    fn test_record_shape() {
        let value = serde_json::to_value(entry("Ana", 40)).unwrap();
        assert_eq!(value["score"], 40);
        assert_eq!(value["level"], 1);
        assert_eq!(value["player"], "Ana");
        assert_eq!(value["difficulty"], "medium");
        assert!(value["date"].is_number());
    }

    #[test]
    fn test_load_legacy_date_strings() {
        let mut storage = MemoryStorage::new();
        let legacy = r#"[{"score":20,"level":1,"player":"Ana","date":"1/2/2024","difficulty":"mystery"}]"#;
        storage.set_item(SCORES_KEY, legacy).unwrap();

        let ledger = ScoreLedger::load(&storage);
        let top = ledger.list_top_scores(10);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].timestamp, 0.0);
        assert_eq!(top[0].difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_load_keeps_entries_with_missing_fields() {
        let mut storage = MemoryStorage::new();
        let stored = r#"[
            {"score":90,"level":3,"player":"Ana","date":1700000000000,"difficulty":"hard"},
            {"score":40,"player":"Budi"},
            {"player":"no score"}
        ]"#;
        storage.set_item(SCORES_KEY, stored).unwrap();

        let mut ledger = ScoreLedger::load(&storage);
        let top = ledger.list_top_scores(10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[1].player, "Budi");
        assert_eq!(top[1].level, 1);
        assert_eq!(top[1].difficulty, Difficulty::Medium);
        assert_eq!(top[1].timestamp, 0.0);

        // Recording keeps the older scores in storage
        ledger.record_result(entry("Cici", 10), &mut storage);
        let reloaded = ScoreLedger::load(&storage);
        let players: Vec<&str> = reloaded
            .list_top_scores(10)
            .iter()
            .map(|e| e.player.as_str())
            .collect();
        assert_eq!(players, vec!["Ana", "Budi", "Cici"]);
    }

    #[test]
    fn test_clear_removes_both_records() {
        let mut storage = MemoryStorage::new();
        let mut ledger = ScoreLedger::new();
        ledger.record_result(entry("Ana", 40), &mut storage);
        assert!(storage.contains_key(SCORES_KEY));
        assert!(storage.contains_key(HISTORY_KEY));

        ledger.clear(&mut storage);
        assert!(ledger.list_top_scores(10).is_empty());
        assert!(ledger.list_history(10).is_empty());
        assert!(storage.is_empty());
        assert!(ScoreLedger::load(&storage).is_empty());
    }

    #[test]
    fn test_record_without_storage_keeps_memory() {
        let mut storage = MemoryStorage::unavailable();
        let mut ledger = ScoreLedger::new();
        assert_eq!(ledger.record_result(entry("Ana", 40), &mut storage), Some(1));
        assert_eq!(ledger.top_score(), Some(40));
    }

    #[test]
    fn test_format_date_relative() {
        let now = 10.0 * 86_400_000.0;
        assert_eq!(format_date_relative(now, now - 10_000.0), "Just now");
        assert_eq!(format_date_relative(now, now - 120_000.0), "2 mins ago");
        assert_eq!(format_date_relative(now, now - 3_600_000.0), "1 hour ago");
        assert_eq!(format_date_relative(now, now - 86_400_000.0), "Yesterday");
        assert_eq!(format_date_relative(now, now - 3.0 * 86_400_000.0), "3 days ago");
        assert_eq!(format_date_relative(now, 0.0), "N/A");
    }

    proptest! {
        #[test]
        fn prop_top_bounded_and_sorted(scores in proptest::collection::vec(0u32..500, 0..40)) {
            let mut ledger = ScoreLedger::new();
            for score in scores {
                ledger.add_score(entry("p", score));
                let top = ledger.list_top_scores(usize::MAX);
                prop_assert!(top.len() <= MAX_HIGH_SCORES);
                prop_assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
                prop_assert!(ledger.list_history(usize::MAX).len() <= MAX_HISTORY);
            }
        }
    }
}
