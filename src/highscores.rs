//! Ledger leaderboard
//!
//! Built from recent `ScoreEvent`s: each player's most recent score, highest
//! first, top 10.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_SIZE;
use crate::persistence::ScoreEvent;
use crate::settings::NetworkConfig;

/// A player address as reported by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Addresses compare case-insensitively (checksummed vs lowercase hex)
    pub fn matches(&self, other: &PlayerId) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// `0x1234...abcd` form for display
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub player: PlayerId,
    pub score: u32,
}

/// One display row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-indexed
    pub rank: usize,
    pub label: String,
    pub explorer_url: String,
    /// Row belongs to the connected player
    pub highlighted: bool,
}

/// Leaderboard of most recent per-player scores
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from events in ledger order (oldest first)
    pub fn from_events(events: &[ScoreEvent]) -> Self {
        let mut entries: Vec<LeaderboardEntry> = Vec::new();

        // Newest first, so the first sighting of a player is their latest score
        for event in events.iter().rev() {
            if entries.iter().any(|e| e.player.matches(&event.player)) {
                continue;
            }
            entries.push(LeaderboardEntry {
                player: event.player.clone(),
                score: event.score,
            });
        }

        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEADERBOARD_SIZE);
        Self { entries }
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Rank of a player (1-indexed), if listed
    pub fn rank_of(&self, player: &PlayerId) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.player.matches(player))
            .map(|i| i + 1)
    }

    /// Display rows, highlighting `me`
    pub fn rows(&self, me: Option<&PlayerId>, network: &NetworkConfig) -> Vec<LeaderboardRow> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| LeaderboardRow {
                rank: i + 1,
                label: format!("{}: {}", e.player.short(), e.score),
                explorer_url: network.address_url(e.player.as_str()),
                highlighted: me.is_some_and(|m| m.matches(&e.player)),
            })
            .collect()
    }
}

/// Highest score among the events, 0 if there are none
pub fn max_event_score(events: &[ScoreEvent]) -> u32 {
    events.iter().map(|e| e.score).max().unwrap_or(0)
}

/// What the leaderboard panel shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LeaderboardView {
    /// Not loaded yet (or no ledger)
    #[default]
    Hidden,
    Loaded(Leaderboard),
    Error,
}

impl LeaderboardView {
    /// Placeholder text when there are no rows to show
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            LeaderboardView::Loaded(board) if board.is_empty() => Some("No scores yet!"),
            LeaderboardView::Error => Some("Error loading leaderboard"),
            _ => None,
        }
    }
}
