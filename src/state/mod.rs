//! State management module for Matchday.
//!
//! This module provides the core state types and the engine operations:
//!
//! - `roster` - Player signup, removal, waitlist
//! - `team` - Snake-draft team generation, captains, membership moves
//! - `schedule` - Round-robin schedule generation, scores, match lifecycle
//! - `standings` - League table derived from completed matches
//! - `timer` - Countdown match timer state machine
//! - `settings` - Event configuration and scoring weights
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         GameState                            │
//! │                                                              │
//! │  players ──┐                                                 │
//! │            ├─▶ generate_teams ──▶ teams (snake draft)        │
//! │  settings ─┤                                                 │
//! │            ├─▶ generate_schedule ──▶ matches (round robin)   │
//! │  teams ────┘                            │                    │
//! │                                         ▼ update_score       │
//! │  standings  ◀── calculate_standings ── completed matches     │
//! │                                                              │
//! │  timer ◀── start/pause/reset/tick (host-driven cadence)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All mutation goes through the operations defined on [`GameState`]; teams
//! reference players by id and standings are derived, never edited. The
//! engine is synchronous and single-threaded; persistence lives in the
//! sibling `store` module.

pub mod roster;
pub mod schedule;
pub mod settings;
pub mod standings;
pub mod team;
pub mod timer;

// Re-export commonly used types
pub use roster::Player;
pub use schedule::{Match, MatchStatus};
pub use settings::GameSettings;
pub use standings::{calculate_standings, Standing};
pub use team::{Team, TeamColor, TEAM_PALETTE};
pub use timer::MatchTimer;

use chrono::NaiveDate;

/// Default event name, restored by a factory reset.
pub const DEFAULT_TOURNAMENT_NAME: &str = "Matchday League";

/// Authoritative state for one matchday event.
///
/// Created empty at first run, mutated only through the engine operations,
/// replaced wholesale by import or reset, and persisted by the store after
/// every mutation.
#[derive(Debug, Clone)]
pub struct GameState {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub matches: Vec<Match>,
    pub settings: GameSettings,
    pub standings: Vec<Standing>,
    pub timer: MatchTimer,
    pub tournament_name: String,
    /// Match currently being played, if any
    pub current_match_id: Option<u64>,
    /// Calendar day of the last reset, for the daily auto-reset check
    pub last_reset_date: Option<NaiveDate>,

    // Id allocation; ids are never reused
    next_player_id: u64,
    next_match_id: u64,
    next_signup_order: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Create a fresh, empty event state with default settings.
    pub fn new() -> Self {
        let settings = GameSettings::default();
        let timer = MatchTimer::new(settings.match_duration_mins);
        Self {
            players: Vec::new(),
            teams: Vec::new(),
            matches: Vec::new(),
            settings,
            standings: Vec::new(),
            timer,
            tournament_name: DEFAULT_TOURNAMENT_NAME.to_string(),
            current_match_id: None,
            last_reset_date: None,
            next_player_id: 1,
            next_match_id: 1,
            next_signup_order: 1,
        }
    }

    /// Replace the settings and restart the clock at the (possibly new)
    /// match duration.
    pub fn update_settings(&mut self, settings: GameSettings) {
        self.settings = settings;
        self.timer.reset(self.settings.match_duration_mins);
    }

    pub fn set_tournament_name(&mut self, name: &str) {
        self.tournament_name = name.trim().to_string();
    }

    /// Check if any match is currently being played.
    pub fn has_match_in_progress(&self) -> bool {
        self.matches
            .iter()
            .any(|m| m.status == MatchStatus::InProgress)
    }

    /// Clear all event data while keeping settings and tournament name.
    ///
    /// Shared by the reset operations in the store; does not touch the
    /// reset-date stamp.
    pub(crate) fn clear_event_data(&mut self) {
        self.players.clear();
        self.teams.clear();
        self.matches.clear();
        self.standings.clear();
        self.current_match_id = None;
        self.timer.reset(self.settings.match_duration_mins);
    }

    /// Re-derive the id counters from the data currently held.
    ///
    /// Used after rehydration and import so fresh ids never collide with
    /// loaded ones.
    pub(crate) fn rebuild_counters(&mut self) {
        self.next_player_id = self.players.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        self.next_match_id = self.matches.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        self.next_signup_order =
            self.players.iter().map(|p| p.signup_order).max().unwrap_or(0) + 1;
    }

    pub(crate) fn alloc_player_id(&mut self) -> u64 {
        let id = self.next_player_id;
        self.next_player_id += 1;
        id
    }

    pub(crate) fn alloc_match_id(&mut self) -> u64 {
        let id = self.next_match_id;
        self.next_match_id += 1;
        id
    }

    pub(crate) fn alloc_signup_order(&mut self) -> u32 {
        let order = self.next_signup_order;
        self.next_signup_order += 1;
        order
    }

    /// Convert the full state to a JSON snapshot for clients.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "tournament_name": self.tournament_name,
            "players": self.players.iter().map(|p| p.to_json()).collect::<Vec<_>>(),
            "teams": self.teams.iter().map(|t| t.to_json()).collect::<Vec<_>>(),
            "matches": self.matches.iter().map(|m| m.to_json()).collect::<Vec<_>>(),
            "standings": self.standings.iter().map(|s| s.to_json()).collect::<Vec<_>>(),
            "timer": self.timer.to_json(),
            "current_match_id": self.current_match_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = GameState::new();
        assert!(state.players.is_empty());
        assert!(state.teams.is_empty());
        assert!(state.matches.is_empty());
        assert_eq!(state.tournament_name, DEFAULT_TOURNAMENT_NAME);
        assert_eq!(state.timer.time_remaining, 900);
    }

    #[test]
    fn test_update_settings_restarts_clock() {
        let mut state = GameState::new();
        state.timer.start();
        state.timer.tick();

        let mut settings = state.settings.clone();
        settings.match_duration_mins = 20;
        state.update_settings(settings);

        assert!(state.timer.is_idle());
        assert_eq!(state.timer.time_remaining, 1200);
    }

    #[test]
    fn test_rebuild_counters_skips_past_existing_ids() {
        let mut state = GameState::new();
        state.add_player("Alice", 3, false);
        let mut other = GameState::new();
        other.players = state.players.clone();
        other.rebuild_counters();

        let next = other.add_player("Bob", 4, false);

        assert!(next > state.players[0].id);
    }

    #[test]
    fn test_full_flow_snapshot() {
        let mut state = GameState::new();
        for (i, skill) in [5, 4, 3, 2].iter().enumerate() {
            state.add_player(&format!("P{}", i + 1), *skill, false);
        }
        state.settings.teams_count = 2;
        state.settings.players_per_team = 2;
        state.generate_teams();
        state.generate_schedule();

        let snapshot = state.to_json();

        assert_eq!(snapshot["players"].as_array().unwrap().len(), 4);
        assert_eq!(snapshot["teams"].as_array().unwrap().len(), 2);
        assert_eq!(snapshot["matches"].as_array().unwrap().len(), 1);
        assert_eq!(snapshot["timer"]["is_running"], false);
    }
}
