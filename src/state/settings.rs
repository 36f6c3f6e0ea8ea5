//! Event settings.
//!
//! Controls how teams are generated, how many games are scheduled, and how
//! completed matches are scored.

use serde::{Deserialize, Serialize};

/// Default number of teams.
pub const DEFAULT_TEAMS_COUNT: u32 = 2;

/// Default roster size per team.
pub const DEFAULT_PLAYERS_PER_TEAM: u32 = 5;

/// Default number of games each team should play.
pub const DEFAULT_GAMES_PER_TEAM: u32 = 3;

/// Default match duration in minutes.
pub const DEFAULT_MATCH_DURATION_MINS: u32 = 15;

/// Settings for a matchday event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Number of teams to generate
    pub teams_count: u32,

    /// Roster size per team; overflow players go to the waitlist
    pub players_per_team: u32,

    /// Games each team should play in a generated schedule
    pub games_per_team: u32,

    /// Match duration in minutes (also seeds the countdown timer)
    pub match_duration_mins: u32,

    /// League points for a win
    pub win_points: u32,

    /// League points for a draw
    pub draw_points: u32,

    /// League points for a loss
    pub loss_points: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            teams_count: DEFAULT_TEAMS_COUNT,
            players_per_team: DEFAULT_PLAYERS_PER_TEAM,
            games_per_team: DEFAULT_GAMES_PER_TEAM,
            match_duration_mins: DEFAULT_MATCH_DURATION_MINS,
            win_points: 3,
            draw_points: 1,
            loss_points: 0,
        }
    }
}

impl GameSettings {
    /// Match duration in seconds, as used by the countdown timer.
    pub fn match_duration_secs(&self) -> u32 {
        self.match_duration_mins * 60
    }

    /// Total roster capacity across all teams.
    pub fn capacity(&self) -> usize {
        (self.teams_count * self.players_per_team) as usize
    }
}
