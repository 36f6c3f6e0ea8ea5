//! Player roster management.
//!
//! Players sign up in order, carry a self-reported skill level, and may sit
//! on the waitlist. Roster membership is the source of truth; teams only hold
//! player ids and resolve them through the roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::team::{recompute_average, reelect_captain};
use super::GameState;

/// A registered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique, never-reused id
    pub id: u64,

    /// Display name (trimmed, not unique)
    pub name: String,

    /// Self-reported skill on a small positive scale
    pub skill_level: u8,

    /// Whether the player sits on the waitlist
    pub is_waitlist: bool,

    /// User-designated captain preference, independent of the captaincy a
    /// team assigns during the draft
    pub is_captain: bool,

    /// Position in the signup sequence, stable for the player's lifetime
    pub signup_order: u32,

    /// When the player was registered
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "skill_level": self.skill_level,
            "is_waitlist": self.is_waitlist,
            "is_captain": self.is_captain,
            "signup_order": self.signup_order,
        })
    }
}

impl GameState {
    /// Register a new player and return their id.
    ///
    /// Names are trimmed but not deduplicated; two players may share a name.
    pub fn add_player(&mut self, name: &str, skill_level: u8, is_waitlist: bool) -> u64 {
        let id = self.alloc_player_id();
        let signup_order = self.alloc_signup_order();

        self.players.push(Player {
            id,
            name: name.trim().to_string(),
            skill_level,
            is_waitlist,
            is_captain: false,
            signup_order,
            created_at: Utc::now(),
        });

        id
    }

    /// Remove a player from the roster and from any team holding them.
    ///
    /// If the removal empties a team's captain set while players remain, the
    /// highest-skill remaining player is re-elected as sole captain.
    pub fn remove_player(&mut self, player_id: u64) {
        if !self.players.iter().any(|p| p.id == player_id) {
            log::debug!("remove_player: unknown player {}", player_id);
            return;
        }

        self.players.retain(|p| p.id != player_id);

        for team in &mut self.teams {
            if team.remove_member(player_id) {
                if team.captain_ids.is_empty() && !team.player_ids.is_empty() {
                    reelect_captain(team, &self.players);
                }
                recompute_average(team, &self.players);
            }
        }
    }

    /// Flip a player's waitlist flag.
    ///
    /// Team membership is untouched: an on-team player can be waitlisted
    /// without leaving their team.
    pub fn toggle_waitlist(&mut self, player_id: u64) {
        match self.players.iter_mut().find(|p| p.id == player_id) {
            Some(player) => player.is_waitlist = !player.is_waitlist,
            None => log::debug!("toggle_waitlist: unknown player {}", player_id),
        }
    }

    /// Get a player by id.
    pub fn player(&self, player_id: u64) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Players not on the waitlist, in signup order.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_waitlist)
    }

    /// Waitlisted players, in signup order.
    pub fn waitlisted_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_waitlist)
    }
}
