//! Team state and balancing.
//!
//! Teams are generated from the active roster with a snake draft: players are
//! sorted by skill and dealt across teams in alternating forward/backward
//! passes, which keeps aggregate skill closer than a plain round-robin deal.
//!
//! Teams hold player ids only; the roster owns the player records. A player
//! belongs to at most one team at any time, and a team with players always
//! has at least one captain.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::roster::Player;
use super::GameState;

/// Fixed color palette for generated teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamColor {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
}

impl TeamColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Purple => "purple",
        }
    }
}

/// Team names and colors assigned in generation order, cycling when the
/// event needs more teams than the palette holds.
pub const TEAM_PALETTE: [(&str, TeamColor); 6] = [
    ("Team Red", TeamColor::Red),
    ("Team Blue", TeamColor::Blue),
    ("Team Green", TeamColor::Green),
    ("Team Yellow", TeamColor::Yellow),
    ("Team Orange", TeamColor::Orange),
    ("Team Purple", TeamColor::Purple),
];

/// A generated team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Stable id within one generation (1-based)
    pub id: u32,

    /// Palette name
    pub name: String,

    /// Palette color
    pub color: TeamColor,

    /// Member player ids in draft order, no duplicates
    pub player_ids: Vec<u64>,

    /// Captains; subset of `player_ids`, non-empty whenever the team has
    /// players
    pub captain_ids: BTreeSet<u64>,

    /// Mean member skill, one decimal place; 0 for an empty team
    pub average_skill: f32,
}

impl Team {
    /// Create an empty team from the palette slot for `index` (0-based).
    pub fn from_palette(index: usize) -> Self {
        let (name, color) = TEAM_PALETTE[index % TEAM_PALETTE.len()];
        Self {
            id: index as u32 + 1,
            name: name.to_string(),
            color,
            player_ids: Vec::new(),
            captain_ids: BTreeSet::new(),
            average_skill: 0.0,
        }
    }

    /// Check if a player is on this team.
    pub fn has_member(&self, player_id: u64) -> bool {
        self.player_ids.contains(&player_id)
    }

    /// Remove a player, also dropping any captaincy. Returns whether the
    /// player was a member.
    pub fn remove_member(&mut self, player_id: u64) -> bool {
        let before = self.player_ids.len();
        self.player_ids.retain(|&id| id != player_id);
        if self.player_ids.len() == before {
            return false;
        }
        self.captain_ids.remove(&player_id);
        true
    }

    pub fn player_count(&self) -> usize {
        self.player_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.player_ids.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "color": self.color.as_str(),
            "player_ids": self.player_ids,
            "captain_ids": self.captain_ids.iter().collect::<Vec<_>>(),
            "average_skill": self.average_skill,
        })
    }
}

/// Elect a sole captain for a non-empty team.
///
/// Prefers a player already carrying the user-designated captain flag (first
/// in team order); otherwise the highest-skill member, ties broken by team
/// order.
pub(crate) fn elect_captain(team: &mut Team, roster: &[Player]) {
    let flagged = team
        .player_ids
        .iter()
        .find(|&&id| lookup(roster, id).is_some_and(|p| p.is_captain));

    let chosen = flagged.copied().or_else(|| top_skill_member(team, roster));

    team.captain_ids.clear();
    if let Some(id) = chosen {
        team.captain_ids.insert(id);
    }
}

/// Re-elect a captain after the captain set was emptied by a removal: the
/// highest-skill remaining member, ties broken by team order.
pub(crate) fn reelect_captain(team: &mut Team, roster: &[Player]) {
    team.captain_ids.clear();
    if let Some(id) = top_skill_member(team, roster) {
        team.captain_ids.insert(id);
    }
}

fn top_skill_member(team: &Team, roster: &[Player]) -> Option<u64> {
    let mut best: Option<(u64, u8)> = None;
    for &id in &team.player_ids {
        let Some(player) = lookup(roster, id) else {
            continue;
        };
        // Strict comparison keeps the first member on ties
        if best.map_or(true, |(_, skill)| player.skill_level > skill) {
            best = Some((id, player.skill_level));
        }
    }
    best.map(|(id, _)| id)
}

/// Recompute a team's average skill (one decimal place, 0 when empty).
pub(crate) fn recompute_average(team: &mut Team, roster: &[Player]) {
    let skills: Vec<u8> = team
        .player_ids
        .iter()
        .filter_map(|&id| lookup(roster, id).map(|p| p.skill_level))
        .collect();

    team.average_skill = if skills.is_empty() {
        0.0
    } else {
        let mean = skills.iter().map(|&s| s as f32).sum::<f32>() / skills.len() as f32;
        (mean * 10.0).round() / 10.0
    };
}

fn lookup(roster: &[Player], player_id: u64) -> Option<&Player> {
    roster.iter().find(|p| p.id == player_id)
}

impl GameState {
    /// Regenerate all teams from the active roster via snake draft.
    ///
    /// Active players are sorted by skill (descending, stable on ties so
    /// signup order decides) and dealt across `teams_count` fresh palette
    /// teams. When the roster exceeds capacity, the overflow is flagged onto
    /// the waitlist. With zero eligible players this is a no-op.
    pub fn generate_teams(&mut self) {
        let teams_count = self.settings.teams_count as usize;
        if teams_count == 0 {
            log::warn!("team generation skipped: teams_count is 0");
            return;
        }

        let mut active: Vec<(u64, u8)> = self
            .players
            .iter()
            .filter(|p| !p.is_waitlist)
            .map(|p| (p.id, p.skill_level))
            .collect();
        if active.is_empty() {
            log::warn!("team generation skipped: no eligible players");
            return;
        }
        active.sort_by(|a, b| b.1.cmp(&a.1));

        let capacity = self.settings.capacity();
        let selected: Vec<u64> = active.iter().take(capacity).map(|&(id, _)| id).collect();
        let overflow: Vec<u64> = active.iter().skip(capacity).map(|&(id, _)| id).collect();

        for player in &mut self.players {
            if overflow.contains(&player.id) {
                player.is_waitlist = true;
            }
        }

        let mut teams: Vec<Team> = (0..teams_count).map(Team::from_palette).collect();

        // Snake draft: forward 0..N-1, then backward N-1..0, reversing
        // direction at each end so end teams pick twice in a row
        let mut index = 0usize;
        let mut forward = true;
        for player_id in selected {
            teams[index].player_ids.push(player_id);
            if forward {
                if index + 1 == teams.len() {
                    forward = false;
                } else {
                    index += 1;
                }
            } else if index == 0 {
                forward = true;
            } else {
                index -= 1;
            }
        }

        for team in &mut teams {
            if !team.is_empty() {
                elect_captain(team, &self.players);
            }
            recompute_average(team, &self.players);
        }

        log::info!(
            "generated {} teams from {} active players",
            teams.len(),
            teams.iter().map(Team::player_count).sum::<usize>()
        );
        self.teams = teams;
    }

    /// Move a player onto a team, or onto the waitlist with `None`.
    ///
    /// The player is stripped from every team currently holding them before
    /// the destination is touched, so one-team-per-player holds regardless of
    /// prior state. Unknown player or destination ids are a no-op.
    pub fn move_player(&mut self, player_id: u64, to_team: Option<u32>) {
        if !self.players.iter().any(|p| p.id == player_id) {
            log::debug!("move_player: unknown player {}", player_id);
            return;
        }
        if let Some(team_id) = to_team {
            if !self.teams.iter().any(|t| t.id == team_id) {
                log::debug!("move_player: unknown team {}", team_id);
                return;
            }
        }

        for team in &mut self.teams {
            if team.remove_member(player_id) {
                if team.captain_ids.is_empty() && !team.player_ids.is_empty() {
                    reelect_captain(team, &self.players);
                }
                recompute_average(team, &self.players);
            }
        }

        match to_team {
            None => {
                if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
                    player.is_waitlist = true;
                }
            }
            Some(team_id) => {
                let team = self
                    .teams
                    .iter_mut()
                    .find(|t| t.id == team_id)
                    .expect("destination checked above");
                team.player_ids.push(player_id);
                // A captainless team adopts the incoming player
                if team.captain_ids.is_empty() {
                    team.captain_ids.insert(player_id);
                }
                recompute_average(team, &self.players);
            }
        }
    }

    /// Toggle a player's membership in a team's captain set.
    ///
    /// Teams support multiple simultaneous captains. Removing the last
    /// captain of a non-empty team is rejected and leaves the set unchanged.
    pub fn set_captain(&mut self, team_id: u32, player_id: u64) {
        let Some(team) = self.teams.iter_mut().find(|t| t.id == team_id) else {
            log::debug!("set_captain: unknown team {}", team_id);
            return;
        };
        if !team.has_member(player_id) {
            log::debug!("set_captain: player {} not on team {}", player_id, team_id);
            return;
        }

        if team.captain_ids.contains(&player_id) {
            if team.captain_ids.len() == 1 {
                log::debug!(
                    "set_captain: refusing to remove last captain of team {}",
                    team_id
                );
                return;
            }
            team.captain_ids.remove(&player_id);
        } else {
            team.captain_ids.insert(player_id);
        }
    }

    /// Toggle a player's captain designation.
    ///
    /// Flips the roster-level flag and, when the player is on a team, mirrors
    /// the change into that team's captain set. The last-captain guard
    /// applies: if the team-side removal would be rejected, the flag is left
    /// unchanged too.
    pub fn toggle_player_captain(&mut self, player_id: u64) {
        if !self.players.iter().any(|p| p.id == player_id) {
            log::debug!("toggle_player_captain: unknown player {}", player_id);
            return;
        }

        if let Some(team) = self
            .teams
            .iter_mut()
            .find(|t| t.has_member(player_id))
        {
            if team.captain_ids.contains(&player_id) {
                if team.captain_ids.len() == 1 {
                    log::debug!(
                        "toggle_player_captain: refusing to remove last captain of team {}",
                        team.id
                    );
                    return;
                }
                team.captain_ids.remove(&player_id);
            } else {
                team.captain_ids.insert(player_id);
            }
        }

        if let Some(player) = self.players.iter_mut().find(|p| p.id == player_id) {
            player.is_captain = !player.is_captain;
        }
    }

    /// Get a team by id.
    pub fn team(&self, team_id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    /// Find the team currently holding a player.
    pub fn team_of(&self, player_id: u64) -> Option<&Team> {
        self.teams.iter().find(|t| t.has_member(player_id))
    }
}
