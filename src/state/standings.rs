//! Standings derivation.
//!
//! The league table is a pure function of completed matches and the scoring
//! weights in settings. It is never mutated directly; any operation that can
//! change completed-match attribution recomputes it in full.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::schedule::{Match, MatchStatus};
use super::settings::GameSettings;
use super::team::Team;
use super::GameState;

/// One league-table row, fully derived from match history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: u32,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl Standing {
    fn zero(team_id: u32) -> Self {
        Self {
            team_id,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: u32, conceded: u32, settings: &GameSettings) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        if scored > conceded {
            self.won += 1;
            self.points += settings.win_points;
        } else if scored < conceded {
            self.lost += 1;
            self.points += settings.loss_points;
        } else {
            self.drawn += 1;
            self.points += settings.draw_points;
        }
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "team_id": self.team_id,
            "played": self.played,
            "won": self.won,
            "drawn": self.drawn,
            "lost": self.lost,
            "goals_for": self.goals_for,
            "goals_against": self.goals_against,
            "goal_difference": self.goal_difference,
            "points": self.points,
        })
    }
}

/// Compute the league table from scratch.
///
/// Every completed match is folded exactly once. Ordering: points descending,
/// then goal difference, then goals for; remaining ties keep team-list order
/// (the sort is stable). Idempotent by construction.
pub fn calculate_standings(
    matches: &[Match],
    teams: &[Team],
    settings: &GameSettings,
) -> Vec<Standing> {
    let mut table: Vec<Standing> = teams.iter().map(|t| Standing::zero(t.id)).collect();
    let index: HashMap<u32, usize> = teams.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

    for m in matches.iter().filter(|m| m.status == MatchStatus::Completed) {
        // A result referencing a team that no longer exists contributes
        // nothing
        let (Some(&ia), Some(&ib)) = (index.get(&m.team_a), index.get(&m.team_b)) else {
            continue;
        };
        table[ia].record(m.score_a, m.score_b, settings);
        table[ib].record(m.score_b, m.score_a, settings);
    }

    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
    });

    table
}

impl GameState {
    /// Replace the stored standings with a fresh derivation.
    pub fn recompute_standings(&mut self) {
        self.standings = calculate_standings(&self.matches, &self.teams, &self.settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_teams(count: u32) -> GameState {
        let mut state = GameState::new();
        state.settings.teams_count = count;
        state.settings.players_per_team = 1;
        for i in 0..count {
            state.add_player(&format!("P{}", i + 1), 3, false);
        }
        state.generate_teams();
        state
    }

    #[test]
    fn test_only_completed_matches_count() {
        let mut state = state_with_teams(2);
        state.add_match(1, 2);
        state.add_match(1, 2);
        let played = state.matches[0].id;
        state.update_score(played, 2, 1);

        let table = calculate_standings(&state.matches, &state.teams, &state.settings);

        assert_eq!(table.iter().map(|s| s.played).sum::<u32>(), 2);
        let winner = table.iter().find(|s| s.team_id == 1).unwrap();
        assert_eq!((winner.won, winner.points), (1, 3));
        let loser = table.iter().find(|s| s.team_id == 2).unwrap();
        assert_eq!((loser.lost, loser.points), (1, 0));
    }

    #[test]
    fn test_ordering_points_then_difference_then_goals() {
        let mut state = state_with_teams(4);
        // Team 1 beats team 2 heavily; team 3 beats team 4 narrowly
        state.add_match(1, 2);
        state.add_match(3, 4);
        let ids: Vec<u64> = state.matches.iter().map(|m| m.id).collect();
        state.update_score(ids[0], 5, 0);
        state.update_score(ids[1], 2, 1);

        let table = &state.standings;

        // Both winners on 3 points; team 1 leads on goal difference
        assert_eq!(table[0].team_id, 1);
        assert_eq!(table[1].team_id, 3);
        // Both losers on 0; team 4 (-1) ahead of team 2 (-5)
        assert_eq!(table[2].team_id, 4);
        assert_eq!(table[3].team_id, 2);
    }

    #[test]
    fn test_goals_for_breaks_equal_difference() {
        let mut state = state_with_teams(4);
        state.add_match(1, 2);
        state.add_match(3, 4);
        let ids: Vec<u64> = state.matches.iter().map(|m| m.id).collect();
        // Same +2 difference, team 3 scored more
        state.update_score(ids[0], 2, 0);
        state.update_score(ids[1], 4, 2);

        assert_eq!(state.standings[0].team_id, 3);
        assert_eq!(state.standings[1].team_id, 1);
    }

    #[test]
    fn test_unresolved_ties_keep_team_order() {
        let state = state_with_teams(3);

        let table = calculate_standings(&state.matches, &state.teams, &state.settings);

        // No completed matches: all-zero rows stay in team-list order
        let ids: Vec<u32> = table.iter().map(|s| s.team_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_draw_points_from_settings() {
        let mut state = state_with_teams(2);
        state.settings.draw_points = 2;
        state.add_match(1, 2);
        let id = state.matches[0].id;
        state.update_score(id, 1, 1);

        for row in &state.standings {
            assert_eq!((row.drawn, row.points), (1, 2));
        }
    }

    #[test]
    fn test_idempotent() {
        let mut state = state_with_teams(4);
        state.settings.games_per_team = 3;
        state.generate_schedule();
        let ids: Vec<u64> = state.matches.iter().map(|m| m.id).collect();
        state.update_score(ids[0], 2, 1);
        state.update_score(ids[1], 0, 3);
        state.update_score(ids[2], 1, 1);

        let once = calculate_standings(&state.matches, &state.teams, &state.settings);
        let twice = calculate_standings(&state.matches, &state.teams, &state.settings);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_match_referencing_dropped_team_is_skipped() {
        let mut state = state_with_teams(2);
        state.add_match(1, 2);
        let id = state.matches[0].id;
        state.update_score(id, 2, 0);

        // Regenerating with one team drops team 2 from the table
        state.settings.teams_count = 1;
        state.generate_teams();
        state.recompute_standings();

        assert_eq!(state.standings.len(), 1);
        assert_eq!(state.standings[0].played, 0);
    }
}
