//! Match schedule management.
//!
//! Schedules are built from the complete set of unordered team pairings,
//! walked greedily under a rest constraint: no team plays in two consecutive
//! game slots. When the constraint exhausts the remaining pairings the
//! schedule comes out shorter than requested, which is a partial success
//! rather than an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GameState;

/// Match lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// On the schedule, not yet played
    #[default]
    Scheduled,
    /// Currently being played
    InProgress,
    /// Played to a result
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

/// A single match between two distinct teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Unique id
    pub id: u64,

    /// Position in the schedule, 1-based, monotonic per generation
    pub game_number: u32,

    /// Home side team id; always differs from `team_b`
    pub team_a: u32,

    /// Away side team id
    pub team_b: u32,

    pub score_a: u32,
    pub score_b: u32,

    pub status: MatchStatus,

    /// Planned duration in minutes, copied from settings at creation
    pub duration_mins: u32,

    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Match {
    fn new(id: u64, game_number: u32, team_a: u32, team_b: u32, duration_mins: u32) -> Self {
        Self {
            id,
            game_number,
            team_a,
            team_b,
            score_a: 0,
            score_b: 0,
            status: MatchStatus::Scheduled,
            duration_mins,
            start_time: None,
            end_time: None,
        }
    }

    /// Check if a team plays in this match.
    pub fn involves(&self, team_id: u32) -> bool {
        self.team_a == team_id || self.team_b == team_id
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "game_number": self.game_number,
            "team_a": self.team_a,
            "team_b": self.team_b,
            "score_a": self.score_a,
            "score_b": self.score_b,
            "status": self.status.as_str(),
            "duration_mins": self.duration_mins,
        })
    }
}

impl GameState {
    /// Generate a fresh round-robin schedule, replacing the current one.
    ///
    /// The pairing list is every unordered team pair once, in team-list
    /// order. The target match count is
    /// `min(pair count, games_per_team * teams / 2)`. Pairings are placed by
    /// repeated greedy sweeps; a pair is schedulable into the next slot only
    /// if neither team played the immediately preceding slot. A sweep that
    /// places nothing ends the schedule early.
    pub fn generate_schedule(&mut self) {
        if self.teams.len() < 2 {
            log::warn!("schedule generation skipped: need at least 2 teams");
            return;
        }

        let mut pairs: Vec<(u32, u32)> = Vec::new();
        for (i, a) in self.teams.iter().enumerate() {
            for b in &self.teams[i + 1..] {
                pairs.push((a.id, b.id));
            }
        }

        let target = pairs
            .len()
            .min(self.settings.games_per_team as usize * self.teams.len() / 2);

        let mut scheduled: Vec<Match> = Vec::new();
        let mut placed = vec![false; pairs.len()];

        while scheduled.len() < target {
            let rest_blocked = |a: u32, b: u32| {
                scheduled
                    .last()
                    .map_or(false, |m| m.involves(a) || m.involves(b))
            };

            let next = pairs
                .iter()
                .enumerate()
                .position(|(i, &(a, b))| !placed[i] && !rest_blocked(a, b));

            match next {
                Some(i) => {
                    placed[i] = true;
                    let (a, b) = pairs[i];
                    let id = self.alloc_match_id();
                    let game_number = scheduled.len() as u32 + 1;
                    scheduled.push(Match::new(
                        id,
                        game_number,
                        a,
                        b,
                        self.settings.match_duration_mins,
                    ));
                }
                None => {
                    log::debug!(
                        "schedule cut short at {} of {} matches: rest constraint \
                         exhausted the remaining pairings",
                        scheduled.len(),
                        target
                    );
                    break;
                }
            }
        }

        log::info!("generated schedule with {} matches", scheduled.len());
        self.matches = scheduled;
        self.current_match_id = None;
        self.recompute_standings();
    }

    /// Append a single ad-hoc match.
    ///
    /// Identical or unknown team ids are a no-op. The new match takes the
    /// next game number after the current maximum.
    pub fn add_match(&mut self, team_a: u32, team_b: u32) {
        if team_a == team_b {
            log::debug!("add_match: a team cannot play itself");
            return;
        }
        if !self.teams.iter().any(|t| t.id == team_a)
            || !self.teams.iter().any(|t| t.id == team_b)
        {
            log::debug!("add_match: unknown team id");
            return;
        }

        let game_number = self
            .matches
            .iter()
            .map(|m| m.game_number)
            .max()
            .unwrap_or(0)
            + 1;
        let id = self.alloc_match_id();
        self.matches.push(Match::new(
            id,
            game_number,
            team_a,
            team_b,
            self.settings.match_duration_mins,
        ));
    }

    /// Reassign the teams playing an existing match.
    ///
    /// A still-scheduled match loses its scores (a result tied to the old
    /// teams is meaningless); a completed match keeps them and standings are
    /// recomputed since the result now attributes to different teams.
    pub fn swap_teams_in_match(&mut self, match_id: u64, new_a: u32, new_b: u32) {
        if new_a == new_b {
            log::debug!("swap_teams_in_match: a team cannot play itself");
            return;
        }
        if !self.teams.iter().any(|t| t.id == new_a)
            || !self.teams.iter().any(|t| t.id == new_b)
        {
            log::debug!("swap_teams_in_match: unknown team id");
            return;
        }
        let Some(m) = self.matches.iter_mut().find(|m| m.id == match_id) else {
            log::debug!("swap_teams_in_match: unknown match {}", match_id);
            return;
        };

        m.team_a = new_a;
        m.team_b = new_b;

        match m.status {
            MatchStatus::Scheduled => {
                m.score_a = 0;
                m.score_b = 0;
            }
            MatchStatus::Completed => self.recompute_standings(),
            MatchStatus::InProgress => {}
        }
    }

    /// Start a scheduled match: marks it in progress, stamps the start time,
    /// tracks it as the current match, and re-arms the countdown timer.
    pub fn start_match(&mut self, match_id: u64) {
        let duration = self.settings.match_duration_mins;
        let Some(m) = self.matches.iter_mut().find(|m| m.id == match_id) else {
            log::debug!("start_match: unknown match {}", match_id);
            return;
        };
        if m.status != MatchStatus::Scheduled {
            log::debug!(
                "start_match: match {} is {}, not scheduled",
                match_id,
                m.status.as_str()
            );
            return;
        }

        m.status = MatchStatus::InProgress;
        m.start_time = Some(Utc::now());
        self.current_match_id = Some(match_id);
        self.timer.reset(duration);
    }

    /// Record a score for a match.
    ///
    /// Any positive score marks the match completed (a genuine 0-0 can never
    /// complete; preserved as observed product behavior). Standings are
    /// recomputed synchronously afterwards.
    pub fn update_score(&mut self, match_id: u64, score_a: u32, score_b: u32) {
        let Some(m) = self.matches.iter_mut().find(|m| m.id == match_id) else {
            log::debug!("update_score: unknown match {}", match_id);
            return;
        };

        m.score_a = score_a;
        m.score_b = score_b;

        if score_a > 0 || score_b > 0 {
            if m.status != MatchStatus::Completed {
                m.end_time = Some(Utc::now());
            }
            m.status = MatchStatus::Completed;
            if self.current_match_id == Some(match_id) {
                self.current_match_id = None;
            }
        }

        self.recompute_standings();
    }

    /// Get a match by id.
    pub fn match_by_id(&self, match_id: u64) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }

    /// Matches with a recorded result.
    pub fn completed_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches
            .iter()
            .filter(|m| m.status == MatchStatus::Completed)
    }
}
