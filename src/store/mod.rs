//! Persistent store controller.
//!
//! Serializes the authoritative state to a single JSON record on disk (the
//! local-storage equivalent of one namespaced key), rehydrates it with
//! migration at startup, and owns the reset lifecycle and export/import.
//!
//! Writes are fire-and-forget after each mutation: the engine assumes one
//! active client, so a failed write is logged rather than surfaced. Loads
//! never destroy data — a missing or unreadable record yields a fresh state
//! and leaves the file alone until the next save.

mod error;
mod migration;

pub use error::StoreError;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::state::{
    GameSettings, GameState, Match, Player, Standing, Team, DEFAULT_TOURNAMENT_NAME,
};

/// Current persisted-record schema version.
pub const STORE_VERSION: u32 = 1;

/// Filename of the persisted record.
pub const STORE_FILE_NAME: &str = "matchday_state.json";

/// The on-disk record: the authoritative state subset plus a schema version.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    state: PersistedState,
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    teams: Vec<Team>,
    #[serde(default)]
    matches: Vec<Match>,
    #[serde(default)]
    settings: GameSettings,
    #[serde(default)]
    standings: Vec<Standing>,
    #[serde(default = "default_tournament_name")]
    tournament_name: String,
    #[serde(default)]
    current_match_id: Option<u64>,
    #[serde(default)]
    last_reset_date: Option<NaiveDate>,
}

fn default_tournament_name() -> String {
    DEFAULT_TOURNAMENT_NAME.to_string()
}

impl PersistedRecord {
    fn from_state(state: &GameState) -> Self {
        Self {
            state: PersistedState {
                players: state.players.clone(),
                teams: state.teams.clone(),
                matches: state.matches.clone(),
                settings: state.settings.clone(),
                standings: state.standings.clone(),
                tournament_name: state.tournament_name.clone(),
                current_match_id: state.current_match_id,
                last_reset_date: state.last_reset_date,
            },
            version: STORE_VERSION,
        }
    }

    /// Rebuild a live state from the record. The timer always starts fresh;
    /// id counters are re-derived so new ids never collide with loaded ones.
    fn into_state(self) -> GameState {
        let mut state = GameState::new();
        state.players = self.state.players;
        state.teams = self.state.teams;
        state.matches = self.state.matches;
        state.settings = self.state.settings;
        state.standings = self.state.standings;
        state.tournament_name = self.state.tournament_name;
        state.current_match_id = self.state.current_match_id;
        state.last_reset_date = self.state.last_reset_date;
        state.timer.reset(state.settings.match_duration_mins);
        state.rebuild_counters();
        state
    }
}

/// The export/import document: the same shape as the persisted state, as a
/// standalone pretty-printed file for hand inspection or re-import.
#[derive(Debug, Serialize, Deserialize)]
struct ExportDocument {
    #[serde(default)]
    players: Vec<Player>,
    #[serde(default)]
    teams: Vec<Team>,
    #[serde(default)]
    matches: Vec<Match>,
    #[serde(default)]
    settings: GameSettings,
    #[serde(default)]
    standings: Vec<Standing>,
}

/// Outcome of a guarded reset, returned instead of an error so callers can
/// surface the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub success: bool,
    pub reason: Option<String>,
}

impl ResetOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }

    fn blocked(reason: &str) -> Self {
        Self {
            success: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// File-backed store for one matchday event.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Create a store writing to an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store using the standard filename inside a directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(STORE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the current state, replacing the record atomically.
    pub fn save(&self, state: &GameState) -> Result<(), StoreError> {
        let record = PersistedRecord::from_state(state);
        let json = serde_json::to_string(&record)?;

        // Write-then-rename so a crash mid-write cannot corrupt the record
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!("state persisted to {}", self.path.display());
        Ok(())
    }

    /// Rehydrate state from disk, migrating legacy records.
    ///
    /// A missing record yields a fresh state; an unreadable one is logged
    /// and also yields a fresh state rather than failing startup.
    pub fn load(&self) -> GameState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                log::info!("no persisted state at {}", self.path.display());
                GameState::new()
            }
            Err(e) => {
                log::warn!("failed to load persisted state: {}; starting fresh", e);
                GameState::new()
            }
        }
    }

    fn try_load(&self) -> Result<Option<GameState>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        let value = migration::migrate_record(value);
        let record: PersistedRecord = serde_json::from_value(value)?;
        Ok(Some(record.into_state()))
    }

    /// Clear the event if nothing is live.
    ///
    /// Refuses while a match is in progress or the timer is running. On
    /// success players, teams, matches and standings are cleared, the timer
    /// re-armed, and the reset date stamped; settings and the tournament
    /// name survive.
    pub fn reset_all_safe(&self, state: &mut GameState) -> ResetOutcome {
        if state.has_match_in_progress() {
            return ResetOutcome::blocked("a match is in progress");
        }
        if state.timer.is_running {
            return ResetOutcome::blocked("the match timer is running");
        }

        state.clear_event_data();
        state.last_reset_date = Some(today());
        log::info!("event data cleared by reset");
        self.persist_after_mutation(state);
        ResetOutcome::ok()
    }

    /// Clear the event once per calendar day.
    ///
    /// Compares the stored reset date with today and clears unconditionally
    /// on a new day — no in-progress guard, since this runs at process start
    /// before any match can be live. Returns whether a reset fired.
    pub fn check_daily_auto_reset(&self, state: &mut GameState) -> bool {
        self.auto_reset_on(state, today())
    }

    pub(crate) fn auto_reset_on(&self, state: &mut GameState, today: NaiveDate) -> bool {
        if state.last_reset_date == Some(today) {
            return false;
        }

        state.clear_event_data();
        state.last_reset_date = Some(today);
        log::info!("daily auto-reset cleared event data");
        self.persist_after_mutation(state);
        true
    }

    /// Factory reset: clear the event and restore default settings and
    /// tournament name.
    pub fn reset_app(&self, state: &mut GameState) {
        state.update_settings(GameSettings::default());
        state.set_tournament_name(DEFAULT_TOURNAMENT_NAME);
        state.clear_event_data();
        state.last_reset_date = Some(today());
        log::info!("factory reset restored defaults");
        self.persist_after_mutation(state);
    }

    /// Serialize the event to a pretty-printed standalone document.
    pub fn export_data(state: &GameState) -> Result<String, StoreError> {
        let doc = ExportDocument {
            players: state.players.clone(),
            teams: state.teams.clone(),
            matches: state.matches.clone(),
            settings: state.settings.clone(),
            standings: state.standings.clone(),
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Replace the event from an exported document.
    ///
    /// All-or-nothing: a parse failure is logged and leaves the current
    /// state untouched. Missing fields fall back to defaults and empty
    /// collections. Returns whether the import applied.
    pub fn import_data(&self, state: &mut GameState, data: &str) -> bool {
        let doc: ExportDocument = match serde_json::from_str(data) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("import rejected: {}", e);
                return false;
            }
        };

        state.players = doc.players;
        state.teams = doc.teams;
        state.matches = doc.matches;
        state.settings = doc.settings;
        state.standings = doc.standings;
        state.current_match_id = None;
        state.timer.reset(state.settings.match_duration_mins);
        state.rebuild_counters();

        log::info!("imported {} players, {} teams, {} matches",
            state.players.len(), state.teams.len(), state.matches.len());
        self.persist_after_mutation(state);
        true
    }

    /// Persistence after a mutation is fire-and-forget: a failed write is
    /// logged, never surfaced.
    fn persist_after_mutation(&self, state: &GameState) {
        if let Err(e) = self.save(state) {
            log::error!("failed to persist state: {}", e);
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MatchStatus;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::in_dir(dir.path());
        (dir, store)
    }

    fn populated_state() -> GameState {
        let mut state = GameState::new();
        for (i, skill) in [5, 4, 4, 3].iter().enumerate() {
            state.add_player(&format!("P{}", i + 1), *skill, false);
        }
        state.settings.teams_count = 2;
        state.settings.players_per_team = 2;
        state.generate_teams();
        state.generate_schedule();
        let id = state.matches[0].id;
        state.update_score(id, 2, 1);
        state
    }

    #[test]
    fn test_save_load_round_trip() {
        let (_dir, store) = store();
        let state = populated_state();

        store.save(&state).unwrap();
        let loaded = store.load();

        assert_eq!(loaded.players, state.players);
        assert_eq!(loaded.teams, state.teams);
        assert_eq!(loaded.matches, state.matches);
        assert_eq!(loaded.settings, state.settings);
        assert_eq!(loaded.standings, state.standings);
        assert_eq!(loaded.tournament_name, state.tournament_name);
    }

    #[test]
    fn test_loaded_state_allocates_fresh_ids() {
        let (_dir, store) = store();
        let state = populated_state();
        store.save(&state).unwrap();

        let mut loaded = store.load();
        let new_id = loaded.add_player("New", 3, false);

        assert!(state.players.iter().all(|p| p.id != new_id));
    }

    #[test]
    fn test_missing_file_yields_fresh_state() {
        let (_dir, store) = store();

        let state = store.load();

        assert!(state.players.is_empty());
        assert_eq!(state.settings, GameSettings::default());
    }

    #[test]
    fn test_corrupt_file_yields_fresh_state() {
        let (_dir, store) = store();
        fs::write(store.path(), "not json {").unwrap();

        let state = store.load();

        assert!(state.players.is_empty());
    }

    #[test]
    fn test_load_migrates_legacy_record() {
        let (_dir, store) = store();
        let legacy = serde_json::json!({
            "state": {
                "players": [{
                    "id": 7,
                    "name": "Old Timer",
                    "skill_level": 4,
                    "is_waitlist": false,
                    "is_captain": false,
                    "signup_order": 1,
                    "created_at": 1_700_000_000_000_i64,
                }],
                "teams": [{
                    "id": 1,
                    "name": "Team Red",
                    "color": "red",
                    "player_ids": [7],
                    "captain_id": 7,
                    "average_skill": 4.0,
                }],
            },
        });
        fs::write(store.path(), legacy.to_string()).unwrap();

        let state = store.load();

        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].id, 7);
        assert!(state.teams[0].captain_ids.contains(&7));
    }

    #[test]
    fn test_safe_reset_blocked_by_live_match() {
        let (_dir, store) = store();
        let mut state = populated_state();
        state.add_match(1, 2);
        let id = state.matches.last().unwrap().id;
        state.start_match(id);
        state.timer.reset(state.settings.match_duration_mins);
        let before_players = state.players.clone();

        let outcome = store.reset_all_safe(&mut state);

        assert!(!outcome.success);
        assert!(outcome.reason.is_some());
        assert_eq!(state.players, before_players);
        assert_eq!(state.match_by_id(id).unwrap().status, MatchStatus::InProgress);
    }

    #[test]
    fn test_safe_reset_blocked_by_running_timer() {
        let (_dir, store) = store();
        let mut state = populated_state();
        state.timer.start();

        let outcome = store.reset_all_safe(&mut state);

        assert!(!outcome.success);
        assert!(!state.players.is_empty());
    }

    #[test]
    fn test_safe_reset_clears_but_preserves_settings() {
        let (_dir, store) = store();
        let mut state = populated_state();
        state.set_tournament_name("Sunday League");
        state.settings.match_duration_mins = 25;

        let outcome = store.reset_all_safe(&mut state);

        assert!(outcome.success);
        assert!(state.players.is_empty());
        assert!(state.teams.is_empty());
        assert!(state.matches.is_empty());
        assert!(state.standings.is_empty());
        assert_eq!(state.current_match_id, None);
        assert!(state.last_reset_date.is_some());
        // Settings and name survive
        assert_eq!(state.settings.match_duration_mins, 25);
        assert_eq!(state.tournament_name, "Sunday League");
        assert_eq!(state.timer.time_remaining, 25 * 60);
    }

    #[test]
    fn test_daily_auto_reset_fires_on_new_day_only() {
        let (_dir, store) = store();
        let mut state = populated_state();
        let yesterday = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        state.last_reset_date = Some(yesterday);

        assert!(store.auto_reset_on(&mut state, today));
        assert!(state.players.is_empty());
        assert_eq!(state.last_reset_date, Some(today));

        // Second check the same day does nothing
        state.add_player("Alice", 3, false);
        assert!(!store.auto_reset_on(&mut state, today));
        assert_eq!(state.players.len(), 1);
    }

    #[test]
    fn test_daily_auto_reset_ignores_live_match() {
        let (_dir, store) = store();
        let mut state = populated_state();
        state.add_match(1, 2);
        let id = state.matches.last().unwrap().id;
        state.start_match(id);
        state.last_reset_date = Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let fired = store.auto_reset_on(
            &mut state,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        );

        // No guard on the daily path
        assert!(fired);
        assert!(state.matches.is_empty());
    }

    #[test]
    fn test_factory_reset_restores_defaults() {
        let (_dir, store) = store();
        let mut state = populated_state();
        state.set_tournament_name("Sunday League");
        state.settings.match_duration_mins = 45;

        store.reset_app(&mut state);

        assert!(state.players.is_empty());
        assert_eq!(state.settings, GameSettings::default());
        assert_eq!(state.tournament_name, DEFAULT_TOURNAMENT_NAME);
    }

    #[test]
    fn test_export_import_round_trip() {
        let (_dir, store) = store();
        let state = populated_state();

        let exported = Store::export_data(&state).unwrap();
        let mut restored = GameState::new();
        assert!(store.import_data(&mut restored, &exported));

        assert_eq!(restored.players, state.players);
        assert_eq!(restored.teams, state.teams);
        assert_eq!(restored.matches, state.matches);
        assert_eq!(restored.settings, state.settings);
        assert_eq!(restored.standings, state.standings);
    }

    #[test]
    fn test_import_failure_leaves_state_untouched() {
        let (_dir, store) = store();
        let mut state = populated_state();
        let before = state.players.clone();

        assert!(!store.import_data(&mut state, "{ definitely broken"));

        assert_eq!(state.players, before);
    }

    #[test]
    fn test_import_defaults_missing_fields() {
        let (_dir, store) = store();
        let mut state = populated_state();

        assert!(store.import_data(&mut state, "{}"));

        assert!(state.players.is_empty());
        assert!(state.teams.is_empty());
        assert_eq!(state.settings, GameSettings::default());
    }

    #[test]
    fn test_export_is_pretty_printed() {
        let state = populated_state();

        let exported = Store::export_data(&state).unwrap();

        assert!(exported.contains('\n'));
        assert!(exported.contains("\"players\""));
    }
}
