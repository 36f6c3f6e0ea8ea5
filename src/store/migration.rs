//! Schema migration for persisted records.
//!
//! Runs once on the raw JSON at load, before typed deserialization, so
//! legacy-field handling never leaks into the engine. Two legacy shapes are
//! upgraded: epoch-millisecond numeric date fields (today's form is an
//! RFC 3339 string) and the single-captain `captain_id` team field (today a
//! `captain_ids` set).

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::STORE_VERSION;

/// Upgrade a raw persisted record to the current schema version.
pub(crate) fn migrate_record(mut record: Value) -> Value {
    let found = record
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;

    if found == 0 {
        migrate_v0_to_v1(&mut record);
        log::info!("migrated persisted state from version 0 to {}", STORE_VERSION);
    } else if found > STORE_VERSION {
        log::warn!(
            "loading persisted state from future version {} (current: {})",
            found,
            STORE_VERSION
        );
    }

    if let Some(obj) = record.as_object_mut() {
        obj.insert("version".to_string(), Value::from(STORE_VERSION));
    }
    record
}

fn migrate_v0_to_v1(record: &mut Value) {
    let Some(state) = record.get_mut("state") else {
        return;
    };

    if let Some(players) = state.get_mut("players").and_then(Value::as_array_mut) {
        for player in players {
            normalize_date_field(player, "created_at");
        }
    }

    if let Some(matches) = state.get_mut("matches").and_then(Value::as_array_mut) {
        for m in matches {
            normalize_date_field(m, "start_time");
            normalize_date_field(m, "end_time");
        }
    }

    if let Some(teams) = state.get_mut("teams").and_then(Value::as_array_mut) {
        for team in teams {
            migrate_captain_field(team);
        }
    }
}

/// Rewrite an epoch-millisecond number into the RFC 3339 string the current
/// schema uses. String fields are assumed current and left alone.
fn normalize_date_field(obj: &mut Value, key: &str) {
    let Some(millis) = obj.get(key).and_then(Value::as_i64) else {
        return;
    };
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(ts) => obj[key] = Value::from(ts.to_rfc3339()),
        None => {
            log::warn!("dropping out-of-range {} timestamp {}", key, millis);
            obj[key] = Value::Null;
        }
    }
}

/// Fold a legacy single `captain_id` into the `captain_ids` set. A team
/// carrying neither form gets an empty set.
fn migrate_captain_field(team: &mut Value) {
    if team.get("captain_ids").is_some_and(Value::is_array) {
        return;
    }

    let legacy = team.get("captain_id").and_then(Value::as_u64);
    let Some(obj) = team.as_object_mut() else {
        return;
    };
    obj.insert(
        "captain_ids".to_string(),
        match legacy {
            Some(id) => Value::from(vec![id]),
            None => Value::Array(Vec::new()),
        },
    );
    obj.remove("captain_id");
}
