//! Matchday State Library
//!
//! This crate provides state management for Matchday pickup-sports logic.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Roster Management** - Player signup with skill levels, waitlist, and
//!   stable signup ordering.
//!
//! - **Team Balancing** - Snake-draft team generation from the active roster,
//!   captain election, and invariant-preserving membership moves.
//!
//! - **Schedule Generation** - Round-robin pairings placed under a rest
//!   constraint so no team plays two consecutive games.
//!
//! - **Standings** - League table derived purely from completed matches.
//!
//! - **Match Timer** - Countdown state machine driven by a host-side
//!   one-second cadence.
//!
//! The store module persists the authoritative state to a single local JSON
//! record, migrates legacy records at load, and owns the reset lifecycle
//! (safe reset, daily auto-reset, factory reset) plus export/import.
//!
//! # Design Principles
//!
//! 1. **All mutation goes through operations** - Callers never write fields
//!    directly; the operation surface is what preserves the invariants.
//!
//! 2. **Relations are id-based** - Teams hold player ids and resolve them
//!    through the roster, so a player can never be owned by two teams.
//!
//! 3. **Derived data is recomputed, never edited** - Standings and average
//!    skill are functions of the underlying state.
//!
//! 4. **No networking, no async** - This crate is pure state; hosts own the
//!    event loop, the tick cadence, and when to persist.
//!
//! # Example
//!
//! ```rust
//! use matchday_state::GameState;
//!
//! let mut state = GameState::new();
//!
//! // Sign up players
//! state.add_player("Alice", 5, false);
//! state.add_player("Bob", 4, false);
//! state.add_player("Cara", 3, false);
//! state.add_player("Dan", 2, false);
//!
//! // Balance teams and build a schedule
//! state.generate_teams();
//! state.generate_schedule();
//! assert_eq!(state.teams.len(), 2);
//!
//! // Play the first match
//! let match_id = state.matches[0].id;
//! state.start_match(match_id);
//! state.timer.start();
//! state.update_score(match_id, 3, 1);
//!
//! assert_eq!(state.standings[0].points, 3);
//! ```

pub mod state;
pub mod store;

// Re-export everything from state module at crate root
pub use state::*;
pub use store::{ResetOutcome, Store, StoreError};
