//! Moderation core
//!
//! This module provides everything that decides what happens in a group:
//! - `PassList` - Single-use passes granted by admins
//! - `KillCounter` - Durable count of removals
//! - `MembershipProbe` - Concurrent lookup across watched groups
//! - `DecisionEngine` - Join policy and the state it owns
//! - `CommandRouter` - Slash commands and admin authorization
//! - `ShieldLoop` - Sequential event loop issuing actions to the gateway

pub mod commands;
pub mod decision;
pub mod event_loop;
pub mod kill_counter;
pub mod pass_list;
pub mod probe;

pub use commands::{CommandRouter, Command};
pub use decision::{DecisionEngine, JoinOutcome};
pub use event_loop::ShieldLoop;
pub use kill_counter::KillCounter;
pub use pass_list::PassList;
pub use probe::MembershipProbe;
