//! Core types for the shield
//!
//! This module provides the fundamental types used throughout the crate:
//! - `UserIdentity` / `ChatIdentity` - Who did something, and where
//! - `Event` - What the gateway delivered
//! - `ShieldError` - Error types

pub mod error;
pub mod event;
pub mod identity;

pub use error::{ShieldError, ShieldResult};
pub use event::Event;
pub use identity::{ChatId, ChatIdentity, MembershipStatus, MessageId, UserId, UserIdentity};
