// src/watch/mod.rs

//! File watching for serve sessions.
//!
//! A binding ties one path or glob to one task. The coordinator owns a
//! single channel; every binding's `notify` callback filters its events
//! (pattern match, optional content fingerprint) and pushes
//! [`WatchTrigger`]s into it. This module knows nothing about what the
//! triggered task does.

pub mod coordinator;
pub mod hash;
pub mod patterns;

pub use coordinator::{BindingId, TriggerReason, WatchCoordinator, WatchHandle, WatchTrigger};
pub use patterns::WatchPattern;
