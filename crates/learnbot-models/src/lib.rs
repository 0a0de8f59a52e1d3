//! Core data models for Learnbot.
//!
//! This crate provides the records shared by the stores and the dialogue
//! layer: learned triggers, admin roster entries and the closed set of
//! response kinds.

pub mod admin;
pub mod trigger;

pub use admin::AdminRecord;
pub use trigger::{canonical, ParseResponseKindError, ResponseKind, TriggerRecord};
