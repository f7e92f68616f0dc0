//! # Domain Module
//!
//! Scheduling rules of the medication tracker. `due_time` answers "when is
//! this schedule next due", `pending_service` answers "what should this child
//! take now". Neither reads a clock: the evaluation time is always passed in.

pub mod commands;
pub mod due_time;
pub mod models;
pub mod pending_service;

pub use pending_service::{
    evaluate_pending, PendingEntry, PendingHorizon, PendingMedicationService, PendingPolicy,
};
