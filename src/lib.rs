//! Agent core for live deposition practice sessions.
//!
//! Four collaborating services drive a session: the inconsistency detector
//! checks each witness answer against the sworn record, the interrogator
//! streams the next question, the objection screener classifies questions
//! against the Federal Rules of Evidence, and the brief generator writes
//! the post-session coaching report. [`DepositionAgents`] wires them up
//! from configuration. Session orchestration, persistence, and client
//! transport live above this crate.

pub mod app;
pub mod model;
pub mod retriever;
pub mod service;

pub use app::{AppError, DepositionAgents};
