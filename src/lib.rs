//! Prompt Trainer · evaluation engine and API.
//!
//! The engine modules (`validator`, `scoring`, `feedback`, `evaluator`,
//! `progress`) are pure; `state`, `logic` and `routes` wire them into an
//! axum service with per-user progress and history.

pub mod config;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod feedback;
pub mod grader;
pub mod logic;
pub mod progress;
pub mod protocol;
pub mod routes;
pub mod rubric;
pub mod scoring;
pub mod seeds;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod validator;
