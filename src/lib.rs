//! Work-session approval lifecycle for a job marketplace.
//!
//! A worker opens a session against an accepted application; the employer
//! approves the start; the worker starts and ends the work; the employer
//! approves the end and the daily payment becomes final. [`lifecycle`] holds
//! the state machine, [`summary`] the per-scope aggregates, [`store`] the
//! store contract with an in-process implementation, and [`api`] the client
//! for the remote REST backend.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod store;
pub mod summary;
pub mod tracker;
pub mod ui;
pub mod view;

pub use error::{Result, WorkTrackError};
