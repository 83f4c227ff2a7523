//! Resolves action results to view templates and dispatches requests to them.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

mod util;
