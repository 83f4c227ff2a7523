//! Application services: result mapping and target resolution.

pub mod error;
pub mod mapper;
pub mod ports;
pub mod target;
