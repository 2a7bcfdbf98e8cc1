//! Command implementations

pub mod config;
pub mod parse;
pub mod target;
pub mod validate;
pub mod version;
