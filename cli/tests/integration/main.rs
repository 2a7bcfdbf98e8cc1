//! Integration tests for fleet CLI
//!
//! These tests spawn the actual binary against fixture key directories and
//! metadata caches built in temp dirs.

mod match_command;
mod validate_command;
