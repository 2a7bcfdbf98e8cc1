//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the accepted-key directory,
//! the on-disk metadata cache and the configuration file.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod cache;
pub mod config;
pub mod pki;
