//! Domain layer: pure targeting logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, or `std::process`, and opens no sockets.
//! All functions are synchronous and take data in, returning data out.

pub mod ast;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod matcher;
pub mod nodegroup;
pub mod parser;
pub mod token;

pub use ast::{Leaf, Node};
pub use config::{FleetConfig, apply_config_value, validate_config_key, validate_config_value};
pub use error::{ConfigError, ParseError, ResolveError};
pub use evaluator::{Evaluation, evaluate};
pub use matcher::{MatchContext, MatchSet, MatcherKind, MinionLookup, RangeTable};
pub use nodegroup::{NodegroupDef, Nodegroups};
pub use parser::parse;
pub use token::{Token, tokenize};
