//! Rule-set parsing for keyremap
//!
//! This crate reads KDL rule-set files into a [`keyremap_core::RemapTable`]
//! plus global settings, reporting every unparseable key with its location.

mod error;
mod model;
mod parser;

pub use error::{ConfigError, InvalidKeyInfo, KeyPosition, SourceLocation};
pub use model::*;
pub use parser::{parse_config, parse_config_str};
