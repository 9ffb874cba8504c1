//! Parser configuration
//!
//! Every field has a default, so a JSON config file only needs the keys it changes:
//! ```text
//! { "max_depth": 64, "mismatch": "resync" }
//! ```

use crate::error::CompileError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What the parser does when an exact terminal inside a production is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchRecovery {
    /// Report it and consume the offending token in place of the expected one
    #[default]
    Consume,
    /// Report it, then drop the offending token if the expected one comes next;
    /// otherwise consume nothing and treat the terminal as inserted
    Resync,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Nesting limit. Every block and every expression, including each
    /// parenthesized one, costs one level; unary minus chains cost none.
    pub max_depth: usize,
    pub mismatch: MismatchRecovery,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_depth: 256,
            mismatch: MismatchRecovery::Consume,
        }
    }
}

impl ParserConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CompileError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
