use std::fs;
use std::path::{Path, PathBuf};

use phlang_language::lexer::{BlockCommentPolicy, LexerOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codegen::{DEFAULT_INDENT_WIDTH, Prelude};

/// Pipeline settings. Every field is optional in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerOptions {
    /// Refuse to generate code when semantic analysis reports anything.
    pub strict: bool,
    pub block_comments: BlockCommentPolicy,
    pub prelude: Prelude,
    pub indent_width: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            block_comments: BlockCommentPolicy::Permissive,
            prelude: Prelude::Inline,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Hindi mabasa ang config na {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Hindi wastong config na {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CompilerOptions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn lexer_options(&self) -> LexerOptions {
        LexerOptions {
            block_comments: self.block_comments,
        }
    }
}
