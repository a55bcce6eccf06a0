//! Compiler configuration as read from the JSON configuration file

use crate::alphabet::Alphabet;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("incorrect config: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("more than {max} ({count}) output_func_chars were listed")]
    TooManyOutputFunctions { count: usize, max: usize },
    #[error("more than {max} ({count}) magic_chars were listed")]
    TooManyMagicChars { count: usize, max: usize },
    #[error("wordbreak_char must be exactly one character, got {0:?}")]
    InvalidWordbreak(String),
    #[error("config value {0} must not be empty")]
    EmptyToken(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub magic_chars: String,
    pub output_func_chars: String,
    pub wordbreak_char: String,
    pub comment_str: String,
    pub separator_str: String,
    pub rules_file_name: PathBuf,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;

        if config.comment_str.is_empty() {
            return Err(ConfigError::EmptyToken("comment_str"));
        } else if config.separator_str.is_empty() {
            return Err(ConfigError::EmptyToken("separator_str"));
        }

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        Self::from_json(&json)
    }

    pub fn wordbreak(&self) -> Result<char, ConfigError> {
        let mut chars = self.wordbreak_char.chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConfigError::InvalidWordbreak(self.wordbreak_char.clone())),
        }
    }

    pub fn alphabet(&self) -> Result<Alphabet, ConfigError> {
        Alphabet::new(&self.magic_chars, &self.output_func_chars, self.wordbreak()?)
    }

    /// Location of the rules file, which is relative to the directory of the config file
    pub fn rules_path(&self, config_path: impl AsRef<Path>) -> PathBuf {
        match config_path.as_ref().parent() {
            Some(directory) => directory.join(&self.rules_file_name),
            None => self.rules_file_name.clone(),
        }
    }
}
