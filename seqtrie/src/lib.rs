//! Compiler for sequence transformation dictionaries.
//!
//! Each dictionary line maps a typed key sequence to the text it should turn into. The compiler
//! stores the sequences reversed in a trie, works out what each rule has to do on screen given the
//! rules that already fired while its sequence was typed, and packs everything into a table of
//! 16-bit words plus a shared pool of completion bytes which fit the few kilobytes a keyboard
//! firmware can spare.

pub mod alphabet;
pub mod compile;
pub mod config;
pub mod constants;
pub mod emit;
pub mod import;

pub use alphabet::Alphabet;
pub use compile::{CompileError, Compiler, SequenceTransformData};
pub use config::{Config, ConfigError};

/// Compiles a dictionary source using the alphabet and tokens of the given configuration
pub fn compile(source: &str, config: &Config) -> Result<SequenceTransformData, CompileError> {
    let alphabet = config.alphabet()?;

    Compiler::new(&alphabet).compile_source(source, &config.separator_str, &config.comment_str)
}
