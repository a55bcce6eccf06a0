//! Compilation of rule dictionaries into the trie and completion tables used by the keyboard runtime

use crate::{
    alphabet::Alphabet,
    config::ConfigError,
    import::{parse_rules, IngestError, Rule},
};
use fnv::FnvHashMap;
use log::info;
use thiserror::Error;

mod completions;
pub use completions::{CompletionPool, PoolError};

mod encode;
pub use encode::{EncodeError, TrieEncoder};

pub mod reader;
pub use reader::{DecodeError, DecodedMatch, TableReader};

mod resolve;
pub use resolve::{Completion, ResolveError, Resolver};

mod trie;
pub use trie::{Match, MatchId, NodeId, Trie, TrieError, TrieNode};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Trie(#[from] TrieError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("failed to read back the compiled table: {0}")]
    Decode(#[from] DecodeError),
    #[error("dictionary does not contain any rules")]
    EmptyDictionary,
    #[error("compiled table does not reproduce sequence {context:?}: {reason}")]
    Verification { context: String, reason: String },
}

/// Compiled dictionary along with the figures the runtime is configured with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceTransformData {
    /// Encoded trie, `DICTIONARY_SIZE` words
    pub trie: Vec<u16>,
    /// Completion pool, `COMPLETIONS_SIZE` bytes
    pub completions: Vec<u8>,
    /// Rules in dictionary order, without duplicates
    pub rules: Vec<Rule>,
    pub min_sequence: String,
    pub max_sequence: String,
    pub max_completion_len: usize,
    pub max_backspaces: u8,
    pub magic_count: usize,
}

impl SequenceTransformData {
    pub fn dictionary_size(&self) -> usize {
        self.trie.len()
    }

    pub fn completions_size(&self) -> usize {
        self.completions.len()
    }
}

pub struct Compiler<'a> {
    alphabet: &'a Alphabet,
}

impl<'a> Compiler<'a> {
    pub fn new(alphabet: &'a Alphabet) -> Self {
        Self { alphabet }
    }

    /// Parses a dictionary source and compiles it
    pub fn compile_source(
        &self,
        source: &str,
        separator: &str,
        comment: &str,
    ) -> Result<SequenceTransformData, CompileError> {
        let rules = parse_rules(source, self.alphabet, separator, comment)?;
        self.compile(rules)
    }

    pub fn compile(&self, rules: Vec<Rule>) -> Result<SequenceTransformData, CompileError> {
        let (min_sequence, max_sequence) =
            sequence_bounds(&rules).ok_or(CompileError::EmptyDictionary)?;

        // 1. Build the trie over the reversed contexts
        let trie = Trie::build(&rules, self.alphabet)?;

        // 2. Resolve what each rule actually has to do given the rules that fired before it
        let completions = Resolver::new(&trie, self.alphabet).resolve_all()?;

        // 3. Store the outputs in a deduplicated pool
        let pool = CompletionPool::new(completions.iter().map(|c| c.output.as_str()))?;

        // 4. Serialize the trie
        let table = TrieEncoder::new(&trie, &completions, &pool).encode()?;

        // 5. Verify that every rule is readable and yields its completion
        self.verify(&trie, &completions, &table, pool.data())?;

        let max_backspaces = completions
            .iter()
            .map(|c| c.backspaces)
            .max()
            .unwrap_or_default();

        info!(
            "compiled {} rules into {} table words and {} completion bytes",
            rules.len(),
            table.len(),
            pool.len()
        );

        Ok(SequenceTransformData {
            trie: table,
            max_completion_len: pool.max_len(),
            completions: pool.into_data(),
            rules,
            min_sequence,
            max_sequence,
            max_backspaces,
            magic_count: self.alphabet.magic_count(),
        })
    }

    fn verify(
        &self,
        trie: &Trie,
        completions: &[Completion],
        table: &[u16],
        pool: &[u8],
    ) -> Result<(), CompileError> {
        let decoded: FnvHashMap<String, DecodedMatch> = TableReader::new(table, pool, self.alphabet)
            .decode()?
            .into_iter()
            .map(|m| (m.context.clone(), m))
            .collect();

        if decoded.len() != trie.match_count() {
            return Err(CompileError::Verification {
                context: String::new(),
                reason: format!(
                    "table holds {} sequences instead of {}",
                    decoded.len(),
                    trie.match_count()
                ),
            });
        }

        for (id, rule) in trie.matches() {
            let expected = &completions[id.index()];
            let fail = |reason: &str| CompileError::Verification {
                context: rule.context.clone(),
                reason: reason.to_owned(),
            };

            let found = decoded.get(&rule.context).ok_or_else(|| fail("not found"))?;

            if found.backspaces != expected.backspaces {
                return Err(fail("backspaces differ"));
            } else if found.output_func != expected.output_func {
                return Err(fail("output function differs"));
            } else if found.output != expected.output.as_str() {
                return Err(fail("output differs"));
            }
        }

        Ok(())
    }
}

/// Shortest and longest contexts, the first rule wins ties
fn sequence_bounds(rules: &[Rule]) -> Option<(String, String)> {
    let shortest = rules.iter().min_by_key(|r| r.context_len())?;
    let longest = rules.iter().rev().max_by_key(|r| r.context_len())?;

    Some((shortest.context.clone(), longest.context.clone()))
}
