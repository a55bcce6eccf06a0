//! Resolution of the on-screen effect of each rule, taking shorter rules which already fired into account.
//!
//! A rule's target assumes an empty buffer. In practice, while its context is being typed, the runtime
//! already applied the longest matching rule at every keystroke. The resolver replays those keystrokes
//! to find out what is actually on screen right before the trigger character is pressed, and reduces the
//! rule to the minimal edit (backspaces plus literal output) that turns this buffer into the target.

use super::trie::{MatchId, Trie};
use crate::alphabet::Alphabet;
use crate::constants::{BACKSPACES_MAX, COMPLETION_MAX_LENGTH};
use log::trace;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("sequence {context:?} requires {backspaces} backspaces, at most {max} are supported")]
    TooManyBackspaces {
        context: String,
        backspaces: usize,
        max: usize,
    },
    #[error("sequence {context:?} outputs {length} characters, at most {max} are supported")]
    OutputTooLong {
        context: String,
        length: usize,
        max: usize,
    },
    #[error("resolving sequence {context:?} depends on its own result")]
    Cycle { context: String },
}

/// Edit performed by the runtime when a rule fires
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Completion {
    pub backspaces: u8,
    pub output_func: u8,
    pub output: SmolStr,
}

#[derive(Debug, Clone)]
enum Resolution {
    Unresolved,
    InProgress,
    Resolved(Completion),
}

pub struct Resolver<'t> {
    trie: &'t Trie,
    alphabet: &'t Alphabet,
    states: Vec<Resolution>,
}

impl<'t> Resolver<'t> {
    pub fn new(trie: &'t Trie, alphabet: &'t Alphabet) -> Self {
        Self {
            trie,
            alphabet,
            states: vec![Resolution::Unresolved; trie.match_count()],
        }
    }

    /// Resolves every match of the trie. The result is indexed by [`MatchId::index`].
    pub fn resolve_all(mut self) -> Result<Vec<Completion>, ResolveError> {
        let trie = self.trie;
        trie.matches().map(|(id, _)| self.resolve(id)).collect()
    }

    /// Returns the completion of the given match, computing it on first access
    pub fn resolve(&mut self, id: MatchId) -> Result<Completion, ResolveError> {
        match &self.states[id.index()] {
            Resolution::Resolved(completion) => return Ok(completion.clone()),
            Resolution::InProgress => {
                return Err(ResolveError::Cycle {
                    context: self.trie.get(id).context.clone(),
                })
            }
            Resolution::Unresolved => {}
        }

        self.states[id.index()] = Resolution::InProgress;
        let completion = self.complete(id)?;
        self.states[id.index()] = Resolution::Resolved(completion.clone());

        Ok(completion)
    }

    fn complete(&mut self, id: MatchId) -> Result<Completion, ResolveError> {
        let trie = self.trie;
        let rule = trie.get(id);
        let wordbreak = self.alphabet.wordbreak();
        let context: Vec<char> = rule.context.chars().collect();

        // Replay everything but the trigger character
        let replay = context.split_last().map_or(&[][..], |(_, rest)| rest);
        let mut typed = Vec::with_capacity(context.len());
        let mut expected = Vec::with_capacity(context.len());

        for &character in replay {
            typed.push(character);
            expected.push(character);

            let found = match self.longest_match(&expected)? {
                Some(completion) => Some(completion),
                None => self.longest_match(&typed)?,
            };

            if let Some(completion) = found {
                let retained = expected
                    .len()
                    .saturating_sub(completion.backspaces as usize + 1);
                expected.truncate(retained);
                // Spaces reach the runtime buffer as word breaks
                expected.extend(
                    completion
                        .output
                        .chars()
                        .map(|c| if c == ' ' { wordbreak } else { c }),
                );
            }
        }

        if expected.first() == Some(&wordbreak) {
            expected.remove(0);
        }

        let target: Vec<char> = rule.target.chars().collect();
        let common = expected
            .iter()
            .zip(target.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let backspaces = expected.len() - common;
        if backspaces > BACKSPACES_MAX {
            return Err(ResolveError::TooManyBackspaces {
                context: rule.context.clone(),
                backspaces,
                max: BACKSPACES_MAX,
            });
        }

        let length = target.len() - common;
        if length > COMPLETION_MAX_LENGTH {
            return Err(ResolveError::OutputTooLong {
                context: rule.context.clone(),
                length,
                max: COMPLETION_MAX_LENGTH,
            });
        }

        let output: String = target[common..]
            .iter()
            .map(|&c| if c == wordbreak { ' ' } else { c })
            .collect();

        trace!(
            "resolved {:?}: screen {:?}, {} backspaces, output {:?}",
            rule.context,
            expected.iter().collect::<String>(),
            backspaces,
            output
        );

        Ok(Completion {
            backspaces: backspaces as u8,
            output_func: rule.output_func,
            output: output.into(),
        })
    }

    /// Finds the longest rule whose context is a suffix of the buffer, resolving every rule passed on the way
    fn longest_match(&mut self, buffer: &[char]) -> Result<Option<Completion>, ResolveError> {
        let trie = self.trie;
        let mut node = trie.root();
        let mut longest = None;

        for &character in buffer.iter().rev() {
            let child = self
                .alphabet
                .triecode(character)
                .and_then(|code| trie.child(node, code));

            node = match child {
                Some(child) => child,
                None => break,
            };

            if let Some(id) = trie.node(node).terminal {
                longest = Some(self.resolve(id)?);
            }
        }

        Ok(longest)
    }
}
