//! Walks an encoded table the way the keyboard runtime does to recover every rule stored in it

use crate::alphabet::Alphabet;
use crate::constants::{
    BACKSPACES_MASK, BACKSPACES_SHIFT, OUTPUT_FUNC_MASK, OUTPUT_FUNC_SHIFT, OUTPUT_LENGTH_MASK,
    TRIE_BRANCH_BIT, TRIE_MATCH_BIT,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("table ends unexpectedly at word {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("unknown triecode {code:#06X} at word {offset}")]
    UnknownTriecode { code: u16, offset: usize },
    #[error("entry at word {offset} is empty")]
    EmptyEntry { offset: usize },
    #[error("link at word {offset} points backwards to {target}")]
    BackwardLink { offset: usize, target: usize },
    #[error("completion of entry at word {offset} lies outside of the completion pool")]
    CompletionOutOfRange { offset: usize },
}

/// Rule as recovered from an encoded table
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DecodedMatch {
    pub context: String,
    pub backspaces: u8,
    pub output_func: u8,
    pub output: String,
}

pub struct TableReader<'a> {
    trie: &'a [u16],
    completions: &'a [u8],
    alphabet: &'a Alphabet,
}

impl<'a> TableReader<'a> {
    pub fn new(trie: &'a [u16], completions: &'a [u8], alphabet: &'a Alphabet) -> Self {
        Self {
            trie,
            completions,
            alphabet,
        }
    }

    /// Recovers all matches in table order
    pub fn decode(&self) -> Result<Vec<DecodedMatch>, DecodeError> {
        let mut matches = Vec::new();

        if !self.trie.is_empty() {
            self.visit(0, &mut Vec::new(), &mut matches)?;
        }

        Ok(matches)
    }

    fn word(&self, offset: usize) -> Result<u16, DecodeError> {
        self.trie
            .get(offset)
            .copied()
            .ok_or(DecodeError::UnexpectedEnd { offset })
    }

    /// Reads the entry at `offset`, `path` holds the triecodes leading to it
    fn visit(
        &self,
        offset: usize,
        path: &mut Vec<u16>,
        matches: &mut Vec<DecodedMatch>,
    ) -> Result<(), DecodeError> {
        let mut position = offset;
        let mut word = self.word(position)?;

        if word & TRIE_MATCH_BIT != 0 {
            let completion_offset = self.word(position + 1)? as usize;
            matches.push(self.read_match(offset, word, completion_offset, path)?);
            position += 2;

            if word & TRIE_BRANCH_BIT == 0 {
                return Ok(());
            }

            word = self.word(position)?;
        }

        if word == 0 {
            return Err(DecodeError::EmptyEntry { offset });
        }

        let depth = path.len();

        if word & TRIE_BRANCH_BIT != 0 {
            loop {
                let code = self.word(position)? & !TRIE_BRANCH_BIT;
                if code == 0 {
                    break;
                }

                let target = self.word(position + 1)? as usize;
                if target <= offset {
                    return Err(DecodeError::BackwardLink {
                        offset: position + 1,
                        target,
                    });
                }

                path.push(code);
                self.visit(target, path, matches)?;
                path.truncate(depth);
                position += 2;
            }
        } else {
            loop {
                let code = self.word(position)?;
                position += 1;

                if code == 0 {
                    break;
                }

                path.push(code);
            }

            // The child entry directly follows the chain
            self.visit(position, path, matches)?;
            path.truncate(depth);
        }

        Ok(())
    }

    fn read_match(
        &self,
        offset: usize,
        word: u16,
        completion_offset: usize,
        path: &[u16],
    ) -> Result<DecodedMatch, DecodeError> {
        let output_func = ((word >> OUTPUT_FUNC_SHIFT) & OUTPUT_FUNC_MASK) as u8;
        let backspaces = ((word >> BACKSPACES_SHIFT) & BACKSPACES_MASK) as u8;
        let length = (word & OUTPUT_LENGTH_MASK) as usize;

        let output = self
            .completions
            .get(completion_offset..completion_offset + length)
            .ok_or(DecodeError::CompletionOutOfRange { offset })?
            .iter()
            .map(|b| *b as char)
            .collect();

        // The path runs from the trigger backwards
        let context = path
            .iter()
            .rev()
            .map(|code| {
                self.alphabet
                    .character(*code)
                    .ok_or(DecodeError::UnknownTriecode { code: *code, offset })
            })
            .collect::<Result<String, _>>()?;

        Ok(DecodedMatch {
            context,
            backspaces,
            output_func,
            output,
        })
    }
}

#[cfg(test)]
mod does {
    use super::*;

    fn decode(trie: &[u16], completions: &[u8]) -> Result<Vec<DecodedMatch>, DecodeError> {
        let alphabet = Alphabet::new("@", "", ':').unwrap();
        TableReader::new(trie, completions, &alphabet).decode()
    }

    #[test]
    fn read_chain_followed_by_match() {
        let matches = decode(&[0x0100, 0x0004, 0x0000, 0x8001, 0x0000], b"x").unwrap();

        assert_eq!(
            matches,
            vec![DecodedMatch {
                context: "a@".into(),
                backspaces: 0,
                output_func: 0,
                output: "x".into(),
            }]
        );
    }

    #[test]
    fn read_nothing_from_empty_table() {
        assert_eq!(decode(&[], b""), Ok(Vec::new()));
    }

    #[test]
    fn reject_backward_links() {
        assert_eq!(
            decode(&[0x4005, 0x0000, 0x0000], b""),
            Err(DecodeError::BackwardLink {
                offset: 1,
                target: 0
            })
        );
    }

    #[test]
    fn reject_truncated_chain() {
        assert_eq!(
            decode(&[0x0005], b""),
            Err(DecodeError::UnexpectedEnd { offset: 1 })
        );
    }

    #[test]
    fn reject_completion_beyond_pool() {
        assert_eq!(
            decode(&[0x8003, 0x0000], b"ab"),
            Err(DecodeError::CompletionOutOfRange { offset: 0 })
        );
    }

    #[test]
    fn reject_empty_entry() {
        assert_eq!(
            decode(&[0x0000], b""),
            Err(DecodeError::EmptyEntry { offset: 0 })
        );
    }

    #[test]
    fn reject_unknown_triecode() {
        assert_eq!(
            decode(&[0x00FF, 0x0000, 0x8001, 0x0000], b"x"),
            Err(DecodeError::UnknownTriecode {
                code: 0x00FF,
                offset: 2
            })
        );
    }
}
