use crate::{alphabet::Alphabet, constants::SEQUENCE_MAX_LENGTH};
use fnv::FnvHashSet;
use log::warn;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("line {line}: invalid syntax: {content:?}")]
    Syntax { line: usize, content: String },
    #[error("line {line}: sequence {context:?} has invalid characters")]
    InvalidCharacters { line: usize, context: String },
    #[error("line {line}: sequence exceeds {max} chars: {context:?}")]
    SequenceTooLong {
        line: usize,
        context: String,
        max: usize,
    },
}

/// Single `context -> correction` line of a dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// One-based line number the rule was read from
    pub line: usize,
    pub context: String,
    pub correction: String,
}

impl Rule {
    pub fn context_len(&self) -> usize {
        self.context.chars().count()
    }
}

/// Splits the dictionary into rules without validating them. Blank lines and comments are skipped.
pub fn parse_lines<'i>(
    input: &'i str,
    separator: &'i str,
    comment: &'i str,
) -> impl Iterator<Item = Result<Rule, IngestError>> + 'i {
    input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(move |(_, line)| !line.is_empty() && !line.starts_with(comment))
        .map(move |(line, content)| match content.split_once(separator) {
            Some((context, correction))
                if !context.trim().is_empty() && !correction.trim().is_empty() =>
            {
                Ok(Rule {
                    line,
                    context: context.trim().to_owned(),
                    correction: correction.trim().to_owned(),
                })
            }
            _ => Err(IngestError::Syntax {
                line,
                content: content.to_owned(),
            }),
        })
}

/// Parses and validates a dictionary. Duplicate sequences are skipped with a warning, keeping the first occurrence.
pub fn parse_rules(
    input: &str,
    alphabet: &Alphabet,
    separator: &str,
    comment: &str,
) -> Result<Vec<Rule>, IngestError> {
    let mut seen = FnvHashSet::default();
    let mut rules = Vec::new();

    for rule in parse_lines(input, separator, comment) {
        let rule = rule?;

        if seen.contains(&rule.context) {
            warn!(
                "line {}: ignoring duplicate sequence {:?}",
                rule.line, rule.context
            );
            continue;
        }

        // The trailing character is the trigger and gets checked when building the trie
        if !rule.context.chars().rev().skip(1).all(|c| alphabet.contains(c)) {
            return Err(IngestError::InvalidCharacters {
                line: rule.line,
                context: rule.context,
            });
        }

        if rule.context_len() > SEQUENCE_MAX_LENGTH {
            return Err(IngestError::SequenceTooLong {
                line: rule.line,
                context: rule.context,
                max: SEQUENCE_MAX_LENGTH,
            });
        }

        seen.insert(rule.context.clone());
        rules.push(rule);
    }

    Ok(rules)
}
