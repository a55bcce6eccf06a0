//! Trie over the reversed rule contexts

use crate::{alphabet::Alphabet, import::Rule};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrieError {
    #[error("sequence {context:?} contains {character:?} which has no triecode")]
    UnknownCharacter { context: String, character: char },
    #[error("sequence {context:?} is already present in the trie")]
    DuplicateContext { context: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchId(usize);

impl MatchId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Rule attached to the trie node at which its reversed context ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub context: String,
    /// Literal text the rule is supposed to produce, before overlap resolution
    pub target: String,
    pub output_func: u8,
}

#[derive(Debug, Default)]
pub struct TrieNode {
    /// Children keyed and ordered by triecode
    pub children: BTreeMap<u16, NodeId>,
    pub terminal: Option<MatchId>,
}

impl TrieNode {
    /// Returns the child if there is exactly one
    pub fn only_child(&self) -> Option<(u16, NodeId)> {
        let mut children = self.children.iter();

        match (children.next(), children.next()) {
            (Some((code, child)), None) => Some((*code, *child)),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    matches: Vec<Match>,
}

impl Trie {
    pub fn build(rules: &[Rule], alphabet: &Alphabet) -> Result<Self, TrieError> {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
            matches: Vec::with_capacity(rules.len()),
        };

        for rule in rules {
            trie.insert(rule, alphabet)?;
        }

        Ok(trie)
    }

    fn insert(&mut self, rule: &Rule, alphabet: &Alphabet) -> Result<(), TrieError> {
        let mut node = self.root();

        for character in rule.context.chars().rev() {
            let code = alphabet
                .triecode(character)
                .ok_or_else(|| TrieError::UnknownCharacter {
                    context: rule.context.clone(),
                    character,
                })?;

            node = match self.nodes[node.0].children.get(&code) {
                Some(child) => *child,
                None => {
                    let child = NodeId(self.nodes.len());
                    self.nodes.push(TrieNode::default());
                    self.nodes[node.0].children.insert(code, child);
                    child
                }
            };
        }

        if self.nodes[node.0].terminal.is_some() {
            return Err(TrieError::DuplicateContext {
                context: rule.context.clone(),
            });
        }

        let (target, output_func) = split_output_func(&rule.correction, alphabet);
        let id = MatchId(self.matches.len());
        self.matches.push(Match {
            context: rule.context.clone(),
            target: target.to_owned(),
            output_func,
        });
        self.nodes[node.0].terminal = Some(id);

        Ok(())
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.0]
    }

    pub fn child(&self, id: NodeId, code: u16) -> Option<NodeId> {
        self.nodes[id.0].children.get(&code).copied()
    }

    pub fn get(&self, id: MatchId) -> &Match {
        &self.matches[id.0]
    }

    /// Matches in insertion order, i.e. in the order of the rules
    pub fn matches(&self) -> impl Iterator<Item = (MatchId, &Match)> {
        self.matches.iter().enumerate().map(|(i, m)| (MatchId(i), m))
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Strips a trailing output function character off a correction
fn split_output_func<'c>(correction: &'c str, alphabet: &Alphabet) -> (&'c str, u8) {
    match correction.char_indices().last() {
        Some((index, last)) => match alphabet.output_func(last) {
            Some(func) => (&correction[..index], func),
            None => (correction, 0),
        },
        None => (correction, 0),
    }
}
