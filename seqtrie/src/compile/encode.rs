//! Serialization of the resolved trie into the flat table of 16-bit words read by the runtime.
//!
//! Every visited node becomes one table entry, emitted in depth-first pre-order:
//!
//! - match nodes start with two words: `MATCH | BRANCH? | func:3 | backspaces:4 | length:7` and the pool offset
//! - a node with a single child stores the triecodes of the whole run of single-child, match-less descendants
//!   terminated by zero. The entry of the node ending the run follows immediately.
//! - a node with multiple children stores `(triecode, offset)` pairs in ascending triecode order, the first
//!   triecode flagged with the branch bit, terminated by zero.

use super::completions::CompletionPool;
use super::resolve::Completion;
use super::trie::{NodeId, Trie};
use crate::constants::{
    BACKSPACES_MASK, BACKSPACES_SHIFT, OUTPUT_FUNC_MASK, OUTPUT_FUNC_SHIFT, OUTPUT_LENGTH_MASK,
    TRIE_BRANCH_BIT, TRIE_MATCH_BIT,
};
use log::info;
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("the sequence table is too large, an entry at word {offset} exceeds the 64K word limit; try reducing the dictionary")]
    TableOverflow { offset: usize },
    #[error("completion {output:?} is not stored in the completion pool")]
    MissingCompletion { output: String },
    #[error("completion {output:?} does not fit into a match entry")]
    FieldOverflow { output: String },
    #[error("trie node {node} is linked from a branch but has no table entry")]
    UnplacedEntry { node: usize },
}

#[derive(Debug)]
enum Shape {
    Leaf,
    Chain { codes: SmallVec<[u16; 8]> },
    Branch { children: SmallVec<[(u16, NodeId); 4]> },
}

#[derive(Debug)]
struct TableEntry {
    header: Option<[u16; 2]>,
    shape: Shape,
}

impl TableEntry {
    fn size(&self) -> usize {
        let header = self.header.map_or(0, |h| h.len());

        header
            + match &self.shape {
                Shape::Leaf => 0,
                Shape::Chain { codes } => codes.len() + 1,
                Shape::Branch { children } => children.len() * 2 + 1,
            }
    }
}

pub struct TrieEncoder<'a> {
    trie: &'a Trie,
    completions: &'a [Completion],
    pool: &'a CompletionPool,
}

impl<'a> TrieEncoder<'a> {
    /// `completions` has to be indexed by the match ids of `trie`
    pub fn new(trie: &'a Trie, completions: &'a [Completion], pool: &'a CompletionPool) -> Self {
        Self {
            trie,
            completions,
            pool,
        }
    }

    pub fn encode(&self) -> Result<Vec<u16>, EncodeError> {
        // 1. Decide the shape of every visited node in emission order
        let entries = self.collect_entries()?;

        // 2. Assign offsets now that all sizes are known
        let mut offsets: Vec<Option<u16>> = vec![None; self.trie.node_count()];
        let mut position = 0;

        for (node, entry) in entries.iter() {
            offsets[node.index()] = Some(position as u16);
            position += entry.size();

            if position > u16::MAX as usize {
                return Err(EncodeError::TableOverflow { offset: position });
            }
        }

        // 3. Emit words, resolving branch links
        let mut table = Vec::with_capacity(position);

        for (_, entry) in entries.iter() {
            if let Some(header) = entry.header {
                table.extend(header);
            }

            match &entry.shape {
                Shape::Leaf => {}
                Shape::Chain { codes } => {
                    table.extend(codes.iter().copied());
                    table.push(0);
                }
                Shape::Branch { children } => {
                    for (i, (code, child)) in children.iter().enumerate() {
                        let flag = if i == 0 { TRIE_BRANCH_BIT } else { 0 };
                        table.push(code | flag);
                        table.push(link(&offsets, child.index())?);
                    }
                    table.push(0);
                }
            }
        }

        info!(
            "encoded {} trie nodes into {} entries ({} words)",
            self.trie.node_count(),
            entries.len(),
            table.len()
        );

        Ok(table)
    }

    fn collect_entries(&self) -> Result<Vec<(NodeId, TableEntry)>, EncodeError> {
        let mut entries = Vec::new();
        let mut stack = vec![self.trie.root()];

        while let Some(id) = stack.pop() {
            let node = self.trie.node(id);

            let header = match node.terminal {
                Some(terminal) => Some(self.match_words(
                    &self.completions[terminal.index()],
                    !node.children.is_empty(),
                )?),
                None => None,
            };

            let shape = match node.only_child() {
                Some((code, child)) => {
                    let mut codes: SmallVec<[u16; 8]> = smallvec![code];
                    let mut next = child;

                    // Collapse the run of single-child nodes without a match
                    while let (None, Some((code, child))) = (
                        self.trie.node(next).terminal,
                        self.trie.node(next).only_child(),
                    ) {
                        codes.push(code);
                        next = child;
                    }

                    stack.push(next);
                    Shape::Chain { codes }
                }
                None if node.children.is_empty() => Shape::Leaf,
                None => {
                    let children: SmallVec<[(u16, NodeId); 4]> =
                        node.children.iter().map(|(c, n)| (*c, *n)).collect();

                    // Reverse so that the lowest triecode is emitted first
                    stack.extend(children.iter().rev().map(|(_, n)| *n));
                    Shape::Branch { children }
                }
            };

            entries.push((id, TableEntry { header, shape }));
        }

        Ok(entries)
    }

    fn match_words(
        &self,
        completion: &Completion,
        has_children: bool,
    ) -> Result<[u16; 2], EncodeError> {
        let offset = self.pool.offset_for(&completion.output).ok_or_else(|| {
            EncodeError::MissingCompletion {
                output: completion.output.to_string(),
            }
        })?;

        pack_match(completion, has_children)
            .map(|code| [code, offset])
            .ok_or_else(|| EncodeError::FieldOverflow {
                output: completion.output.to_string(),
            })
    }
}

/// Offset of the entry of a branch child, each of which starts an entry of its own
fn link(offsets: &[Option<u16>], node: usize) -> Result<u16, EncodeError> {
    offsets
        .get(node)
        .copied()
        .flatten()
        .ok_or(EncodeError::UnplacedEntry { node })
}

/// Packs the first word of a match entry, returns `None` if a field exceeds its bit width
fn pack_match(completion: &Completion, has_children: bool) -> Option<u16> {
    let func = completion.output_func as u16;
    let backspaces = completion.backspaces as u16;
    let length = completion.output.len();

    if func > OUTPUT_FUNC_MASK
        || backspaces > BACKSPACES_MASK
        || length > OUTPUT_LENGTH_MASK as usize
    {
        return None;
    }

    let mut code = TRIE_MATCH_BIT;

    if has_children {
        code |= TRIE_BRANCH_BIT;
    }

    code |= func << OUTPUT_FUNC_SHIFT;
    code |= backspaces << BACKSPACES_SHIFT;
    code |= length as u16;

    Some(code)
}
