//! Deduplicated byte pool holding all completion outputs

use fnv::FnvHashMap;
use log::debug;
use smol_str::SmolStr;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("completion pool grew to {size} bytes which exceeds the 16-bit limit, try reducing the dictionary")]
    Overflow { size: usize },
    #[error("completion {output:?} contains non-ASCII characters")]
    NonAscii { output: String },
}

#[derive(Debug)]
pub struct CompletionPool {
    data: Vec<u8>,
    offsets: FnvHashMap<SmolStr, u16>,
    max_len: usize,
}

impl CompletionPool {
    /// Places outputs longest-first so that shorter ones have a chance to reuse bytes of already stored ones
    pub fn new<'o>(outputs: impl IntoIterator<Item = &'o str>) -> Result<Self, PoolError> {
        // Lexicographic order breaks ties between equally long outputs
        let unique: BTreeSet<&str> = outputs.into_iter().collect();
        let mut outputs: Vec<&str> = unique.into_iter().collect();
        outputs.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut data = Vec::new();
        let mut offsets = FnvHashMap::default();
        let mut max_len = 0;

        for output in outputs {
            if !output.is_ascii() {
                return Err(PoolError::NonAscii {
                    output: output.to_owned(),
                });
            }

            max_len = max_len.max(output.len());

            let offset = match find(&data, output.as_bytes()) {
                Some(offset) => {
                    debug!("{:?} found at {}", output, offset);
                    offset
                }
                None => {
                    let offset = data.len();
                    debug!("{:?} added at {}", output, offset);
                    data.extend_from_slice(output.as_bytes());
                    offset
                }
            };

            if data.len() > u16::MAX as usize {
                return Err(PoolError::Overflow { size: data.len() });
            }

            offsets.insert(SmolStr::new(output), offset as u16);
        }

        Ok(Self {
            data,
            offsets,
            max_len,
        })
    }

    pub fn offset_for(&self, output: &str) -> Option<u16> {
        self.offsets.get(output).copied()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length of the longest output stored in the pool
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }

    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
