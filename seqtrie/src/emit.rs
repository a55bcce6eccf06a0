//! Rendering of compiled data as a C header for the keyboard firmware

use crate::compile::SequenceTransformData;
use crate::constants::{GENERATOR_VERSION, KC_MAGIC_0};
use core::fmt::{self, Display, Write as _};
use std::io::Write as _;
use std::path::Path;
use tempfile::NamedTempFile;

const INDENT: &str = "    ";
const TRIE_LINE_WIDTH: usize = 135;
const COMPLETIONS_LINE_WIDTH: usize = 100;

/// C header containing the compiled tables. Holds no timestamps so that identical input renders identically.
pub struct Header<'d> {
    data: &'d SequenceTransformData,
}

impl<'d> Header<'d> {
    pub fn new(data: &'d SequenceTransformData) -> Self {
        Self { data }
    }
}

pub fn render_header(data: &SequenceTransformData) -> String {
    Header::new(data).to_string()
}

impl Display for Header<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data;

        f.write_str("// SPDX-License-Identifier: GPL-2.0-or-later\n")?;
        f.write_str("// Generated by seqtrie, do not edit.\n\n")?;
        f.write_str("#pragma once\n\n")?;

        f.write_str("// Sequence Transformation dictionary with longest match semantics\n")?;
        writeln!(f, "// Dictionary ({} entries):", data.rules.len())?;

        let width = data.max_sequence.chars().count();
        for rule in data.rules.iter() {
            writeln!(
                f,
                "//    {:<width$} -> {}",
                rule.context,
                rule.correction.replace('\\', "\\ [escape]"),
                width = width
            )?;
        }

        writeln!(f, "\n#define {}", GENERATOR_VERSION)?;
        writeln!(f, "#define SPECIAL_KEY_TRIECODE_0 {:#06X}", KC_MAGIC_0)?;
        writeln!(
            f,
            "#define SEQUENCE_MIN_LENGTH {} // \"{}\"",
            data.min_sequence.chars().count(),
            data.min_sequence
        )?;
        writeln!(
            f,
            "#define SEQUENCE_MAX_LENGTH {} // \"{}\"",
            data.max_sequence.chars().count(),
            data.max_sequence
        )?;
        writeln!(f, "#define COMPLETION_MAX_LENGTH {}", data.max_completion_len)?;
        writeln!(f, "#define MAX_BACKSPACES {}", data.max_backspaces)?;
        writeln!(f, "#define DICTIONARY_SIZE {}", data.dictionary_size())?;
        writeln!(f, "#define COMPLETIONS_SIZE {}", data.completions_size())?;
        writeln!(f, "#define SEQUENCE_TRANSFORM_COUNT {}\n", data.magic_count)?;

        f.write_str(
            "static const uint16_t sequence_transform_data[DICTIONARY_SIZE] PROGMEM = {\n",
        )?;
        let words: Vec<String> = data.trie.iter().map(|w| hex(*w as usize, 4)).collect();
        write_wrapped(f, &words, TRIE_LINE_WIDTH)?;
        f.write_str("\n};\n\n")?;

        f.write_str("static const uint8_t sequence_transform_completions_data[COMPLETIONS_SIZE] PROGMEM = {\n")?;
        let bytes: Vec<String> = data.completions.iter().map(|b| hex(*b as usize, 2)).collect();
        write_wrapped(f, &bytes, COMPLETIONS_LINE_WIDTH)?;
        f.write_str("\n};\n")
    }
}

fn hex(value: usize, digits: usize) -> String {
    format!("0x{:0digits$X}", value, digits = digits)
}

/// Writes a comma separated list, breaking lines greedily before they exceed `width`
fn write_wrapped(f: &mut fmt::Formatter<'_>, items: &[String], width: usize) -> fmt::Result {
    let mut line = String::from(INDENT);

    for (i, item) in items.iter().enumerate() {
        let separator = if i + 1 < items.len() { "," } else { "" };
        let token_len = item.len() + separator.len();

        if line.len() > INDENT.len() {
            if line.len() + 1 + token_len > width {
                f.write_str(&line)?;
                f.write_char('\n')?;
                line = String::from(INDENT);
            } else {
                line.push(' ');
            }
        }

        line.push_str(item);
        line.push_str(separator);
    }

    f.write_str(&line)
}

/// Writes `content` to `path` unless the file already holds exactly this content.
/// Returns whether the file was written. The content is first written to a temporary
/// file next to the target which then replaces it, so a failure never leaves a truncated file.
pub fn write_if_changed(path: impl AsRef<Path>, content: &str) -> std::io::Result<bool> {
    let path = path.as_ref();

    if let Ok(existing) = std::fs::read_to_string(path) {
        if existing == content {
            return Ok(false);
        }
    }

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(directory)?;
    file.write_all(content.as_bytes())?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(true)
}
