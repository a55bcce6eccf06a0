pub const KC_A: u16 = 0x04;
pub const KC_1: u16 = 0x1E;
pub const KC_SPC: u16 = 0x2C;
pub const KC_MINUS: u16 = 0x2D;
pub const KC_SEMICOLON: u16 = 0x33;
pub const MOD_LSFT: u16 = 0x0200;
/// Triecode of the first magic character, subsequent ones count upwards
pub const KC_MAGIC_0: u16 = 0x0100;

/// Set on the first word of a match entry
pub const TRIE_MATCH_BIT: u16 = 0x8000;
/// Set on a match word whose node has children, and on the first code of a branch list
pub const TRIE_BRANCH_BIT: u16 = 0x4000;

pub const OUTPUT_FUNC_SHIFT: u16 = 11;
pub const BACKSPACES_SHIFT: u16 = 7;
pub const OUTPUT_FUNC_MASK: u16 = 0b111;
pub const BACKSPACES_MASK: u16 = 0b1111;
pub const OUTPUT_LENGTH_MASK: u16 = 0b111_1111;

pub const OUTPUT_FUNC_COUNT_MAX: usize = 7;
pub const MAGIC_CHAR_COUNT_MAX: usize = 256;
pub const SEQUENCE_MAX_LENGTH: usize = 127;
pub const BACKSPACES_MAX: usize = 15;
pub const COMPLETION_MAX_LENGTH: usize = 127;

pub const GENERATOR_VERSION: &str = "SEQUENCE_TRANSFORM_GENERATOR_VERSION_0_1_0";
