use crate::{
    config::ConfigError,
    constants::{
        KC_1, KC_A, KC_MAGIC_0, KC_MINUS, KC_SEMICOLON, KC_SPC, MAGIC_CHAR_COUNT_MAX, MOD_LSFT,
        OUTPUT_FUNC_COUNT_MAX,
    },
};
use fnv::FnvHashMap;

const fn shifted(code: u16) -> u16 {
    MOD_LSFT | code
}

/// Character groups in assignment order. Later groups override earlier ones.
const PUNCTUATION_GROUPS: [(u16, &str); 6] = [
    (KC_SEMICOLON, ";'`,./"),
    (shifted(KC_SEMICOLON), ":\"~<>?"),
    (KC_MINUS, "-=[]\\"),
    (shifted(KC_MINUS), "_+{}|"),
    (KC_1, "1234567890"),
    (shifted(KC_1), "!@#$%^&*()"),
];

/// Mapping between the characters of a dictionary and the triecodes understood by the keyboard runtime.
#[derive(Debug, Clone)]
pub struct Alphabet {
    triecodes: FnvHashMap<char, u16>,
    characters: FnvHashMap<u16, char>,
    output_funcs: FnvHashMap<char, u8>,
    wordbreak: char,
    magic_count: usize,
}

impl Alphabet {
    pub fn new(
        magic_chars: &str,
        output_func_chars: &str,
        wordbreak: char,
    ) -> Result<Self, ConfigError> {
        let magic_count = magic_chars.chars().count();
        if magic_count > MAGIC_CHAR_COUNT_MAX {
            return Err(ConfigError::TooManyMagicChars {
                count: magic_count,
                max: MAGIC_CHAR_COUNT_MAX,
            });
        }

        let output_func_count = output_func_chars.chars().count();
        if output_func_count > OUTPUT_FUNC_COUNT_MAX {
            return Err(ConfigError::TooManyOutputFunctions {
                count: output_func_count,
                max: OUTPUT_FUNC_COUNT_MAX,
            });
        }

        let mut triecodes = FnvHashMap::default();

        for (start, chars) in PUNCTUATION_GROUPS {
            triecodes.extend(chars.chars().zip(start..));
        }

        triecodes.extend(magic_chars.chars().zip(KC_MAGIC_0..));
        triecodes.insert(wordbreak, KC_SPC);
        triecodes.extend(('a'..='z').zip(KC_A..));

        let characters = triecodes.iter().map(|(c, code)| (*code, *c)).collect();
        let output_funcs = output_func_chars.chars().zip(1..).collect();

        Ok(Self {
            triecodes,
            characters,
            output_funcs,
            wordbreak,
            magic_count,
        })
    }

    pub fn triecode(&self, character: char) -> Option<u16> {
        self.triecodes.get(&character).copied()
    }

    pub fn character(&self, triecode: u16) -> Option<char> {
        self.characters.get(&triecode).copied()
    }

    pub fn contains(&self, character: char) -> bool {
        self.triecodes.contains_key(&character)
    }

    /// Output function code (1..=7) associated with the given trailing correction character
    pub fn output_func(&self, character: char) -> Option<u8> {
        self.output_funcs.get(&character).copied()
    }

    pub fn wordbreak(&self) -> char {
        self.wordbreak
    }

    pub fn magic_count(&self) -> usize {
        self.magic_count
    }
}
