//! Articulatory categories for the English and French phone sets.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::types::{Language, LanguageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhoneCategory {
    Vowel,
    Nasal,
    Plosive,
    Fricative,
    Approximant,
    Affricate,
    NasalVowel,
    SemiVowel,
}

impl PhoneCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PhoneCategory::Vowel => "vowel",
            PhoneCategory::Nasal => "nasal",
            PhoneCategory::Plosive => "plosive",
            PhoneCategory::Fricative => "fricative",
            PhoneCategory::Approximant => "approximant",
            PhoneCategory::Affricate => "affricate",
            PhoneCategory::NasalVowel => "nasal-vowel",
            PhoneCategory::SemiVowel => "semi-vowel",
        }
    }
}

impl Display for PhoneCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use PhoneCategory::*;

const ENGLISH: &[(&str, PhoneCategory)] = &[
    ("dh", Fricative),
    ("ah", Vowel),
    ("ah0", Vowel),
    ("v", Fricative),
    ("ae", Vowel),
    ("l", Approximant),
    ("iy", Vowel),
    ("w", Approximant),
    ("z", Fricative),
    ("f", Fricative),
    ("ih", Vowel),
    ("d", Plosive),
    ("th", Fricative),
    ("eh", Vowel),
    ("n", Nasal),
    ("s", Fricative),
    ("ao", Vowel),
    ("g", Plosive),
    ("jh", Affricate),
    ("k", Plosive),
    ("m", Nasal),
    ("ay", Vowel),
    ("er", Vowel),
    ("ow", Vowel),
    ("r", Approximant),
    ("y", Approximant),
    ("uw", Vowel),
    ("hh", Fricative),
    ("t", Plosive),
    ("p", Plosive),
    ("sh", Fricative),
    ("uh", Vowel),
    ("aa", Vowel),
    ("ng", Nasal),
    ("ey", Vowel),
    ("b", Plosive),
    ("aw", Vowel),
    ("ch", Affricate),
    ("oy", Vowel),
    ("zh", Fricative),
];

// French `au` stays listed even though alignments rewrite it to `oo`.
const FRENCH: &[(&str, PhoneCategory)] = &[
    ("gn", Nasal),
    ("nn", Nasal),
    ("mm", Nasal),
    ("jj", Fricative),
    ("ss", Fricative),
    ("ll", Approximant),
    ("bb", Plosive),
    ("kk", Plosive),
    ("vv", Fricative),
    ("zz", Fricative),
    ("gg", Plosive),
    ("ww", SemiVowel),
    ("pp", Plosive),
    ("ff", Fricative),
    ("ch", Fricative),
    ("rr", Fricative),
    ("yy", Approximant),
    ("dd", Plosive),
    ("tt", Plosive),
    ("ou", Vowel),
    ("ei", Vowel),
    ("ii", Vowel),
    ("au", Vowel),
    ("aa", Vowel),
    ("ai", Vowel),
    ("on", NasalVowel),
    ("an", NasalVowel),
    ("oo", Vowel),
    ("oe", Vowel),
    ("eu", Vowel),
    ("ee", Vowel),
    ("un", NasalVowel),
    ("uu", Vowel),
    ("in", NasalVowel),
    ("uy", Vowel),
];

pub type PhoneTable = HashMap<&'static str, PhoneCategory>;

static ENGLISH_TABLE: Lazy<PhoneTable> = Lazy::new(|| ENGLISH.iter().copied().collect());
static FRENCH_TABLE: Lazy<PhoneTable> = Lazy::new(|| FRENCH.iter().copied().collect());

pub fn english_phones() -> &'static PhoneTable {
    &ENGLISH_TABLE
}

pub fn french_phones() -> &'static PhoneTable {
    &FRENCH_TABLE
}

/// Table for `language`, if one is bundled.
pub fn phone_table(language: &Language) -> Option<&'static PhoneTable> {
    match language.kind() {
        LanguageKind::English => Some(english_phones()),
        LanguageKind::French => Some(french_phones()),
        LanguageKind::Other => None,
    }
}

pub fn category(language: &Language, phone: &str) -> Option<PhoneCategory> {
    phone_table(language)?.get(phone).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_have_expected_sizes() {
        assert_eq!(english_phones().len(), 40);
        assert_eq!(french_phones().len(), 35);
    }

    #[test]
    fn same_symbol_differs_by_language() {
        assert_eq!(category(&Language::en(), "ch"), Some(Affricate));
        assert_eq!(category(&Language::fr(), "ch"), Some(Fricative));
        assert_eq!(category(&Language::fr(), "oo"), Some(Vowel));
        assert_eq!(category(&Language::fr(), "ww"), Some(SemiVowel));
        assert_eq!(category(&Language::fr(), "in"), Some(NasalVowel));
    }

    #[test]
    fn unknown_phones_and_languages_have_no_category() {
        assert_eq!(category(&Language::en(), "SIL"), None);
        assert_eq!(category(&"de".parse::<Language>().unwrap(), "aa"), None);
    }

    #[test]
    fn category_names_are_kebab_case() {
        assert_eq!(NasalVowel.to_string(), "nasal-vowel");
        assert_eq!(
            serde_json::to_string(&SemiVowel).unwrap(),
            "\"semi-vowel\""
        );
    }
}
