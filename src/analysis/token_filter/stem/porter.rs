//! Porter stemming algorithm implementation.
//!
//! The Porter stemmer applies a series of rewrite rules in five steps:
//! 1. Plurals, -ed/-ing suffixes and terminal y
//! 2. -ational → -ate, -tional → -tion, etc.
//! 3. -icate → -ic, -ative → "", etc.
//! 4. Remove -al, -ance, -ence, etc.
//! 5. Remove final -e and -ll
//!
//! Only ASCII words are rewritten; any other word is returned unchanged so
//! stemming can never fail on arbitrary review text.
//!
//! # Examples
//!
//! ```
//! use review_sentiment::analysis::token_filter::stem::Stemmer;
//! use review_sentiment::analysis::token_filter::stem::porter::PorterStemmer;
//!
//! let stemmer = PorterStemmer::new();
//!
//! assert_eq!(stemmer.stem("running"), "run");
//! assert_eq!(stemmer.stem("wonderful"), "wonder");
//! assert_eq!(stemmer.stem("traditional"), "tradit");
//! ```

use crate::analysis::token_filter::stem::Stemmer;

const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

// Longer suffixes precede the shorter ones they contain.
const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Porter stemming algorithm implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new Porter stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    /// Check if the byte at `pos` acts as a consonant.
    fn is_consonant(word: &[u8], pos: usize) -> bool {
        match word[pos] {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => pos == 0 || !Self::is_consonant(word, pos - 1),
            _ => true,
        }
    }

    /// Calculate the measure of a word (number of VC sequences).
    fn measure(word: &[u8]) -> usize {
        let n = word.len();
        let mut m = 0;
        let mut i = 0;

        // Skip initial consonants
        while i < n && Self::is_consonant(word, i) {
            i += 1;
        }

        while i < n {
            while i < n && !Self::is_consonant(word, i) {
                i += 1;
            }
            if i >= n {
                break;
            }
            m += 1;
            while i < n && Self::is_consonant(word, i) {
                i += 1;
            }
        }

        m
    }

    fn contains_vowel(word: &[u8]) -> bool {
        (0..word.len()).any(|i| !Self::is_consonant(word, i))
    }

    fn ends_with_double_consonant(word: &[u8]) -> bool {
        let n = word.len();
        n >= 2 && word[n - 1] == word[n - 2] && Self::is_consonant(word, n - 1)
    }

    /// Check if word ends with consonant-vowel-consonant, the last not w, x or y.
    fn ends_cvc(word: &[u8]) -> bool {
        let n = word.len();
        n >= 3
            && Self::is_consonant(word, n - 3)
            && !Self::is_consonant(word, n - 2)
            && Self::is_consonant(word, n - 1)
            && !matches!(word[n - 1], b'w' | b'x' | b'y')
    }

    fn stem_of<'a>(word: &'a [u8], suffix: &str) -> &'a [u8] {
        &word[..word.len() - suffix.len()]
    }

    fn replace(word: &mut Vec<u8>, suffix: &str, replacement: &str) {
        word.truncate(word.len() - suffix.len());
        word.extend_from_slice(replacement.as_bytes());
    }

    fn step1a(word: &mut Vec<u8>) {
        if word.ends_with(b"sses") {
            Self::replace(word, "sses", "ss");
        } else if word.ends_with(b"ies") {
            Self::replace(word, "ies", "i");
        } else if word.ends_with(b"s") && !word.ends_with(b"ss") && word.len() > 1 {
            word.pop();
        }
    }

    fn step1b(word: &mut Vec<u8>) {
        if word.ends_with(b"eed") {
            if Self::measure(Self::stem_of(word, "eed")) > 0 {
                word.pop();
            }
            return;
        }

        let removed = if word.ends_with(b"ed") && Self::contains_vowel(Self::stem_of(word, "ed")) {
            Self::replace(word, "ed", "");
            true
        } else if word.ends_with(b"ing") && Self::contains_vowel(Self::stem_of(word, "ing")) {
            Self::replace(word, "ing", "");
            true
        } else {
            false
        };

        if !removed {
            return;
        }

        if word.ends_with(b"at") || word.ends_with(b"bl") || word.ends_with(b"iz") {
            word.push(b'e');
        } else if Self::ends_with_double_consonant(word)
            && !matches!(word.last(), Some(b'l') | Some(b's') | Some(b'z'))
        {
            word.pop();
        } else if Self::measure(word) == 1 && Self::ends_cvc(word) {
            word.push(b'e');
        }
    }

    fn step1c(word: &mut Vec<u8>) {
        if word.ends_with(b"y") && Self::contains_vowel(Self::stem_of(word, "y")) {
            Self::replace(word, "y", "i");
        }
    }

    /// Apply the first matching rule whose stem has a positive measure.
    fn apply_rules(word: &mut Vec<u8>, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if word.ends_with(suffix.as_bytes()) {
                if Self::measure(Self::stem_of(word, suffix)) > 0 {
                    Self::replace(word, suffix, replacement);
                }
                return;
            }
        }
    }

    fn step4(word: &mut Vec<u8>) {
        for suffix in STEP4_SUFFIXES {
            if word.ends_with(suffix.as_bytes()) {
                let stem = Self::stem_of(word, suffix);
                let removable = Self::measure(stem) > 1
                    && (*suffix != "ion" || matches!(stem.last(), Some(b's') | Some(b't')));
                if removable {
                    Self::replace(word, suffix, "");
                }
                return;
            }
        }
    }

    fn step5(word: &mut Vec<u8>) {
        if word.ends_with(b"e") {
            let stem = Self::stem_of(word, "e");
            let m = Self::measure(stem);
            if m > 1 || (m == 1 && !Self::ends_cvc(stem)) {
                word.pop();
            }
        }

        if word.ends_with(b"ll") && Self::measure(word) > 1 {
            word.pop();
        }
    }
}

impl Stemmer for PorterStemmer {
    fn stem(&self, word: &str) -> String {
        if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return word.to_string();
        }

        let mut bytes = word.as_bytes().to_vec();
        Self::step1a(&mut bytes);
        Self::step1b(&mut bytes);
        Self::step1c(&mut bytes);
        Self::apply_rules(&mut bytes, STEP2_RULES);
        Self::apply_rules(&mut bytes, STEP3_RULES);
        Self::step4(&mut bytes);
        Self::step5(&mut bytes);

        // Only ASCII bytes were removed or appended.
        String::from_utf8(bytes).unwrap_or_else(|_| word.to_string())
    }

    fn name(&self) -> &'static str {
        "porter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_porter_stemmer() {
        let stemmer = PorterStemmer::new();

        assert_eq!(stemmer.stem("running"), "run");
        assert_eq!(stemmer.stem("flies"), "fli");
        assert_eq!(stemmer.stem("died"), "di");
        assert_eq!(stemmer.stem("agreed"), "agre");
        assert_eq!(stemmer.stem("disabled"), "disabl");
        assert_eq!(stemmer.stem("measuring"), "measur");
        assert_eq!(stemmer.stem("itemization"), "item");
        assert_eq!(stemmer.stem("sensational"), "sensat");
        assert_eq!(stemmer.stem("traditional"), "tradit");
    }

    #[test]
    fn test_review_vocabulary() {
        let stemmer = PorterStemmer::new();

        assert_eq!(stemmer.stem("works"), "work");
        assert_eq!(stemmer.stem("wonderful"), "wonder");
        assert_eq!(stemmer.stem("terrible"), "terribl");
        assert_eq!(stemmer.stem("happy"), "happi");
        assert_eq!(stemmer.stem("caresses"), "caress");
        assert_eq!(stemmer.stem("hopping"), "hop");
        assert_eq!(stemmer.stem("filing"), "file");
    }

    #[test]
    fn test_non_ascii_passthrough() {
        let stemmer = PorterStemmer::new();

        assert_eq!(stemmer.stem("cafés"), "cafés");
        assert_eq!(stemmer.stem("naïve"), "naïve");
        assert_eq!(stemmer.stem("go"), "go");
    }

    #[test]
    fn test_porter_measure() {
        assert_eq!(PorterStemmer::measure(b"tree"), 0);
        assert_eq!(PorterStemmer::measure(b"trees"), 1);
        assert_eq!(PorterStemmer::measure(b"trouble"), 1);
        assert_eq!(PorterStemmer::measure(b"troubles"), 2);
    }

    #[test]
    fn test_porter_vowel_detection() {
        let word = b"trouble";

        assert!(PorterStemmer::is_consonant(word, 0)); // t
        assert!(PorterStemmer::is_consonant(word, 1)); // r
        assert!(!PorterStemmer::is_consonant(word, 2)); // o
        assert!(!PorterStemmer::is_consonant(word, 3)); // u
        assert!(PorterStemmer::is_consonant(word, 4)); // b
        assert!(PorterStemmer::is_consonant(word, 5)); // l
        assert!(!PorterStemmer::is_consonant(word, 6)); // e
    }
}
