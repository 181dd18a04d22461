//! Word supply for Scramble.
//!
//! Rooms don't care where words come from. They ask a [`WordProvider`]
//! for the next [`WordPair`] when a round starts and get back the answer
//! plus a shuffled display form. [`WordList`] is the provider the server
//! ships with: a fixed list (or one loaded from a file) and a uniform
//! character shuffle.

use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Words used when no list file is given.
pub const DEFAULT_WORDS: &[&str] = &[
    "abracadabra",
    "delphi",
    "dinosaur",
    "automaton",
    "python",
    "sleep",
    "thread",
    "posix",
    "windows",
    "ubuntu",
    "oracle",
    "variable",
];

/// Errors that can occur while building a word list.
#[derive(Debug, thiserror::Error)]
pub enum WordsError {
    /// The list has no usable words.
    #[error("word list is empty")]
    Empty,

    /// The list file couldn't be read.
    #[error("failed to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A word and its scrambled display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    /// The answer players must send back, matched exactly.
    pub plain: String,
    /// The permutation shown to players.
    pub scrambled: String,
}

/// Supplies a fresh word pair each time a round starts.
///
/// `scrambled` must be a permutation of `plain`. It will usually differ
/// from `plain`, but an identity shuffle is a legal outcome and callers
/// must not treat it as an error.
pub trait WordProvider: Send + Sync + 'static {
    /// Returns the pair for the next round.
    fn next_pair(&self) -> WordPair;
}

/// Shuffles the characters of `word` uniformly.
///
/// Works on `char`s, not bytes, so multi-byte words stay valid UTF-8.
pub fn scramble<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    chars.shuffle(rng);
    chars.into_iter().collect()
}

/// A fixed list of words, picked uniformly at random.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Builds a list from the given words.
    ///
    /// Surrounding whitespace is trimmed and blank entries are dropped.
    ///
    /// # Errors
    /// Returns [`WordsError::Empty`] if nothing usable is left.
    pub fn new<I, S>(words: I) -> Result<Self, WordsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_owned())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(WordsError::Empty);
        }
        Ok(Self { words })
    }

    /// Loads a list from a file with one word per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WordsError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| WordsError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let list = Self::new(
            contents
                .lines()
                .filter(|line| !line.trim_start().starts_with('#')),
        )?;
        tracing::info!(path = %path.display(), words = list.len(), "word list loaded");
        Ok(list)
    }

    /// Number of words in the list.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always `false`: construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Borrows the words.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Picks a pair using the given RNG. Seed it for reproducible rounds.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> WordPair {
        // `new` guarantees at least one word, so `choose` always hits.
        let plain = self
            .words
            .choose(rng)
            .cloned()
            .unwrap_or_default();
        let scrambled = scramble(&plain, rng);
        WordPair { plain, scrambled }
    }
}

impl Default for WordList {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| (*w).to_owned()).collect(),
        }
    }
}

impl WordProvider for WordList {
    fn next_pair(&self) -> WordPair {
        self.pick(&mut rand::rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sorted(s: &str) -> Vec<char> {
        let mut chars: Vec<char> = s.chars().collect();
        chars.sort_unstable();
        chars
    }

    #[test]
    fn test_scramble_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for word in DEFAULT_WORDS {
            let scrambled = scramble(word, &mut rng);
            assert_eq!(sorted(&scrambled), sorted(word), "{word} -> {scrambled}");
        }
    }

    #[test]
    fn test_scramble_single_char_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(scramble("a", &mut rng), "a");
        assert_eq!(scramble("", &mut rng), "");
    }

    #[test]
    fn test_scramble_keeps_multibyte_chars() {
        let mut rng = StdRng::seed_from_u64(3);
        let scrambled = scramble("ñandú", &mut rng);
        assert_eq!(sorted(&scrambled), sorted("ñandú"));
    }

    #[test]
    fn test_scramble_usually_differs() {
        // Not guaranteed for any single draw, but across many draws of a
        // long word at least one must differ.
        let mut rng = StdRng::seed_from_u64(11);
        let differs = (0..20).any(|_| scramble("abracadabra", &mut rng) != "abracadabra");
        assert!(differs);
    }

    #[test]
    fn test_new_rejects_empty_list() {
        assert!(matches!(WordList::new(Vec::<String>::new()), Err(WordsError::Empty)));
        assert!(matches!(WordList::new(["  ", ""]), Err(WordsError::Empty)));
    }

    #[test]
    fn test_new_trims_and_drops_blanks() {
        let list = WordList::new([" sleep ", "", "posix"]).unwrap();
        assert_eq!(list.words(), ["sleep", "posix"]);
        assert_eq!(list.len(), 2);
        assert!(!list.is_empty());
    }

    #[test]
    fn test_pick_returns_listed_word_and_permutation() {
        let list = WordList::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let pair = list.pick(&mut rng);
            assert!(DEFAULT_WORDS.contains(&pair.plain.as_str()));
            assert_eq!(sorted(&pair.scrambled), sorted(&pair.plain));
        }
    }

    #[test]
    fn test_pick_is_reproducible_with_seed() {
        let list = WordList::default();
        let a = list.pick(&mut StdRng::seed_from_u64(5));
        let b = list.pick(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_next_pair_from_single_word_list() {
        let list = WordList::new(["thread"]).unwrap();
        let pair = list.next_pair();
        assert_eq!(pair.plain, "thread");
        assert_eq!(sorted(&pair.scrambled), sorted("thread"));
    }

    #[test]
    fn test_from_file_skips_comments_and_blanks() {
        let path = std::env::temp_dir().join(format!(
            "scramble-words-{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, "# tech words\nubuntu\n\n  oracle\n#skip\n").unwrap();

        let list = WordList::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(list.words(), ["ubuntu", "oracle"]);
    }

    #[test]
    fn test_from_file_missing_reports_path() {
        let result = WordList::from_file("/definitely/not/here.txt");
        match result {
            Err(WordsError::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.txt"));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
