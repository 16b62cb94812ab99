pub mod dictionary;
pub mod suggestions;

use crate::error::OracleError;
use crate::Config;
use anyhow::Context;
use dashmap::DashMap;
use dictionary::Dictionary;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info};

/// Word knowledge consumed by the annotator. Callers pass lowercase words.
///
/// Implementations must tolerate concurrent read-only queries.
pub trait DictionaryOracle: Send + Sync {
    fn is_known(&self, word: &str) -> bool;

    /// Replacement candidates, best first. May be empty.
    fn suggest(&self, word: &str) -> Vec<String>;
}

impl<T: DictionaryOracle + ?Sized> DictionaryOracle for &T {
    fn is_known(&self, word: &str) -> bool {
        (**self).is_known(word)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        (**self).suggest(word)
    }
}

impl<T: DictionaryOracle + ?Sized> DictionaryOracle for Box<T> {
    fn is_known(&self, word: &str) -> bool {
        (**self).is_known(word)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        (**self).suggest(word)
    }
}

impl<T: DictionaryOracle + ?Sized> DictionaryOracle for Arc<T> {
    fn is_known(&self, word: &str) -> bool {
        (**self).is_known(word)
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        (**self).suggest(word)
    }
}

/// Stand-in used when no dictionary could be loaded: every word is known,
/// so nothing gets flagged and editing carries on.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl DictionaryOracle for Unavailable {
    fn is_known(&self, _word: &str) -> bool {
        true
    }

    fn suggest(&self, _word: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Entries kept in the lookup cache before it is emptied and refilled.
pub const DEFAULT_CACHE_CAPACITY: usize = 50_000;

/// Main dictionary plus the user's personal words, with a shared
/// membership cache.
pub struct Lexicon {
    dictionary: Dictionary,
    personal_words: RwLock<HashSet<String>>,
    personal_path: Option<PathBuf>,
    max_suggestions: usize,
    cache: DashMap<String, bool>,
    cache_capacity: usize,
}

impl Lexicon {
    pub fn new(dictionary: Dictionary, max_suggestions: usize) -> Self {
        Self {
            dictionary,
            personal_words: RwLock::new(HashSet::new()),
            personal_path: None,
            max_suggestions,
            cache: DashMap::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// Cap the lookup cache. Long sessions see an open-ended stream of typos,
    /// so the cache is emptied whenever it reaches `capacity`.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self.cache.clear();
        self
    }

    pub fn load(config: &Config) -> Result<Self, OracleError> {
        let data_dir = Config::data_dir().ok_or_else(|| {
            error!("no data directory for dictionaries");
            OracleError::Unavailable(config.language.clone())
        })?;
        Self::load_in(config, &data_dir)
    }

    /// Like [`Lexicon::load`], reading dictionaries from `data_dir`.
    pub fn load_in(config: &Config, data_dir: &Path) -> Result<Self, OracleError> {
        let dictionary = Dictionary::load_in(data_dir, &config.language)
            .map_err(|e| {
                error!(language = %config.language, "failed to load dictionary: {:#}", e);
                OracleError::Unavailable(config.language.clone())
            })?;

        let mut lexicon = Self::new(dictionary, config.max_suggestions);
        if let Some(path) = &config.personal_dictionary {
            lexicon = lexicon.with_personal_dictionary(path)?;
        }

        info!(
            language = %config.language,
            words = lexicon.dictionary.len(),
            personal = lexicon.personal_count(),
            "lexicon ready"
        );
        Ok(lexicon)
    }

    /// Read one word per line; blank lines and `#` comments are skipped.
    pub fn with_personal_dictionary(mut self, path: &Path) -> Result<Self, OracleError> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read personal dictionary: {}", path.display()))?;
            let words = self
                .personal_words
                .get_mut()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            for line in content.lines() {
                let word = line.trim();
                if !word.is_empty() && !word.starts_with('#') {
                    words.insert(word.to_lowercase());
                }
            }
        }
        self.personal_path = Some(path.to_path_buf());
        self.cache.clear();
        Ok(self)
    }

    /// Accept `word` from now on and persist it to the personal dictionary.
    pub fn add_personal_word(&self, word: &str) -> Result<(), OracleError> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return Ok(());
        }

        if let Some(path) = &self.personal_path {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{}", word)?;
        }

        debug!(%word, "added to personal dictionary");
        self.personal_words
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(word.clone());
        self.remember(word, true);
        Ok(())
    }

    pub fn personal_count(&self) -> usize {
        self.personal_words
            .read()
            .map(|words| words.len())
            .unwrap_or_default()
    }

    fn lookup(&self, word: &str) -> bool {
        let personal = self
            .personal_words
            .read()
            .map(|words| words.contains(word))
            .unwrap_or(false);
        personal || self.dictionary.contains(word)
    }

    fn remember(&self, word: String, known: bool) {
        if self.cache.len() >= self.cache_capacity {
            debug!(entries = self.cache.len(), "lookup cache full, clearing");
            self.cache.clear();
        }
        self.cache.insert(word, known);
    }
}

impl DictionaryOracle for Lexicon {
    fn is_known(&self, word: &str) -> bool {
        if let Some(hit) = self.cache.get(word) {
            return *hit;
        }
        let known = self.lookup(word);
        self.remember(word.to_string(), known);
        known
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        suggestions::generate(word, &self.dictionary, self.max_suggestions)
    }
}

/// Load the configured lexicon, or fall back to [`Unavailable`] so a broken
/// dictionary never stops the editor.
pub fn open(config: &Config) -> Arc<dyn DictionaryOracle> {
    or_unavailable(Lexicon::load(config))
}

/// [`open`] with dictionaries read from `data_dir`.
pub fn open_in(config: &Config, data_dir: &Path) -> Arc<dyn DictionaryOracle> {
    or_unavailable(Lexicon::load_in(config, data_dir))
}

fn or_unavailable(loaded: Result<Lexicon, OracleError>) -> Arc<dyn DictionaryOracle> {
    match loaded {
        Ok(lexicon) => Arc::new(lexicon),
        Err(e) => {
            error!("spellcheck disabled: {}", e);
            Arc::new(Unavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lexicon(words: &[&str]) -> Lexicon {
        Lexicon::new(Dictionary::from_words(words.iter().copied()).unwrap(), 5)
    }

    #[test]
    fn test_known_words_and_cache() {
        let lex = lexicon(&["cat", "the"]);
        assert!(lex.is_known("cat"));
        assert!(!lex.is_known("teh"));
        // Second lookup is served from the cache.
        assert!(!lex.is_known("teh"));
        assert_eq!(lex.cache.len(), 2);
    }

    #[test]
    fn test_personal_dictionary_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("personal.txt");
        fs::write(&path, "# my words\nRustacean\n\n  ferris  \n").unwrap();

        let lex = lexicon(&["cat"]).with_personal_dictionary(&path).unwrap();
        assert!(lex.is_known("rustacean"));
        assert!(lex.is_known("ferris"));
        assert!(!lex.is_known("# my words"));
        assert_eq!(lex.personal_count(), 2);
    }

    #[test]
    fn test_add_personal_word_persists_and_invalidates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("personal.txt");

        let lex = lexicon(&["cat"]).with_personal_dictionary(&path).unwrap();
        assert!(!lex.is_known("teh"));

        lex.add_personal_word("Teh").unwrap();
        assert!(lex.is_known("teh"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "teh\n");
    }

    #[test]
    fn test_unavailable_knows_everything() {
        assert!(Unavailable.is_known("zzzz"));
        assert!(Unavailable.suggest("zzzz").is_empty());
    }

    #[test]
    fn test_cache_stays_within_capacity() {
        let lex = lexicon(&["cat"]).with_cache_capacity(3);
        for word in ["aa", "bb", "cc", "dd", "ee", "ff", "gg"] {
            assert!(!lex.is_known(word));
            assert!(lex.cache.len() <= 3);
        }
        // Answers stay correct after the cache is emptied.
        assert!(lex.is_known("cat"));
        assert!(!lex.is_known("aa"));
    }

    #[test]
    fn test_corrupt_dictionary_falls_back_to_unavailable() {
        let dir = tempdir().unwrap();
        fs::write(Dictionary::path_in(dir.path(), "en_US"), b"not an fst at all").unwrap();
        let config = Config::default();

        assert!(matches!(
            Lexicon::load_in(&config, dir.path()),
            Err(OracleError::Unavailable(ref lang)) if lang == "en_US"
        ));

        let oracle = open_in(&config, dir.path());
        assert!(oracle.is_known("zzzz"));
        assert!(oracle.suggest("zzzz").is_empty());

        let annotator = crate::Annotator::new(oracle);
        assert!(annotator.annotate("teh qqq zzzz").is_empty());
        assert_eq!(annotator.suggestions_for("teh qqq", 1), None);
    }

    #[test]
    fn test_load_in_bootstraps_missing_dictionary() {
        let dir = tempdir().unwrap();
        let config = Config::default();
        let lex = Lexicon::load_in(&config, dir.path()).unwrap();
        assert!(lex.is_known("the"));
        assert!(!lex.is_known("teh"));
    }

    #[test]
    fn test_suggest_uses_dictionary() {
        let lex = lexicon(&["the", "cat"]);
        assert_eq!(lex.suggest("cta"), vec!["cat".to_string()]);
    }
}
