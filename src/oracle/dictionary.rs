use anyhow::{Context, Result};
use fst::{Automaton, IntoStreamer, Set, SetBuilder, Streamer};
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sorted word set stored as a finite state transducer.
pub struct Dictionary {
    set: Set<Vec<u8>>,
}

impl Dictionary {
    /// Load `<language>.dict` from the data directory, bootstrapping it from
    /// the embedded word list when it has not been installed yet.
    pub fn load_in(data_dir: &Path, language: &str) -> Result<Self> {
        let dict_path = Self::path_in(data_dir, language);

        if !dict_path.exists() {
            info!(language, path = %dict_path.display(), "installing embedded word list");
            std::fs::create_dir_all(data_dir).context("Failed to create data directory")?;
            Self::build_from_words(&embedded_words(language), &dict_path)?;
        }

        Self::load_from_path(&dict_path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut bytes = Vec::new();
        File::open(path)
            .with_context(|| format!("Failed to open dictionary: {}", path.display()))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read dictionary: {}", path.display()))?;

        let set = Set::new(bytes).context("Failed to parse dictionary")?;
        debug!(path = %path.display(), words = set.len(), "dictionary loaded");

        Ok(Self { set })
    }

    /// Build an in-memory dictionary without touching the filesystem.
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        sorted.sort();
        sorted.dedup();

        let set = Set::from_iter(sorted).context("Failed to build dictionary")?;
        Ok(Self { set })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        results
    }

    /// Every word whose length (in chars) is within `slack` of `len`.
    ///
    /// Walks the whole set, so callers keep this for short words only.
    pub fn words_near_length(&self, len: usize, slack: usize) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self.set.stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = std::str::from_utf8(key) {
                if word.chars().count().abs_diff(len) <= slack {
                    results.push(word.to_string());
                }
            }
        }

        results
    }

    /// Write a sorted, deduplicated FST built from `words` to `output_path`.
    pub fn build_from_words(words: &[String], output_path: &Path) -> Result<usize> {
        let mut sorted_words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        sorted_words.sort();
        sorted_words.dedup();

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create dictionary: {}", output_path.display()))?;

        let mut builder =
            SetBuilder::new(BufWriter::new(file)).context("Failed to create FST builder")?;

        for word in &sorted_words {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }

        builder.finish().context("Failed to finalize dictionary")?;

        Ok(sorted_words.len())
    }

    pub fn path_in(data_dir: &Path, language: &str) -> PathBuf {
        data_dir.join(format!("{}.dict", language))
    }
}

/// Small bootstrap list so the editor works before a full dictionary is
/// downloaded.
fn embedded_words(language: &str) -> Vec<String> {
    const ENGLISH: &[&str] = &[
        "the", "be", "to", "of", "and", "a", "in", "that", "have", "has", "had", "i", "it",
        "for", "not", "on", "with", "he", "as", "you", "do", "at", "this", "but", "his", "by",
        "from", "they", "we", "say", "her", "she", "or", "an", "will", "my", "one", "all",
        "would", "there", "their", "what", "so", "up", "out", "if", "about", "who", "get",
        "which", "go", "me", "when", "make", "can", "like", "time", "no", "just", "him", "know",
        "take", "people", "into", "year", "your", "good", "some", "could", "them", "see",
        "other", "than", "then", "now", "look", "only", "come", "its", "over", "think", "also",
        "back", "after", "use", "two", "how", "our", "work", "first", "well", "way", "even",
        "new", "want", "because", "any", "these", "give", "day", "most", "us", "is", "are",
        "was", "were", "cat", "dog", "text", "editor", "word", "words", "file", "line", "open",
        "save", "close", "edit", "spell", "check", "spelling", "hello", "world",
    ];

    match language {
        "en_US" | "en_GB" => ENGLISH.iter().map(|s| s.to_string()).collect(),
        _ => ENGLISH[..10].iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_and_load_dictionary() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("test.dict");

        let words = vec!["hello".to_string(), "World".to_string(), "hello".to_string()];
        let count = Dictionary::build_from_words(&words, &dict_path).unwrap();
        assert_eq!(count, 2);

        let dict = Dictionary::load_from_path(&dict_path).unwrap();
        assert!(dict.contains("hello"));
        assert!(dict.contains("world"));
        assert!(!dict.contains("notfound"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_load_in_bootstraps_embedded_list() {
        let dir = tempdir().unwrap();
        let dict = Dictionary::load_in(dir.path(), "en_US").unwrap();

        assert!(dict.contains("cat"));
        assert!(!dict.contains("teh"));
        assert!(Dictionary::path_in(dir.path(), "en_US").exists());
    }

    #[test]
    fn test_prefix_and_length_queries() {
        let dict = Dictionary::from_words(["cat", "car", "cart", "dog"]).unwrap();

        assert_eq!(dict.words_with_prefix("ca"), vec!["car", "cart", "cat"]);
        assert_eq!(dict.words_near_length(3, 0), vec!["car", "cat", "dog"]);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.dict");
        std::fs::write(&path, b"not an fst").unwrap();
        assert!(Dictionary::load_from_path(&path).is_err());
    }
}
