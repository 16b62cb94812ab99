use crate::oracle::dictionary::Dictionary;
use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

// Pinned commit so downloads are reproducible.
const WORDLIST_BASE_URL: &str =
    "https://raw.githubusercontent.com/dwyl/english-words/6e4bc58ad764c3e6df8b5be4048671962c9d6a23";
const WORDLIST_VERSION: &str = "2023.12";

#[derive(Debug, Clone)]
pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub word_count: usize,
    pub size_bytes: u64,
}

pub fn data_dir() -> Result<PathBuf> {
    crate::config::Config::data_dir().context("Failed to get data directory")
}

/// Every `*.dict` file under `data_dir`, sorted by language.
pub fn installed(data_dir: &Path) -> Result<Vec<DictionaryInfo>> {
    if !data_dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("dict") {
            continue;
        }
        let Some(language) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        found.push(describe(language, &path)?);
    }

    found.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(found)
}

fn describe(language: &str, path: &Path) -> Result<DictionaryInfo> {
    let size_bytes = fs::metadata(path)?.len();
    let word_count = Dictionary::load_from_path(path)
        .map(|dict| dict.len())
        .unwrap_or(0);

    Ok(DictionaryInfo {
        language: language.to_string(),
        path: path.to_path_buf(),
        word_count,
        size_bytes,
    })
}

/// Parse a newline-separated word list into dictionary entries.
pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Build `<language>.dict` in `data_dir` from a local word list file.
pub fn build_dictionary(data_dir: &Path, language: &str, wordlist: &Path) -> Result<DictionaryInfo> {
    let content = fs::read_to_string(wordlist)
        .with_context(|| format!("Failed to read word list: {}", wordlist.display()))?;
    install(data_dir, language, &parse_wordlist(&content))
}

fn install(data_dir: &Path, language: &str, words: &[String]) -> Result<DictionaryInfo> {
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;
    let dict_path = Dictionary::path_in(data_dir, language);
    let count = Dictionary::build_from_words(words, &dict_path)?;
    info!(language, words = count, path = %dict_path.display(), "dictionary installed");
    describe(language, &dict_path)
}

pub fn list_dictionaries() -> Result<()> {
    let data_dir = data_dir()?;
    let dictionaries = installed(&data_dir)?;

    if dictionaries.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to download a dictionary.",
            "spellmark dict download en_US".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();
    for dict in &dictionaries {
        println!(
            "  {} {} ({}, {})",
            "✓".green(),
            dict.language.cyan().bold(),
            format!("{} words", dict.word_count).dimmed(),
            format!("{}KB", dict.size_bytes / 1024).dimmed()
        );
    }
    println!();
    println!(
        "Data directory: {}",
        data_dir.display().to_string().dimmed()
    );

    Ok(())
}

pub fn download_dictionary(language: &str) -> Result<()> {
    let wordlist_url = match language {
        "en_US" | "en_GB" => format!("{}/words_alpha.txt", WORDLIST_BASE_URL),
        other => anyhow::bail!(
            "Language '{}' is not supported. Only 'en_US' and 'en_GB' are currently available.",
            other
        ),
    };

    println!(
        "{} dictionary for {} (version: {})...",
        "Downloading".cyan().bold(),
        language.yellow(),
        WORDLIST_VERSION.dimmed()
    );
    println!("Source: {}", wordlist_url.dimmed());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Downloading...");

    debug!(url = %wordlist_url, "fetching word list");
    let response = reqwest::blocking::get(&wordlist_url).context("Failed to download dictionary")?;
    if !response.status().is_success() {
        pb.abandon_with_message("Download failed");
        anyhow::bail!("Failed to download dictionary: HTTP {}", response.status());
    }
    let content = response.text().context("Failed to read dictionary response")?;
    pb.finish_with_message("Download complete");

    println!("{}", "Building dictionary...".cyan());
    let words: Vec<String> = parse_wordlist(&content)
        .into_iter()
        .filter(|w| w.chars().count() > 1 || w == "a" || w == "i")
        .collect();
    println!("Found {} words", words.len().to_string().yellow());

    let dict = install(&data_dir()?, language, &words)?;
    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict.path.display().to_string().cyan()
    );

    Ok(())
}

pub fn build_from_file(language: &str, wordlist: &Path) -> Result<()> {
    let dict = build_dictionary(&data_dir()?, language, wordlist)?;
    println!(
        "{} Built {} ({} words): {}",
        "✓".green().bold(),
        dict.language.cyan().bold(),
        dict.word_count.to_string().yellow(),
        dict.path.display().to_string().dimmed()
    );
    Ok(())
}

pub fn update_dictionaries() -> Result<()> {
    let languages: Vec<String> = installed(&data_dir()?)?
        .into_iter()
        .map(|d| d.language)
        .collect();

    if languages.is_empty() {
        println!("{}", "No dictionaries to update.".yellow());
        return Ok(());
    }

    println!(
        "{} {} {}...",
        "Updating".cyan().bold(),
        languages.len(),
        if languages.len() == 1 { "dictionary" } else { "dictionaries" }
    );
    println!();

    for language in languages {
        download_dictionary(&language)?;
        println!();
    }

    println!("{} All dictionaries updated!", "✓".green().bold());
    Ok(())
}

pub fn show_info(language: &str) -> Result<()> {
    let dict_path = Dictionary::path_in(&data_dir()?, language);

    if !dict_path.exists() {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to download it.",
            format!("spellmark dict download {}", language).cyan()
        );
        return Ok(());
    }

    let info = describe(language, &dict_path)?;
    println!("{}", format!("Dictionary: {}", info.language).bold());
    println!("  Path: {}", info.path.display());
    println!("  Size: {} KB", info.size_bytes / 1024);
    println!("  Words: {}", info.word_count);
    println!("  Version: {}", WORDLIST_VERSION);
    println!("  Format: FST (Finite State Transducer)");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_wordlist() {
        let words = parse_wordlist("# header\nHello\n\n  world \n");
        assert_eq!(words, vec!["hello".to_string(), "world".to_string()]);
    }

    #[test]
    fn test_build_and_list() {
        let dir = tempdir().unwrap();
        let wordlist = dir.path().join("words.txt");
        fs::write(&wordlist, "cat\ndog\ncat\n").unwrap();

        let data = dir.path().join("data");
        let info = build_dictionary(&data, "xx_TEST", &wordlist).unwrap();
        assert_eq!(info.word_count, 2);

        let listed = installed(&data).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].language, "xx_TEST");
    }

    #[test]
    fn test_installed_missing_dir() {
        let dir = tempdir().unwrap();
        assert!(installed(&dir.path().join("nope")).unwrap().is_empty());
    }
}
