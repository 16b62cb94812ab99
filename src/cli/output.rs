use crate::{Correction, Span, SuggestionSet};
use anyhow::{Context, Result};
use colored::*;
use dialoguer::theme::{ColorfulTheme, SimpleTheme, Theme};
use dialoguer::Select;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonSpan<'a> {
    start: usize,
    end: usize,
    word: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonAnnotation<'a> {
    file: String,
    flagged: usize,
    spans: Vec<JsonSpan<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonCorrection<'a> {
    word: &'a str,
    start: usize,
    end: usize,
    suggestions: Vec<&'a str>,
    has_suggestions: bool,
}

/// What the user picked from a suggestion menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Replace(String),
    Skip,
    AddToDictionary,
    Quit,
}

/// Render `text` with every flagged char styled red and underlined. Without
/// color, flagged runs are wrapped in brackets.
pub fn render_highlighted(text: &str, spans: &[Span], colored_output: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut flagged = vec![false; chars.len()];
    for span in spans {
        let end = span.end.min(chars.len());
        for mark in flagged.iter_mut().take(end).skip(span.start) {
            *mark = true;
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let run_flag = flagged[i];
        let run_start = i;
        while i < chars.len() && flagged[i] == run_flag {
            i += 1;
        }
        let run: String = chars[run_start..i].iter().collect();

        if !run_flag {
            out.push_str(&run);
        } else if colored_output {
            out.push_str(&run.red().underline().to_string());
        } else {
            out.push('[');
            out.push_str(&run);
            out.push(']');
        }
    }
    out
}

pub fn print_annotation(
    file_path: &Path,
    text: &str,
    spans: &[Span],
    colored_output: bool,
    format: OutputFormat,
    list_only: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json_report(&[(file_path, text, spans)]),
        OutputFormat::Text if list_only => {
            print_span_list(file_path, text, spans, colored_output);
            Ok(())
        }
        OutputFormat::Text => {
            print_file_header(file_path, colored_output);
            println!("{}", render_highlighted(text, spans, colored_output));
            Ok(())
        }
    }
}

fn print_file_header(file_path: &Path, colored_output: bool) {
    let file_name = file_path.display().to_string();
    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }
}

fn print_span_list(file_path: &Path, text: &str, spans: &[Span], colored_output: bool) {
    if spans.is_empty() {
        return;
    }
    print_file_header(file_path, colored_output);

    for span in spans {
        let range = format!("{}..{}", span.start, span.end);
        let word = span.slice(text).unwrap_or_default();
        if colored_output {
            println!("  {} {}", range.blue().bold(), word.red().bold());
        } else {
            println!("  {} {}", range, word);
        }
    }
}

fn json_annotation<'a>(file_path: &Path, text: &'a str, spans: &[Span]) -> JsonAnnotation<'a> {
    JsonAnnotation {
        file: file_path.display().to_string(),
        flagged: spans.len(),
        spans: spans
            .iter()
            .map(|span| JsonSpan {
                start: span.start,
                end: span.end,
                word: span.slice(text).unwrap_or_default(),
            })
            .collect(),
    }
}

/// One JSON document for a whole check run: a bare object for a single
/// file, an array of objects otherwise.
pub fn render_json_report(files: &[(&Path, &str, &[Span])]) -> Result<String> {
    let mut entries: Vec<JsonAnnotation> = files
        .iter()
        .map(|(path, text, spans)| json_annotation(path, text, spans))
        .collect();

    let rendered = if entries.len() == 1 {
        serde_json::to_string_pretty(&entries.remove(0))
    } else {
        serde_json::to_string_pretty(&entries)
    };
    rendered.context("Failed to serialize annotation")
}

pub fn print_json_report(files: &[(&Path, &str, &[Span])]) -> Result<()> {
    println!("{}", render_json_report(files)?);
    Ok(())
}

pub fn print_correction(correction: &Correction, colored_output: bool, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let output = JsonCorrection {
            word: &correction.word,
            start: correction.span.start,
            end: correction.span.end,
            suggestions: correction.suggestions.entries(),
            has_suggestions: !correction.suggestions.is_none_available(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize suggestions")?
        );
        return Ok(());
    }

    let range = format!("{}..{}", correction.span.start, correction.span.end);
    if colored_output {
        println!("{} {}", correction.word.red().bold(), range.blue());
    } else {
        println!("{} {}", correction.word, range);
    }

    for entry in correction.suggestions.entries() {
        if colored_output && !correction.suggestions.is_none_available() {
            println!("  {} {}", "→".dimmed(), entry.green());
        } else {
            println!("  → {}", entry);
        }
    }
    Ok(())
}

/// Show the suggestion menu for `correction` and wait for a pick.
pub fn select_replacement(correction: &Correction, context: &str, colored_output: bool) -> Result<MenuChoice> {
    let candidates = correction.suggestions.candidates();
    let mut items: Vec<String> = match &correction.suggestions {
        SuggestionSet::Candidates(list) => list.clone(),
        SuggestionSet::NoneAvailable => vec![crate::NO_SUGGESTIONS_LABEL.to_string()],
    };
    let skip = items.len();
    items.push("Skip".to_string());
    items.push("Add to dictionary".to_string());
    items.push("Quit".to_string());

    let prompt = format!("{} in \"{}\"", correction.word, context);
    let colorful = ColorfulTheme::default();
    let theme: &dyn Theme = if colored_output { &colorful } else { &SimpleTheme };

    let picked = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact_opt()
        .context("Failed to read menu selection")?;

    Ok(match picked {
        None => MenuChoice::Quit,
        Some(i) if i < candidates.len() => MenuChoice::Replace(candidates[i].clone()),
        Some(i) if i == skip + 1 => MenuChoice::AddToDictionary,
        Some(i) if i == skip + 2 => MenuChoice::Quit,
        Some(_) => MenuChoice::Skip,
    })
}

/// A window of up to `radius` chars either side of `span`.
pub fn context_around(text: &str, span: Span, radius: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = span.start.saturating_sub(radius);
    let end = (span.end + radius).min(chars.len());
    if start >= end {
        return String::new();
    }

    let window: String = chars[start..end]
        .iter()
        .map(|&c| if c == '\n' { ' ' } else { c })
        .collect();

    match (start > 0, end < chars.len()) {
        (true, true) => format!("...{}...", window),
        (true, false) => format!("...{}", window),
        (false, true) => format!("{}...", window),
        (false, false) => window,
    }
}

pub fn print_check_summary(total_flagged: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_flagged == 0 {
        if colored {
            println!("{}", "✓ No misspellings found!".green().bold());
        } else {
            println!("✓ No misspellings found!");
        }
        return;
    }

    let noun = if total_flagged == 1 { "misspelling" } else { "misspellings" };
    let file_noun = if files.len() == 1 { "file" } else { "files" };
    if colored {
        println!(
            "{} {} {} found in {} {}",
            "✗".red().bold(),
            total_flagged.to_string().red().bold(),
            noun,
            files.len(),
            file_noun
        );
    } else {
        println!("✗ {} {} found in {} {}", total_flagged, noun, files.len(), file_noun);
    }
}

pub fn print_fix_summary(total_fixed: usize, file: &Path, colored: bool) {
    println!();
    let noun = if total_fixed == 1 { "correction" } else { "corrections" };
    let line = format!("{} {} applied to {}", total_fixed, noun, file.display());
    if colored {
        println!("{} {}", "✓".green().bold(), line);
    } else {
        println!("✓ {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_brackets_without_color() {
        let spans = [Span::new(2, 5)];
        assert_eq!(render_highlighted("I has a cat", &spans, false), "I [has] a cat");
    }

    #[test]
    fn test_render_merges_overlapping_spans() {
        let spans = [Span::new(0, 3), Span::new(2, 6), Span::new(8, 20)];
        assert_eq!(render_highlighted("abcdefghij", &spans, false), "[abcdef]gh[ij]");
    }

    #[test]
    fn test_render_colored_wraps_in_escape_codes() {
        colored::control::set_override(true);
        let rendered = render_highlighted("teh cat", &[Span::new(0, 3)], true);
        colored::control::unset_override();
        assert!(rendered.contains("\u{1b}["));
        assert!(rendered.ends_with(" cat"));
    }

    #[test]
    fn test_context_around() {
        let text = "the quick brown fox jumps";
        assert_eq!(context_around(text, Span::new(10, 15), 4), "...ick brown fox...");
        assert_eq!(context_around(text, Span::new(0, 3), 100), text);
        assert_eq!(context_around("ab\ncd", Span::new(3, 5), 2), "...b cd");
    }

    #[test]
    fn test_json_report_single_file_is_object() {
        let spans = [Span::new(0, 3)];
        let rendered = render_json_report(&[(Path::new("a.txt"), "teh cat", &spans[..])]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["file"], "a.txt");
        assert_eq!(json["spans"][0]["word"], "teh");
    }

    #[test]
    fn test_json_report_many_files_is_one_array() {
        let first = [Span::new(0, 3)];
        let rendered = render_json_report(&[
            (Path::new("a.txt"), "teh cat", &first[..]),
            (Path::new("b.txt"), "the cat", &[][..]),
        ])
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        let files = json.as_array().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0]["flagged"], 1);
        assert_eq!(files[1]["file"], "b.txt");
        assert_eq!(files[1]["flagged"], 0);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
