use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use spellmark::cli::output::{self, MenuChoice, OutputFormat};
use spellmark::{dict, oracle, Annotator, Config, Document, Lexicon, ScanMode, Workspace};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "spellmark")]
#[command(version, about = "Real-time spellcheck annotation for text buffers", long_about = None)]
struct Cli {
    /// Language/dictionary to use (e.g., en_US, en_GB)
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Personal dictionary file
    #[arg(long, global = true)]
    personal_dict: Option<PathBuf>,

    /// Pattern to ignore (regex)
    #[arg(long, global = true)]
    ignore_pattern: Vec<String>,

    /// How misspellings are located (substring, words)
    #[arg(short, long, global = true)]
    mode: Option<ScanMode>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Highlight misspelled words in files
    Check {
        /// Files to check
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Output format (text, json)
        #[arg(short = 'o', long, default_value = "text")]
        format: OutputFormat,

        /// List flagged spans instead of rendering the document
        #[arg(long)]
        list: bool,

        /// Exit with code 0 even if misspellings are found
        #[arg(long)]
        no_fail: bool,
    },
    /// Show replacement suggestions for the word at a character offset
    Suggest {
        file: PathBuf,

        /// Zero-based character offset of the cursor
        #[arg(long)]
        offset: usize,

        /// Output format (text, json)
        #[arg(short = 'o', long, default_value = "text")]
        format: OutputFormat,
    },
    /// Replace the characters in [start, end) with a new word
    Replace {
        file: PathBuf,

        #[arg(long)]
        start: usize,

        #[arg(long)]
        end: usize,

        /// Replacement text
        #[arg(long = "with", value_name = "TEXT")]
        replacement: String,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,
    },
    /// Walk through misspellings and pick replacements from a menu
    Fix { file: PathBuf },
    /// Dictionary management
    Dict {
        #[command(subcommand)]
        action: DictCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DictCommands {
    /// List installed dictionaries
    List,
    /// Download a dictionary
    Download {
        /// Language code (e.g., en_US, en_GB)
        language: String,
    },
    /// Build a dictionary from a local word list (one word per line)
    Build { language: String, wordlist: PathBuf },
    /// Update all dictionaries
    Update,
    /// Show dictionary info
    Info { language: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spellmark", &mut io::stdout());
        return Ok(());
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if cli.no_color {
        colored::control::set_override(false);
    }
    let colored = !cli.no_color;

    let mode = cli.mode;
    let load_config = move || -> Result<Config> {
        let mut config = Config::load(cli.language, cli.personal_dict, cli.ignore_pattern)?;
        if let Some(mode) = mode {
            config.scan_mode = mode;
        }
        Ok(config)
    };

    match command {
        Commands::Check {
            files,
            format,
            list,
            no_fail,
        } => {
            let flagged = check(&files, &load_config()?, colored, format, list)?;
            if flagged > 0 && !no_fail {
                std::process::exit(1);
            }
        }
        Commands::Suggest {
            file,
            offset,
            format,
        } => suggest(&file, offset, &load_config()?, colored, format)?,
        Commands::Replace {
            file,
            start,
            end,
            replacement,
            write,
        } => replace(&file, start, end, &replacement, write)?,
        Commands::Fix { file } => fix(&file, &load_config()?, colored)?,
        Commands::Dict { action } => handle_dict(action)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

fn check(
    files: &[PathBuf],
    config: &Config,
    colored: bool,
    format: OutputFormat,
    list: bool,
) -> Result<usize> {
    let annotator = Annotator::from_config(oracle::open(config), config);

    let mut workspace = Workspace::new();
    let mut paths = Vec::new();
    for path in files {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            continue;
        }
        workspace.open(Document::new(path.display().to_string(), read_text(path)?));
        paths.push(path);
    }

    let total = workspace.refresh_all(&annotator);
    info!(files = workspace.len(), flagged = total, "check complete");

    let annotated = paths.iter().zip(workspace.documents());
    match format {
        OutputFormat::Json => {
            let report: Vec<_> = annotated
                .map(|(path, doc)| (path.as_path(), doc.text(), doc.highlights()))
                .collect();
            output::print_json_report(&report)?;
        }
        OutputFormat::Text => {
            for (path, doc) in annotated {
                output::print_annotation(path, doc.text(), doc.highlights(), colored, format, list)?;
            }
            output::print_check_summary(total, &paths, colored);
        }
    }
    Ok(total)
}

fn suggest(file: &Path, offset: usize, config: &Config, colored: bool, format: OutputFormat) -> Result<()> {
    let text = read_text(file)?;
    let annotator = Annotator::from_config(oracle::open(config), config);

    match annotator.suggestions_for(&text, offset) {
        Some(correction) => output::print_correction(&correction, colored, format)?,
        None if format == OutputFormat::Json => println!("null"),
        None => println!("No misspelled word at offset {}", offset),
    }
    Ok(())
}

fn replace(file: &Path, start: usize, end: usize, replacement: &str, write: bool) -> Result<()> {
    let text = read_text(file)?;
    let spliced = spellmark::annotator::apply_replacement(&text, start, end, replacement);

    if write {
        fs::write(file, &spliced).with_context(|| format!("Failed to write file: {}", file.display()))?;
        debug!(path = %file.display(), "replacement written");
    } else {
        print!("{}", spliced);
    }
    Ok(())
}

fn fix(file: &Path, config: &Config, colored: bool) -> Result<()> {
    let lexicon = Lexicon::load(config)?;
    let annotator = Annotator::from_config(&lexicon, config);

    let mut doc = Document::new(file.display().to_string(), read_text(file)?);
    doc.refresh(&annotator);

    let mut cursor = 0;
    let mut fixed = 0;
    while let Some(correction) = doc.next_correction(&annotator, cursor) {
        let context = output::context_around(doc.text(), correction.span, 30);
        match output::select_replacement(&correction, &context, colored)? {
            MenuChoice::Replace(choice) => {
                if doc.apply(&annotator, &correction, &choice) {
                    fixed += 1;
                    cursor = correction.span.start + choice.chars().count();
                } else {
                    cursor = correction.span.end;
                }
            }
            MenuChoice::Skip => cursor = correction.span.end,
            MenuChoice::AddToDictionary => {
                lexicon.add_personal_word(&correction.word)?;
                doc.refresh(&annotator);
                cursor = correction.span.end;
            }
            MenuChoice::Quit => break,
        }
    }

    if fixed > 0 {
        fs::write(file, doc.text()).with_context(|| format!("Failed to write file: {}", file.display()))?;
    }
    output::print_fix_summary(fixed, file, colored);
    Ok(())
}

fn handle_dict(action: DictCommands) -> Result<()> {
    match action {
        DictCommands::List => dict::manager::list_dictionaries(),
        DictCommands::Download { language } => dict::manager::download_dictionary(&language),
        DictCommands::Build { language, wordlist } => dict::manager::build_from_file(&language, &wordlist),
        DictCommands::Update => dict::manager::update_dictionaries(),
        DictCommands::Info { language } => dict::manager::show_info(&language),
    }
}
