//! Markcard - renders question/answer Markdown documents as themed cards
//!
//! Entry point for the command line tool. Handles argument parsing,
//! logging initialization, and driving one render session. The rendered
//! card is emitted as a JSON draw-command dump a host can rasterize.

use anyhow::{bail, Context};
use std::path::PathBuf;

use markcard::config::{Config, MAX_SOURCE_SIZE};
use markcard::session::{CardDocument, RenderSession, SurfaceInfo};
use markcard::theme::ThemeRegistry;
use markcard::utils::text;
use markcard::{MarkdownProcessor, RecordingSurface};

/// Application name for logging
const APP_NAME: &str = "markcard";

/// Parsed command line flags
#[derive(Debug, Default)]
struct Flags {
    question: Option<String>,
    answer: Option<String>,
    question_file: Option<PathBuf>,
    answer_file: Option<PathBuf>,
    theme: Option<String>,
    watermark: bool,
    encoded: bool,
    plain: bool,
    output: Option<PathBuf>,
    width: Option<f32>,
    height: Option<f32>,
    pixel_ratio: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    log::info!("Starting Markcard");

    let flags = parse_args();
    run(flags)
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,markcard=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    let mut flags = Flags::default();

    let mut i = 1;
    while i < args.len() {
        let take_value = |i: &mut usize| -> String {
            if *i + 1 < args.len() {
                *i += 1;
                args[*i].clone()
            } else {
                eprintln!("Error: {} requires a value", args[*i]);
                std::process::exit(1);
            }
        };

        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-q" | "--question" => flags.question = Some(take_value(&mut i)),
            "-a" | "--answer" => flags.answer = Some(take_value(&mut i)),
            "--question-file" => flags.question_file = Some(PathBuf::from(take_value(&mut i))),
            "--answer-file" => flags.answer_file = Some(PathBuf::from(take_value(&mut i))),
            "-t" | "--theme" => flags.theme = Some(take_value(&mut i)),
            "-w" | "--watermark" => flags.watermark = true,
            "--encoded" => flags.encoded = true,
            "--plain" => flags.plain = true,
            "-o" | "--output" => flags.output = Some(PathBuf::from(take_value(&mut i))),
            "--width" => flags.width = parse_dimension(&take_value(&mut i), "--width"),
            "--height" => flags.height = parse_dimension(&take_value(&mut i), "--height"),
            "--dpr" => flags.pixel_ratio = parse_dimension(&take_value(&mut i), "--dpr"),
            arg => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    flags
}

fn parse_dimension(value: &str, flag: &str) -> Option<f32> {
    match value.parse::<f32>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            eprintln!("Error: {} expects a number, got '{}'", flag, value);
            std::process::exit(1);
        }
    }
}

fn run(flags: Flags) -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_else(|err| {
        log::warn!("falling back to default configuration: {err}");
        Config::default()
    });

    let question = resolve_field(&flags.question, &flags.question_file, flags.encoded)?;
    let answer = resolve_field(&flags.answer, &flags.answer_file, flags.encoded)?;

    if question.is_empty() && answer.is_empty() {
        bail!("nothing to render: provide --question/--answer text or files");
    }

    if flags.plain {
        let processor = MarkdownProcessor::new();
        if !question.is_empty() {
            println!("{}", processor.plain_text(&question));
        }
        if !answer.is_empty() {
            println!("{}", processor.plain_text(&answer));
        }
        return Ok(());
    }

    let theme_name = flags.theme.unwrap_or_else(|| config.render.theme.clone());
    let registry = ThemeRegistry::builtin();
    let theme = registry.get(&theme_name)?.clone();

    let width = flags.width.unwrap_or(config.canvas.width);
    let height = flags.height.unwrap_or(config.canvas.height);
    let pixel_ratio = flags.pixel_ratio.unwrap_or(config.canvas.pixel_ratio);

    let doc = CardDocument::parse_fields(&question, &answer, flags.watermark);
    log::debug!(
        "parsed document: {} question node(s), {} answer node(s)",
        doc.question.len(),
        doc.answer.len()
    );

    let mut surface = RecordingSurface::new(width * pixel_ratio, height * pixel_ratio);
    let info = SurfaceInfo {
        width,
        height,
        pixel_ratio,
    };

    let mut session = RenderSession::new(&mut surface, info, theme)
        .context("could not start the render session")?;
    let stats = session.render(&doc).context("render pass failed")?;
    drop(session);

    if let Some(path) = &flags.output {
        let dump = serde_json::to_string_pretty(surface.commands())
            .context("could not serialize draw commands")?;
        std::fs::write(path, dump)
            .with_context(|| format!("could not write {}", path.display()))?;
        println!("Draw commands written to {}", path.display());
    }

    println!(
        "Rendered '{}' card: {} x {} logical px, {} draw commands, {} cached measurements",
        theme_name,
        width,
        stats.canvas_height,
        surface.commands().len(),
        stats.cache_entries,
    );
    println!(
        "Question: {} words | Answer: {} words",
        text::word_count(&question),
        text::word_count(&answer),
    );

    Ok(())
}

/// Resolve one document field from inline text or a file
fn resolve_field(
    inline: &Option<String>,
    file: &Option<PathBuf>,
    encoded: bool,
) -> anyhow::Result<String> {
    let raw = match (inline, file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => {
            let metadata = std::fs::metadata(path)
                .with_context(|| format!("could not read {}", path.display()))?;
            if metadata.len() > MAX_SOURCE_SIZE {
                bail!(
                    "{} is too large ({} bytes, max {} bytes)",
                    path.display(),
                    metadata.len(),
                    MAX_SOURCE_SIZE
                );
            }
            std::fs::read_to_string(path)
                .with_context(|| format!("could not read {}", path.display()))?
        }
        (None, None) => String::new(),
    };

    Ok(if encoded {
        text::percent_decode(&raw)
    } else {
        raw
    })
}

/// Print help message
fn print_help() {
    println!(
        r##"Markcard - renders question/answer Markdown documents as themed cards

USAGE:
    markcard [OPTIONS]

OPTIONS:
    -h, --help              Show this help message
    -v, --version           Show version information
    -q, --question <TEXT>   Question Markdown text
    -a, --answer <TEXT>     Answer Markdown text
        --question-file <PATH>  Read the question from a file
        --answer-file <PATH>    Read the answer from a file
    -t, --theme <NAME>      Theme: default, simple, book, dialog
    -w, --watermark         Stamp the watermark
        --encoded           Treat question/answer as percent-encoded
        --plain             Print the plain-text reduction and exit
    -o, --output <PATH>     Write the JSON draw-command dump here
        --width <PX>        Canvas width in logical pixels
        --height <PX>       Canvas height in logical pixels
        --dpr <N>           Device pixel ratio

EXAMPLES:
    markcard -q "What is Rust?" -a "A systems language." -t book
    markcard --question-file q.md --answer-file a.md -o card.json
    markcard -q "# Title" --plain
"##
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
