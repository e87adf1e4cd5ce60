//! pbixtrans CLI - Command-line tool for translating Power BI reports
//!
//! This binary provides command-line interfaces for:
//! - translate: rewrite the visible text of a .pbix into another language
//! - inspect: list pages and visuals of a .pbix without modifying it

mod config;
mod providers;

use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, Overrides, ProviderKind};
use indicatif::{ProgressBar, ProgressStyle};
use pbixtrans_format::constants::LAYOUT_MEMBER;
use pbixtrans_io::{execute_translate, read_member, TranslateRequest, TranslateSummary};
use pbixtrans_layout::{ConfigEncoding, Document, LanguageCode, SectionOutline, VisualRegistry};
use serde::Serialize;
use std::error::Error;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pbixtrans")]
#[command(about = "Translate the text of Power BI report packages (.pbix)")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a .pbix report into another language
    ///
    /// Examples:
    ///   pbixtrans translate -f report.pbix -l de
    ///   pbixtrans translate -f report.pbix -l fr --provider glossary --glossary terms.toml
    Translate {
        /// Input report (.pbix)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
        /// Target language code (e.g. de, fr, pt-br)
        #[arg(short = 'l', long = "lang")]
        lang: String,
        /// Output report, defaults to <stem>_<lang>.pbix next to the input
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Translation provider
        #[arg(long, value_enum)]
        provider: Option<ProviderKind>,
        /// LibreTranslate base URL
        #[arg(long)]
        endpoint: Option<String>,
        /// LibreTranslate API key
        #[arg(long)]
        api_key: Option<String>,
        /// Source language sent to the provider
        #[arg(long)]
        source_lang: Option<String>,
        /// Glossary file for the glossary provider
        #[arg(long)]
        glossary: Option<PathBuf>,
        /// Fail on strings missing from the glossary
        #[arg(long)]
        strict: bool,
        /// TOML config file with provider and retry settings
        #[arg(long)]
        config: Option<PathBuf>,
        /// Attempts per string for retryable provider errors
        #[arg(long)]
        retries: Option<u32>,
        /// Scratch directory for extraction (must be missing or empty), defaults to <stem>_extracted
        #[arg(long)]
        work_dir: Option<PathBuf>,
        /// Show progress spinner while translating
        #[arg(long)]
        progress: bool,
        /// Print the run summary as JSON on stdout
        #[arg(long)]
        summary_json: bool,
    },
    /// List pages and visuals of a .pbix report
    Inspect {
        /// Input report (.pbix)
        input: PathBuf,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = InspectFormat::Table)]
        format: InspectFormat,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum InspectFormat {
    Table,
    Json,
}

struct TranslateArgs {
    file: PathBuf,
    lang: String,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    overrides: Overrides,
    progress: bool,
    summary_json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Translate {
            file,
            lang,
            output,
            provider,
            endpoint,
            api_key,
            source_lang,
            glossary,
            strict,
            config,
            retries,
            work_dir,
            progress,
            summary_json,
        } => handle_translate(TranslateArgs {
            file,
            lang,
            output,
            config,
            work_dir,
            overrides: Overrides {
                provider,
                endpoint,
                api_key,
                source: source_lang,
                glossary,
                strict,
                retries,
            },
            progress,
            summary_json,
        }),
        Commands::Inspect { input, format } => handle_inspect(input, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn handle_translate(args: TranslateArgs) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let language = LanguageCode::parse(&args.lang)?;
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let settings = config.resolve(args.overrides)?;
    tracing::debug!(provider = ?settings.kind, retries = settings.retry.max_attempts, "resolved settings");
    let translator = providers::build(&settings)?;

    let request = TranslateRequest {
        input: args.file,
        output: args.output,
        work_dir: args.work_dir,
        language,
        translator,
        registry: VisualRegistry::standard(),
        retry: settings.retry,
    };

    let mut progress_bar = args.progress.then(|| create_spinner("Translating report"));
    let summary = execute_translate(request);
    let elapsed = start.elapsed();
    let summary = match summary {
        Ok(summary) => summary,
        Err(err) => {
            if let Some(pb) = progress_bar.take() {
                pb.abandon_with_message("Translation failed");
            }
            return Err(err.into());
        }
    };
    if let Some(pb) = progress_bar.take() {
        pb.finish_with_message(format!(
            "Translated {} strings across {} pages in {:.2?}",
            summary.traversal.fragments_translated, summary.traversal.sections, elapsed
        ));
    }

    report_translate_summary(&summary, elapsed)?;
    if args.summary_json {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &summary)?;
        writeln!(&mut stdout)?;
    }
    Ok(())
}

fn report_translate_summary(summary: &TranslateSummary, elapsed: Duration) -> Result<(), Box<dyn Error>> {
    let mut stderr = std::io::stderr().lock();
    writeln!(
        &mut stderr,
        "Translated to {} (language: {}, pages: {}, visuals translated: {}, strings: {}, skipped blank: {}, members: {}, elapsed: {:.2?})",
        summary.output.display(),
        summary.language,
        summary.traversal.sections,
        summary.traversal.visuals_handled,
        summary.traversal.fragments_translated,
        summary.traversal.fragments_skipped_blank,
        summary.pack.members,
        elapsed
    )?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
struct InspectReport {
    input: PathBuf,
    sections: Vec<InspectSection>,
}

#[derive(Debug, Clone, Serialize)]
struct InspectSection {
    name: Option<String>,
    display_name: Option<String>,
    visuals: Vec<InspectVisual>,
}

#[derive(Debug, Clone, Serialize)]
struct InspectVisual {
    visual_type: Option<String>,
    config_encoding: Option<ConfigEncoding>,
    handled: bool,
}

fn build_inspect_report(input: PathBuf, outline: Vec<SectionOutline>, registry: &VisualRegistry) -> InspectReport {
    let sections = outline
        .into_iter()
        .map(|section| InspectSection {
            name: section.name,
            display_name: section.display_name,
            visuals: section
                .visuals
                .into_iter()
                .map(|visual| InspectVisual {
                    handled: visual
                        .visual_type
                        .as_deref()
                        .is_some_and(|tag| registry.contains(tag)),
                    visual_type: visual.visual_type,
                    config_encoding: visual.config_encoding,
                })
                .collect(),
        })
        .collect();
    InspectReport { input, sections }
}

fn handle_inspect(input: PathBuf, format: InspectFormat) -> Result<(), Box<dyn Error>> {
    let bytes = read_member(&input, LAYOUT_MEMBER)?;
    let document = Document::from_layout_bytes(&bytes)?;
    let registry = VisualRegistry::standard();
    let report = build_inspect_report(input, document.outline()?, &registry);

    let mut stdout = std::io::stdout().lock();
    match format {
        InspectFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(&mut stdout)?;
        }
        InspectFormat::Table => render_inspect_table(&mut stdout, &report)?,
    }
    Ok(())
}

fn render_inspect_table(out: &mut impl Write, report: &InspectReport) -> std::io::Result<()> {
    writeln!(out, "Report: {}", report.input.display())?;
    writeln!(out, "Pages: {}", report.sections.len())?;
    for (index, section) in report.sections.iter().enumerate() {
        writeln!(
            out,
            "\n[{}] {} ({})",
            index,
            section.display_name.as_deref().unwrap_or("<untitled>"),
            section.name.as_deref().unwrap_or("-")
        )?;
        writeln!(out, "  {:<5} {:<28} {:<11} {}", "#", "VISUAL TYPE", "CONFIG", "HANDLED")?;
        for (position, visual) in section.visuals.iter().enumerate() {
            let encoding = match visual.config_encoding {
                Some(ConfigEncoding::Encoded) => "encoded",
                Some(ConfigEncoding::Structured) => "structured",
                None => "none",
            };
            writeln!(
                out,
                "  {:<5} {:<28} {:<11} {}",
                position,
                visual.visual_type.as_deref().unwrap_or("-"),
                encoding,
                if visual.handled { "yes" } else { "no" }
            )?;
        }
    }
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
