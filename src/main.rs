use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use patchscan_analysis::{chart, output, pipeline};
use patchscan_core::{KeywordTally, PatchscanConfig};
use patchscan_difflens::filter::SourceFilter;

#[derive(Parser)]
#[command(
    name = "patchscan",
    version,
    about = "Analyze unified-diff patches for keyword and control-flow changes",
    long_about = "Reads a directory of unified-diff patch files, counts language keywords on\n\
                   added and removed lines, and records the conditionals, loops, exception\n\
                   handlers, raises and imports each patch adds or removes.\n\n\
                   Examples:\n  \
                     patchscan analyze PR_DATA              Analyze every patch in PR_DATA\n  \
                     patchscan analyze --no-plot --pretty   Skip the chart prompt, indent JSON\n  \
                     patchscan scan fix-1234.patch          Print one patch's records as JSON\n  \
                     patchscan init                         Write a default .patchscan.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .patchscan.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze every patch in a directory
    #[command(long_about = "Analyze every patch in a directory.\n\n\
        Writes the change-record document (default: extract.json), then offers to\n\
        render a bar chart of keyword additions and deletions.\n\n\
        Examples:\n  patchscan analyze PR_DATA\n  patchscan analyze patches/ --output out/extract.json --plot")]
    Analyze {
        /// Directory containing patch files
        #[arg(default_value = "PR_DATA")]
        dir: PathBuf,

        /// Where to write the change-record JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Where to write the SVG chart
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Render the chart without asking
        #[arg(long, conflicts_with = "no_plot")]
        plot: bool,

        /// Never render the chart; print the keyword counts instead
        #[arg(long)]
        no_plot: bool,

        /// Pretty-print the JSON document
        #[arg(long)]
        pretty: bool,
    },
    /// Analyze a single patch and print the result as JSON
    Scan {
        /// Patch file to analyze
        file: PathBuf,
    },
    /// Create a default .patchscan.toml in the current directory
    Init,
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# patchscan configuration

[scan]
# Extensions of files whose diff blocks are classified.
extensions = ["py"]

[output]
extract_path = "extract.json"
chart_path = "analysis.svg"
chart_title = "Repository patch analysis"
# pretty = true
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => PatchscanConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".patchscan.toml");
            if default_path.exists() {
                PatchscanConfig::from_file(default_path)?
            } else {
                PatchscanConfig::default()
            }
        }
    };
    tracing::debug!(extensions = ?config.scan.extensions, "configuration loaded");

    match cli.command {
        Command::Analyze {
            ref dir,
            ref output,
            ref chart,
            plot,
            no_plot,
            pretty,
        } => {
            let extract_path = output
                .clone()
                .unwrap_or_else(|| config.output.extract_path.clone());
            let chart_path = chart
                .clone()
                .unwrap_or_else(|| config.output.chart_path.clone());
            let started = Instant::now();

            let filter = SourceFilter::from_config(&config.scan)?;
            let patches = pipeline::discover_patches(dir)?;
            if patches.is_empty() {
                eprintln!("No patch files found in {}", dir.display());
            }

            let progress = if std::io::stderr().is_terminal() {
                let pb = indicatif::ProgressBar::new(patches.len() as u64);
                pb.set_style(
                    indicatif::ProgressStyle::with_template(
                        "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}",
                    )
                    .into_diagnostic()?
                    .progress_chars("=> "),
                );
                Some(pb)
            } else {
                None
            };

            let report = pipeline::analyze_patches(&patches, &filter, |path| {
                if let Some(pb) = &progress {
                    if let Some(name) = path.file_name() {
                        pb.set_message(name.to_string_lossy().into_owned());
                    }
                    pb.inc(1);
                }
            });
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }

            output::write_extract(&extract_path, &report.change_sets, pretty || config.output.pretty)?;
            println!(
                "Wrote {} change records from {} of {} patches to {}",
                report.record_count(),
                report.change_sets.len(),
                report.patches_scanned,
                extract_path.display()
            );
            if report.patches_skipped > 0 {
                eprintln!("warning: {} patches could not be read", report.patches_skipped);
            }
            if report.malformed_lines > 0 {
                eprintln!(
                    "warning: skipped {} raise/import lines with no operand",
                    report.malformed_lines
                );
            }
            println!("Time elapsed: {:.2}s", started.elapsed().as_secs_f64());

            let render = if plot {
                true
            } else if no_plot {
                false
            } else {
                ask_for_chart()
            };

            if render {
                chart::write_chart(&chart_path, &report.tally, &config.output.chart_title)?;
                println!("Generated {}", chart_path.display());
            } else {
                println!("Skipping chart.\n");
                print_tally(&report.tally);
            }
        }
        Command::Scan { ref file } => {
            let filter = SourceFilter::from_config(&config.scan)?;
            let text = pipeline::read_patch(file)?;
            let report = pipeline::analyze_patch(&pipeline::patch_name(file), &text, &filter);
            println!(
                "{}",
                serde_json::to_string_pretty(&report).into_diagnostic()?
            );
        }
        Command::Init => {
            let path = Path::new(".patchscan.toml");
            if path.exists() {
                miette::bail!(".patchscan.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .patchscan.toml with default configuration");
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "patchscan", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Ask whether to render the chart. Piped stdin is read as a single answer.
fn ask_for_chart() -> bool {
    const PROMPT: &str = "Do you want to plot the result of your analysis? [Y/N]";

    if std::io::stdin().is_terminal() {
        return match dialoguer::Input::<String>::new()
            .with_prompt(PROMPT)
            .allow_empty(true)
            .interact_text()
        {
            Ok(answer) => chart::wants_chart(&answer),
            Err(e) => {
                tracing::warn!("chart prompt failed: {e}");
                false
            }
        };
    }

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => chart::wants_chart(&answer),
        Err(e) => {
            tracing::warn!("failed to read chart answer: {e}");
            false
        }
    }
}

fn print_tally(tally: &KeywordTally) {
    println!("{:<10} {:>8} {:>8}", "keyword", "added", "removed");
    for (keyword, added, removed) in tally.rows() {
        println!("{:<10} {added:>8} {removed:>8}", keyword.as_str());
    }
}
