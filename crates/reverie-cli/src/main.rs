use std::fs;
use std::io::{self, BufRead, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reverie_contracts::analysis::{AnalyzeOptions, DreamAnalysis};
use reverie_contracts::journal::{parse_intent, JOURNAL_HELP_COMMANDS};
use reverie_engine::{analyze, DreamEngine, DRYRUN_RENDERER};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "reverie-rs", version, about = "Turn dream journals into comic panels")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the full analysis as JSON.
    Analyze(AnalyzeArgs),
    /// Print one image prompt per line.
    Prompts(InputArgs),
    /// Interactive dream journal.
    Journal(JournalArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long)]
    max_panels: Option<usize>,
    #[arg(long)]
    no_merge: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    max_chars: usize,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    render: bool,
    #[arg(long, default_value = DRYRUN_RENDERER)]
    renderer: String,
}

#[derive(Debug, Args)]
struct JournalArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    events: Option<PathBuf>,
    #[arg(long)]
    max_panels: Option<usize>,
    #[arg(long)]
    no_merge: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_CHARS)]
    max_chars: usize,
    #[arg(long, default_value = DRYRUN_RENDERER)]
    renderer: String,
}

const DEFAULT_MAX_CHARS: usize = 20_000;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("reverie-rs error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Prompts(args) => run_prompts(args),
        Command::Journal(args) => {
            run_journal(args)?;
            Ok(0)
        }
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<i32> {
    let text = read_input(&args.input)?;
    let options = resolve_options(args.input.max_panels, args.input.no_merge)?;

    let Some(out_dir) = args.out else {
        if args.render {
            bail!("--render needs --out to know where panels go");
        }
        let analysis = analyze(&text, &options);
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(0);
    };

    let events_path = args.events.unwrap_or_else(|| out_dir.join("events.jsonl"));
    let mut engine = DreamEngine::new(&out_dir, &events_path, options)?;
    engine.set_renderer(&args.renderer)?;
    let result = analyze_with_engine(&mut engine, &text, args.render);
    engine.finish()?;
    let analysis = result?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(0)
}

fn analyze_with_engine(engine: &mut DreamEngine, text: &str, render: bool) -> Result<DreamAnalysis> {
    let analysis = engine.analyze(text)?;
    if render {
        for panel in engine.render_panels()? {
            eprintln!("Rendered {}", panel.image_path.display());
        }
    }
    Ok(analysis)
}

fn run_prompts(args: InputArgs) -> Result<i32> {
    let text = read_input(&args)?;
    let options = resolve_options(args.max_panels, args.no_merge)?;
    for prompt in analyze(&text, &options).prompts() {
        println!("{prompt}");
    }
    Ok(0)
}

fn run_journal(args: JournalArgs) -> Result<()> {
    let options = resolve_options(args.max_panels, args.no_merge)?;
    let events_path = args
        .events
        .clone()
        .unwrap_or_else(|| args.out.join("events.jsonl"));
    let mut engine = DreamEngine::new(&args.out, &events_path, options)?;
    engine.set_renderer(&args.renderer)?;

    println!(
        "Reverie journal started in {}. Write your dream, then '.' or /analyze. /help for commands.",
        engine.run_dir().display()
    );
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let result = journal_loop(&mut engine, stdin.lock(), &mut stdout, args.max_chars);
    engine.finish()?;
    result
}

/// Reads journal lines until EOF, dispatching each parsed intent.
fn journal_loop<R: BufRead, W: Write>(
    engine: &mut DreamEngine,
    mut reader: R,
    out: &mut W,
    max_chars: usize,
) -> Result<()> {
    let mut pending: Vec<String> = Vec::new();
    let mut line = String::new();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        let read = match reader.read_line(&mut line) {
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        if read == 0 {
            break;
        }

        let input = line.trim_end_matches(['\n', '\r']);
        let intent = parse_intent(input);
        match intent.action.as_str() {
            "noop" => {}
            "help" => {
                writeln!(out, "Commands: {}", JOURNAL_HELP_COMMANDS.join(" "))?;
            }
            "append" => {
                if let Some(text) = intent.text {
                    pending.push(text);
                }
            }
            "analyze" => {
                if pending.is_empty() {
                    writeln!(out, "Nothing to analyze yet.")?;
                    continue;
                }
                let text = pending.join(" ");
                if let Err(err) = check_input(&text, max_chars) {
                    writeln!(out, "{err:#}. Use /reset to start over.")?;
                    continue;
                }
                let analysis = engine.analyze(&text)?;
                pending.clear();
                writeln!(
                    out,
                    "{} ({}, {})",
                    analysis.story_title,
                    analysis.tone,
                    panel_count_label(analysis.panels.len())
                )?;
            }
            "show" => match engine.last_analysis() {
                Some(analysis) => writeln!(out, "{}", serde_json::to_string_pretty(analysis)?)?,
                None => writeln!(out, "No analysis yet.")?,
            },
            "prompts" => match engine.last_analysis() {
                Some(analysis) => {
                    for (index, prompt) in analysis.prompts().enumerate() {
                        writeln!(out, "{}. {prompt}", index + 1)?;
                    }
                }
                None => writeln!(out, "No analysis yet.")?,
            },
            "render" => {
                if engine.last_analysis().is_none() {
                    writeln!(out, "No analysis yet.")?;
                    continue;
                }
                for panel in engine.render_panels()? {
                    writeln!(out, "Rendered {}", panel.image_path.display())?;
                    for warning in &panel.warnings {
                        writeln!(out, "  warning: {warning}")?;
                    }
                }
            }
            "export" => {
                let Some(path) = value_as_non_empty_string(intent.command_args.get("path")) else {
                    writeln!(out, "/export requires a path")?;
                    continue;
                };
                if engine.last_analysis().is_none() {
                    writeln!(out, "No analysis yet.")?;
                    continue;
                }
                engine.export_last(Path::new(&path))?;
                writeln!(out, "Exported to {path}")?;
            }
            "reset" => {
                pending.clear();
                writeln!(out, "Pending dream cleared.")?;
            }
            "set_panels" => {
                let mut options = engine.options();
                if let Some(value) = intent
                    .settings_update
                    .get("max_panels")
                    .and_then(Value::as_u64)
                {
                    options.max_panels = value as usize;
                }
                engine.set_options(options);
                writeln!(out, "Max panels set to {}", options.max_panels)?;
            }
            "set_merge" => {
                let mut options = engine.options();
                if let Some(value) = intent
                    .settings_update
                    .get("merge_short")
                    .and_then(Value::as_bool)
                {
                    options.merge_short = value;
                }
                engine.set_options(options);
                let state = if options.merge_short { "on" } else { "off" };
                writeln!(out, "Merging short scenes {state}")?;
            }
            "invalid" => {
                let reason = value_as_non_empty_string(intent.command_args.get("reason"))
                    .unwrap_or_else(|| "invalid arguments".to_string());
                writeln!(out, "{reason}")?;
            }
            _ => {
                let command = value_as_non_empty_string(intent.command_args.get("command"))
                    .unwrap_or_else(|| intent.raw.trim().to_string());
                writeln!(out, "Unknown command: /{command}. Try /help.")?;
            }
        }
    }
    Ok(())
}

fn read_input(args: &InputArgs) -> Result<String> {
    let text = if let Some(text) = &args.text {
        text.clone()
    } else if let Some(path) = &args.file {
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed reading dream text from stdin")?;
        buffer
    };
    check_input(&text, args.max_chars)?;
    Ok(text)
}

fn check_input(text: &str, max_chars: usize) -> Result<()> {
    if text.trim().is_empty() {
        bail!("dream text is empty");
    }
    let chars = text.chars().count();
    if chars > max_chars {
        bail!("dream text is {chars} characters; the limit is {max_chars} (see --max-chars)");
    }
    Ok(())
}

fn panel_count_label(count: usize) -> String {
    if count == 1 {
        "1 panel".to_string()
    } else {
        format!("{count} panels")
    }
}

fn resolve_options(max_panels: Option<usize>, no_merge: bool) -> Result<AnalyzeOptions> {
    apply_overrides(AnalyzeOptions::from_env(), max_panels, no_merge)
}

fn apply_overrides(
    mut options: AnalyzeOptions,
    max_panels: Option<usize>,
    no_merge: bool,
) -> Result<AnalyzeOptions> {
    if let Some(value) = max_panels {
        if value == 0 {
            bail!("--max-panels must be at least 1");
        }
        options.max_panels = value;
    }
    if no_merge {
        options.merge_short = false;
    }
    Ok(options)
}

fn value_as_non_empty_string(value: Option<&Value>) -> Option<String> {
    let raw = value
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
