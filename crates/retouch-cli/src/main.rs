// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Retouch — photo filters, text detection and text replacement
//
// Entry point. Initialises logging, builds the editor services from
// configuration, and dispatches one subcommand.

mod services;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use retouch_core::error::Result;
use retouch_core::human_errors::humanize_error;
use retouch_core::{FilterSpec, TextRegion, TextStyle};

use services::editor::EditorServices;

#[derive(Parser)]
#[command(
    name = "retouch",
    about = "Apply filters to photos, and find, replace or add text in them",
    version
)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/retouch/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct InputArgs {
    /// Input image file
    input: PathBuf,

    /// Treat the input file as base64 text (a data URL is accepted)
    #[arg(long)]
    base64: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (default: generated name in --out-dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for generated output names
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args)]
struct StyleArgs {
    /// Font family (unknown families fall back to the default)
    #[arg(long)]
    font: Option<String>,

    /// Point size
    #[arg(long)]
    size: Option<u32>,

    /// Colour as #RRGGBB
    #[arg(long)]
    color: Option<String>,

    /// normal, bold, italic or "bold italic"
    #[arg(long)]
    style: Option<String>,
}

impl StyleArgs {
    fn is_empty(&self) -> bool {
        self.font.is_none() && self.size.is_none() && self.color.is_none() && self.style.is_none()
    }

    /// `None` when no style option was given, so the workflow default applies.
    fn resolve(&self, base: &TextStyle) -> Result<Option<TextStyle>> {
        if self.is_empty() {
            return Ok(None);
        }
        TextStyle::from_params(
            base,
            self.font.as_deref(),
            self.size,
            self.color.as_deref(),
            self.style.as_deref(),
        )
        .map(Some)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Apply one filter: brightness, contrast, grayscale, sepia or blur
    Filter {
        #[command(flatten)]
        input: InputArgs,
        /// Filter kind
        kind: String,
        /// Factor for brightness/contrast, radius for blur
        #[arg(allow_hyphen_values = true)]
        value: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Draw text onto the image
    AddText {
        #[command(flatten)]
        input: InputArgs,
        text: String,
        /// Baseline x (default from config)
        #[arg(short, long, requires = "y", allow_negative_numbers = true)]
        x: Option<i32>,
        /// Baseline y (default from config)
        #[arg(short, long, requires = "x", allow_negative_numbers = true)]
        y: Option<i32>,
        #[command(flatten)]
        style: StyleArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Replace the first detected word equal to TARGET (ignoring case)
    ReplaceText {
        #[command(flatten)]
        input: InputArgs,
        target: String,
        replacement: String,
        #[command(flatten)]
        style: StyleArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List detected words as JSON
    Detect {
        #[command(flatten)]
        input: InputArgs,
        /// Print an empty list instead of failing when the engine is down
        #[arg(long)]
        lenient: bool,
    },
    /// Print all recognised text
    Extract {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Report engine and font status as JSON
    Health,
    /// Print the active configuration, or write it to a file
    Config {
        /// Write the configuration here instead of printing it
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("Error: {}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let svc = EditorServices::init(cli.config.as_deref())?;
    let workflow = svc.workflow();

    match cli.command {
        Command::Filter {
            input,
            kind,
            value,
            output,
        } => {
            let spec = FilterSpec::parse(&kind, value.as_deref())?;
            let image = svc.load_image(&input.input, input.base64)?;
            let outcome = workflow.apply_filter(&image, file_name(&input.input), &spec)?;
            let path = svc.write_outcome(&outcome, output.output.as_deref(), &output.out_dir)?;
            print_artifact(&outcome.artifact, &path)
        }
        Command::AddText {
            input,
            text,
            x,
            y,
            style,
            output,
        } => {
            let style = style.resolve(workflow.default_style())?;
            let anchor = x.zip(y);
            let image = svc.load_image(&input.input, input.base64)?;
            let outcome = workflow.add_text(
                &image,
                file_name(&input.input),
                &text,
                anchor,
                style.as_ref(),
            )?;
            let path = svc.write_outcome(&outcome, output.output.as_deref(), &output.out_dir)?;
            print_artifact(&outcome.artifact, &path)
        }
        Command::ReplaceText {
            input,
            target,
            replacement,
            style,
            output,
        } => {
            let style = style.resolve(workflow.default_style())?;
            let image = svc.load_image(&input.input, input.base64)?;
            let outcome = workflow.replace_text(
                &image,
                file_name(&input.input),
                &target,
                &replacement,
                style.as_ref(),
            )?;
            let path = svc.write_outcome(&outcome, output.output.as_deref(), &output.out_dir)?;
            print_artifact(&outcome.artifact, &path)
        }
        Command::Detect { input, lenient } => {
            let image = svc.load_image(&input.input, input.base64)?;
            let regions: Vec<TextRegion> = if lenient {
                workflow.detect_lenient(&image).collect()
            } else {
                workflow.detect(&image)?.collect()
            };
            println!("{}", serde_json::to_string_pretty(&regions)?);
            Ok(())
        }
        Command::Extract { input } => {
            let image = svc.load_image(&input.input, input.base64)?;
            println!("{}", workflow.extract_text(&image)?);
            Ok(())
        }
        Command::Health => {
            println!("{}", serde_json::to_string_pretty(&svc.health())?);
            Ok(())
        }
        Command::Config { write } => match write {
            Some(path) => {
                svc.save_config(&path)?;
                tracing::info!(path = %path.display(), "configuration written");
                Ok(())
            }
            None => {
                println!("{}", serde_json::to_string_pretty(svc.config())?);
                Ok(())
            }
        },
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

fn print_artifact(artifact: &retouch_core::ArtifactInfo, path: &Path) -> Result<()> {
    let mut json = serde_json::to_value(artifact)?;
    json["path"] = serde_json::Value::String(path.display().to_string());
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
