use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_isatab::config::ConfigLoader;
use kira_isatab::error::IsaTabError;
use kira_isatab::output::{EncodeResult, JsonOutput, OutputMode, print_summary};
use kira_isatab::store::{BundleWriter, read_investigation};

#[derive(Parser)]
#[command(name = "kira-isa")]
#[command(about = "Encode an investigation graph (JSON) into ISA-Tab files")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Write i_investigation.txt and the study files")]
    Encode(EncodeArgs),
}

#[derive(Args)]
struct EncodeArgs {
    /// Investigation JSON; falls back to `input` from the config file.
    input: Option<String>,

    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    out_dir: Option<String>,

    #[arg(long)]
    force: bool,

    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<IsaTabError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &IsaTabError) -> u8 {
    match error {
        error if error.is_invalid_input() => 2,
        IsaTabError::InputParse(_) | IsaTabError::MissingConfig => 2,
        IsaTabError::Filesystem(_) | IsaTabError::OutputExists(_) | IsaTabError::InputRead(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match cli.command {
        Commands::Encode(args) => run_encode(args, output_mode),
    }
}

fn run_encode(args: EncodeArgs, output_mode: OutputMode) -> miette::Result<()> {
    let config = ConfigLoader::resolve_or_default(args.config.as_deref())?;

    let input = args
        .input
        .map(Utf8PathBuf::from)
        .or(config.input)
        .ok_or_else(|| miette::Report::msg("input required (argument or `input` in kira-isa.json)"))?;
    let output_dir = args
        .out_dir
        .map(Utf8PathBuf::from)
        .unwrap_or(config.output_dir);
    let overwrite = args.force || config.overwrite;

    let investigation = read_investigation(&input)?;
    let bundle = kira_isatab::encode(&investigation)?;

    if args.dry_run && matches!(output_mode, OutputMode::Json) {
        return JsonOutput::print_bundle(&bundle).into_diagnostic();
    }

    let paths = if args.dry_run {
        Vec::new()
    } else {
        BundleWriter::new(output_dir, overwrite)
            .write(&bundle)?
            .into_iter()
            .map(|path| path.to_string())
            .collect()
    };

    let result = EncodeResult::new(&investigation.identifier, &bundle, &paths, args.dry_run);
    match output_mode {
        OutputMode::Json => JsonOutput::print_encode(&result).into_diagnostic(),
        OutputMode::Human => {
            print_summary(&result);
            Ok(())
        }
    }
}
