use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use citation_relations::app::App;
use citation_relations::config::ConfigLoader;
use citation_relations::domain::{Direction, Doi};
use citation_relations::error::CiteError;
use citation_relations::output::{JsonOutput, OutputMode};
use citation_relations::tui::Tui;

#[derive(Parser)]
#[command(name = "cite-rel")]
#[command(about = "Show what a publication cites and what cites it")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show citation relations of a record")]
    Show(ShowArgs),
}

#[derive(Args)]
struct ShowArgs {
    /// DOI of the record to inspect (bare, doi: or https://doi.org/ form)
    doi: String,

    /// Search only this side of the relation (both by default)
    #[arg(long, value_enum)]
    direction: Option<Direction>,

    /// Title to show for the record instead of looking it up on Crossref
    #[arg(long)]
    title: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<CiteError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &CiteError) -> u8 {
    match error {
        CiteError::InvalidDoi(_)
        | CiteError::ConfigRead(_)
        | CiteError::ConfigParse(_)
        | CiteError::TabDisabled => 2,
        CiteError::CitationHttp(_)
        | CiteError::CitationStatus { .. }
        | CiteError::CrossrefHttp(_)
        | CiteError::CrossrefStatus { .. } => 3,
        CiteError::WorkerPanic(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    if !config.preferences.show_citation_relations_tab {
        return Err(CiteError::TabDisabled.into());
    }

    match cli.command {
        Commands::Show(args) => {
            let doi: Doi = args.doi.parse()?;
            let record = App::resolve_record(&config.http, doi, args.title)?;
            let mut app = App::new(&config)?;
            app.tab_mut().bind(record);

            match output_mode {
                OutputMode::NonInteractive => {
                    let directions = match args.direction {
                        Some(direction) => vec![direction],
                        None => Direction::ALL.to_vec(),
                    };
                    let snapshot = app.collect(&directions);
                    JsonOutput::print_snapshot(&snapshot).into_diagnostic()?;
                    Ok(())
                }
                OutputMode::Interactive => {
                    if let Some(direction) = args.direction {
                        app.tab_mut().press(direction);
                    }
                    let mut tui = Tui::new();
                    tui.run(app.tab_mut())
                }
            }
        }
    }
}
