use clap::{Parser, Subcommand};
use std::path::PathBuf;

use attainboard::attainment::attainment_matrix;
use attainboard::scores::ScoreBook;
use attainboard::subject::Subject;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive score board (default if no subcommand)
    Board {
        /// Score files to preload, as NAME=path.csv (NAME is an assessment)
        #[arg(long = "scores", value_name = "NAME=PATH")]
        scores: Vec<String>,

        /// Survey export (CSV or XLSX) for the indirect assessment
        #[arg(long)]
        indirect: Option<PathBuf>,
    },
    /// Print the attainment report and exit
    Report {
        /// Score files to load, as NAME=path.csv (NAME is an assessment)
        #[arg(long = "scores", value_name = "NAME=PATH")]
        scores: Vec<String>,

        /// Survey export (CSV or XLSX) for the indirect assessment
        #[arg(long)]
        indirect: Option<PathBuf>,

        /// Emit the attainment matrix as tab-separated values
        #[arg(long)]
        tsv: bool,
    },
    /// Analyze a student feedback survey export
    Survey {
        /// Survey export file (CSV or XLSX) with a Score column
        file: PathBuf,
    },
    /// Store a Gemini API key for survey analysis
    SetKey,
    /// Create a subject definition interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "attainboard")]
#[command(about = "CO/PO attainment dashboard for outcome-based education", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to subject file (defaults to ~/.config/attainboard/subject.yaml)
    #[arg(short, long, global = true)]
    subject: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Board {
        scores: Vec::new(),
        indirect: None,
    });
    let subject_path = cli.subject.map(PathBuf::from);

    // Init does not need an existing subject file
    if let Commands::Init = command {
        if let Err(e) = attainboard::subject::init::run_init_wizard(subject_path) {
            eprintln!("Init failed: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    if let Commands::SetKey = command {
        if let Err(e) = attainboard::credentials::prompt_and_store_key() {
            eprintln!("Failed to store API key: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    if let Commands::Survey { file } = &command {
        let scores = match attainboard::import::read_score_rows(file) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to read survey file: {:#}", e);
                std::process::exit(EXIT_INPUT);
            }
        };
        if cli.verbose {
            eprintln!("Read {} survey responses", scores.len());
        }

        let api_key = attainboard::credentials::load_api_key();
        if cli.verbose && api_key.is_none() {
            eprintln!("No Gemini API key found; using local analysis only");
        }

        let analysis = attainboard::survey::analyze_survey(&scores, api_key.as_deref()).await;
        let use_colors = attainboard::output::should_use_colors();
        println!(
            "{}",
            attainboard::output::format_survey_analysis(&analysis, use_colors)
        );
        std::process::exit(EXIT_SUCCESS);
    }

    // Board and Report both need the subject and a loaded score book
    let subject = match attainboard::subject::load_subject(subject_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Subject error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = attainboard::subject::validate_subject(&subject) {
        eprintln!("Subject definition errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    if cli.verbose {
        eprintln!(
            "Loaded subject {} with {} COs, {} direct assessments",
            subject.code,
            subject.course_outcomes.len(),
            subject.direct_assessments.len()
        );
    }

    match command {
        Commands::Board { scores, indirect } => {
            let book = build_book(&subject, &scores, indirect.as_deref(), cli.verbose);
            let theme = attainboard::tui::resolve_theme();
            let app = attainboard::tui::App::new(subject, book, theme);
            if let Err(e) = attainboard::tui::run_tui(app).await {
                eprintln!("Board error: {:#}", e);
                std::process::exit(EXIT_INPUT);
            }
        }
        Commands::Report {
            scores,
            indirect,
            tsv,
        } => {
            let book = build_book(&subject, &scores, indirect.as_deref(), cli.verbose);
            let levels = attainment_matrix(&subject, &book);

            if tsv {
                println!("{}", attainboard::output::format_attainment_tsv(&levels));
            } else {
                let use_colors = attainboard::output::should_use_colors();
                println!(
                    "{}",
                    attainboard::output::format_report(&subject, &book, &levels, use_colors)
                );
            }
        }
        Commands::Survey { .. } | Commands::SetKey | Commands::Init => unreachable!(),
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Parse a NAME=path score file spec.
fn parse_score_spec(spec: &str) -> Option<(&str, &str)> {
    spec.split_once('=')
        .map(|(name, path)| (name.trim(), path.trim()))
        .filter(|(name, path)| !name.is_empty() && !path.is_empty())
}

/// Seed every assessment with zero scores, then load the given score files.
fn build_book(
    subject: &Subject,
    score_specs: &[String],
    indirect: Option<&std::path::Path>,
    verbose: bool,
) -> ScoreBook {
    let mut book = ScoreBook::new();
    for assessment in &subject.direct_assessments {
        book.init_assessment(subject, &assessment.name);
    }

    for spec in score_specs {
        let Some((name, path)) = parse_score_spec(spec) else {
            eprintln!("Invalid score spec '{}'. Expected NAME=path.csv", spec);
            std::process::exit(EXIT_INPUT);
        };
        if subject.direct_assessment(name).is_none() {
            eprintln!(
                "Unknown assessment '{}'. Subject {} defines: {}",
                name,
                subject.code,
                subject
                    .direct_assessments
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            std::process::exit(EXIT_INPUT);
        }

        let rows = match attainboard::import::read_direct_csv(std::path::Path::new(path), subject)
        {
            Ok(rows) => rows,
            Err(e) => {
                eprintln!("Failed to read {}: {:#}", path, e);
                std::process::exit(EXIT_INPUT);
            }
        };
        if verbose {
            eprintln!("Loaded {} rows for {} from {}", rows.len(), name, path);
        }
        attainboard::import::apply_direct(&mut book, subject, name, &rows);
    }

    if let Some(path) = indirect {
        let scores = match attainboard::import::read_score_rows(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to read survey file: {:#}", e);
                std::process::exit(EXIT_INPUT);
            }
        };
        if verbose {
            eprintln!("Loaded {} survey responses from {}", scores.len(), path.display());
        }
        attainboard::import::apply_survey(&mut book, subject, &scores);
    }

    book
}
