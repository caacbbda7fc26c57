#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # cefr-grader
//!
//! Command-line front-end and HTTP server for the CEFR grading engine.
//!
//! Configure the gateway with `AI_GATEWAY_API_KEY` (and optionally
//! `AI_GATEWAY_BASE_URL`, `GRADER_MODEL`, `GRADER_GATEWAY_TIMEOUT_SECS`,
//! `GRADER_BIND_ADDR`), either in the environment or in a `.env` file.
//! Without a key every grade comes from the heuristic grader.

use std::{io::Read, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use bpaf::*;
use cefr_grader::{
    Grader,
    config::{self, ConfigHandle},
    models::ModelRegistry,
    server,
    tasks::{SPEAKING_PLACEHOLDER, default_prompt},
    types::{
        BandTier, ExamResult, ExamSubmission, QuestionType, ResponseSubmission, RubricScore,
        ScoreTier,
    },
};
use colored::Colorize;
use dotenvy::dotenv;
use serde::Deserialize;
use tabled::{Table, Tabled, settings::Style};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Run the HTTP server
    Serve(Option<SocketAddr>),
    /// Grade one response
    Grade {
        /// Task type of the response
        question_type: QuestionType,
        /// Task instruction; defaults to the built-in one
        prompt:        Option<String>,
        /// File holding the response, or `-` for stdin
        file:          String,
    },
    /// Grade a whole exam from a JSON file
    Exam(String),
    /// List registered models
    Models,
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the listen address
    fn addr() -> impl Parser<Option<SocketAddr>> {
        long("addr")
            .help("Address to listen on, overrides GRADER_BIND_ADDR")
            .argument::<SocketAddr>("ADDR")
            .optional()
    }

    /// parses the task type
    fn question_type() -> impl Parser<QuestionType> {
        long("type")
            .short('t')
            .help("Task type: email, summarize, dictation or speaking")
            .argument::<String>("TYPE")
            .parse(|name| name.parse::<QuestionType>())
    }

    /// parses the task instruction
    fn prompt() -> impl Parser<Option<String>> {
        long("prompt")
            .short('p')
            .help("Task instruction shown to the candidate")
            .argument::<String>("TEXT")
            .optional()
    }

    /// parses the response file name
    fn file() -> impl Parser<String> {
        positional("FILE").help("File containing the response, or - for stdin")
    }

    /// parses the exam file name
    fn exam_file() -> impl Parser<String> {
        positional("FILE").help("JSON file of the form {\"responses\": [...]}")
    }

    let serve = construct!(Cmd::Serve(addr()))
        .to_options()
        .command("serve")
        .help("Serve the grading HTTP endpoints");

    let grade = {
        let question_type = question_type();
        let prompt = prompt();
        let file = file();
        construct!(Cmd::Grade {
            question_type,
            prompt,
            file
        })
    }
    .to_options()
    .command("grade")
    .help("Grade a single task response");

    let exam = construct!(Cmd::Exam(exam_file()))
        .to_options()
        .command("exam")
        .help("Grade a complete exam and assign a CEFR band");

    let models = pure(Cmd::Models)
        .to_options()
        .command("models")
        .help("List the models the gateway can route to");

    let cmd = construct!([serve, grade, exam, models]);

    cmd.to_options()
        .descr("Hybrid LLM/heuristic grader for English proficiency tasks")
        .run()
}

/// Exam file layout accepted by the `exam` command.
#[derive(Debug, Deserialize)]
struct ExamFile {
    /// Task submissions in exam order.
    responses: Vec<ResponseSubmission>,
}

/// One row of the rubric table.
#[derive(Tabled)]
struct DimensionRow {
    /// Dimension name.
    #[tabled(rename = "Dimension")]
    dimension: &'static str,
    /// Score out of five.
    #[tabled(rename = "Score")]
    score:     String,
    /// Display tier.
    #[tabled(rename = "Rating")]
    rating:    &'static str,
}

/// Reads a file, or stdin for `-`.
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Could not read response from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Could not read {path}"))
    }
}

/// Prints a rubric score as a table followed by the feedback.
fn print_rubric(score: &RubricScore) {
    let rows = score.dimensions().map(|(dimension, value)| DimensionRow {
        dimension,
        score: format!("{value:.1}/5"),
        rating: match ScoreTier::of(value) {
            ScoreTier::Excellent => "excellent",
            ScoreTier::Good => "good",
            ScoreTier::NeedsWork => "needs work",
        },
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
    println!("{} {}", "Feedback:".bold(), score.feedback);
}

/// Prints an exam result with the band colored by tier.
fn print_exam(result: &ExamResult) {
    let band = result.overall_score;
    let label = format!("{band}");
    let label = match band.tier() {
        BandTier::Strong => label.green(),
        BandTier::Intermediate => label.blue(),
        BandTier::Elementary => label.yellow(),
        BandTier::Beginner => label.red(),
    };

    println!("{} {} ({})", "Overall:".bold(), label.bold(), band.description());
    println!("{} {}", "Explanation:".bold(), result.explanation);
}

/// Grades a single response read from `file`.
async fn grade_one(
    config: &ConfigHandle,
    question_type: QuestionType,
    prompt: Option<String>,
    file: &str,
) -> Result<()> {
    let user_response = match question_type {
        QuestionType::Speaking => SPEAKING_PLACEHOLDER.to_string(),
        _ => read_input(file)?,
    };
    anyhow::ensure!(!user_response.trim().is_empty(), "The response in {file} is empty");

    let submission = ResponseSubmission::new(
        question_type,
        prompt.unwrap_or_else(|| default_prompt(question_type)),
        user_response,
    );
    let score = Grader::from_config(config).grade_response(&submission).await;
    print_rubric(&score);
    Ok(())
}

/// Grades the exam described by the JSON file at `path`.
async fn grade_exam(config: &ConfigHandle, path: &str) -> Result<()> {
    let exam_file: ExamFile = serde_json::from_str(&read_input(path)?)
        .with_context(|| format!("{path} is not a valid exam submission"))?;
    let exam = ExamSubmission::new(exam_file.responses)?;

    let result = Grader::from_config(config).grade_exam(&exam).await;
    print_exam(&result);
    Ok(())
}

/// Prints the model registry, marking the configured default.
fn list_models(config: &ConfigHandle) {
    let models = ModelRegistry.all();
    let mut table = Table::new(models);
    table.with(Style::modern());
    println!("{table}");
    println!("Default grading model: {}", config.default_model().bold());
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();
    let config = config::ensure_initialized()?;

    match cmd {
        Cmd::Serve(addr) => {
            let addr = addr.unwrap_or_else(|| config.bind_addr());
            let grader = Arc::new(Grader::from_config(&config));
            server::serve(addr, grader).await?;
        }
        Cmd::Grade {
            question_type,
            prompt,
            file,
        } => grade_one(&config, question_type, prompt, &file).await?,
        Cmd::Exam(path) => grade_exam(&config, &path).await?,
        Cmd::Models => list_models(&config),
    };

    Ok(())
}
