#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # webgrade
//!
//! Grades HTML coursework from a Canvas-style submissions archive.
//!
//! `webgrade grade submissions.zip results --assignment "dungeon"` extracts
//! the archive into `results/pulled_html`, fetches every submitted page into
//! `results/fetched_pages`, and writes `results/csv/grading_results.csv`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};
use url::Url;
use webgrade::{
    GraderConfig, Registry,
    fetch::HttpFetcher,
    gradebook::JsonHandoff,
    grade_archive,
    html::Document,
    names, report,
    rubric::EvalContext,
};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade every submission in an archive
    Grade {
        /// Registered assignment name
        assignment: String,
        /// Also write the gradebook hand-off file
        handoff:    bool,
        /// Submissions archive
        archive:    PathBuf,
        /// Results folder
        results:    PathBuf,
    },
    /// Grade a single page
    Check {
        /// Registered assignment name
        assignment: String,
        /// URL or local file
        target:     String,
    },
    /// List the registered assignments
    Assignments,
    /// Print the canonical key for a file name or display name
    Resolve(String),
}

/// Parsed command line.
#[derive(Debug, Clone)]
struct Opts {
    /// Log at debug level
    verbose: bool,
    /// Selected command
    cmd:     Cmd,
}

/// Parse the command line arguments and return the options
fn options() -> Opts {
    /// parses the assignment name
    fn a() -> impl Parser<String> {
        long("assignment")
            .short('a')
            .help("Assignment name, see `webgrade assignments`")
            .argument::<String>("NAME")
    }

    /// parses a file name or display name
    fn n() -> impl Parser<String> {
        positional("NAME").help("File name or display name")
    }

    let grade = {
        let assignment = a();
        let handoff = long("handoff")
            .help("Write results/handoff.json for the gradebook")
            .switch();
        let archive = positional::<PathBuf>("ARCHIVE").help("Zip archive of submissions");
        let results = positional::<PathBuf>("RESULTS").help("Results folder, created if absent");
        construct!(Cmd::Grade {
            assignment,
            handoff,
            archive,
            results
        })
    }
    .to_options()
    .command("grade")
    .help("Grade every submission in an archive");

    let check = {
        let assignment = a();
        let target = positional::<String>("URL/FILE").help("Page URL or local HTML file");
        construct!(Cmd::Check { assignment, target })
    }
    .to_options()
    .command("check")
    .help("Grade a single page and print the result");

    let assignments = pure(Cmd::Assignments)
        .to_options()
        .command("assignments")
        .help("List the registered assignments");

    let resolve = construct!(Cmd::Resolve(n()))
        .to_options()
        .command("resolve")
        .help("Print the canonical student key");

    let verbose = short('v')
        .long("verbose")
        .help("Log at debug level")
        .switch();
    let cmd = construct!([grade, check, assignments, resolve]);

    construct!(Opts { verbose, cmd })
        .to_options()
        .descr("Grader for HTML coursework")
        .run()
}

/// Grades one URL or file with the rubric for `assignment`.
fn check(registry: &Registry, assignment: &str, target: &str) -> Result<()> {
    let rubric = registry.get(assignment)?;
    let fetcher = HttpFetcher::new(
        webgrade::config::timeout_from_env(),
        &webgrade::config::user_agent_from_env(),
    )?;

    let (doc, url) = if Path::new(target).is_file() {
        let body = std::fs::read_to_string(target)
            .with_context(|| format!("Could not read {target}"))?;
        (Document::parse(body), None)
    } else {
        let url = Url::parse(target).with_context(|| format!("`{target}` is not a URL"))?;
        let body = webgrade::fetch::Fetch::fetch(&fetcher, &url)?;
        (Document::parse(body), Some(url))
    };

    let ctx = EvalContext {
        url:     url.as_ref(),
        student: "check",
        fetcher: &fetcher,
    };
    let result = rubric
        .evaluate(&doc, &ctx)
        .unwrap_or_else(|e| rubric.failure(&e));

    println!("{}/{}", result.score, rubric.max_score());
    for line in &result.feedback {
        println!("- {line}");
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv().ok();
    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let level = if opts.verbose { Level::DEBUG } else { Level::INFO };
    let filter_layer = LevelFilter::from_level(level);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let registry = Registry::standard();

    match opts.cmd {
        Cmd::Grade {
            assignment,
            handoff,
            archive,
            results,
        } => {
            let config = GraderConfig::builder()
                .archive(archive)
                .results_dir(results)
                .assignment(assignment)
                .build();
            let fetcher = HttpFetcher::from_config(&config)?;
            let batch = grade_archive(&config, &registry, &fetcher)
                .with_context(|| format!("Failed to grade `{}`", config.assignment()))?;

            eprintln!("{}", report::summary_table(&batch, config.assignment()));
            if handoff {
                JsonHandoff::new(config.paths().handoff_file()).write(&batch)?;
            }
        }
        Cmd::Check { assignment, target } => check(&registry, &assignment, &target)?,
        Cmd::Assignments => {
            for rubric in registry.iter() {
                println!("{} ({} points)", rubric.name(), rubric.max_score());
            }
        }
        Cmd::Resolve(name) => println!("{}", names::resolve(&name)?),
    };

    Ok(())
}
