//! linemark - inspect the located document tree of a markdown file

use clap::Parser;
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use linemark::markdown::{MarkdownParser, NodeId, NodeLocation, ParseResult};
use linemark::{load_options, Error, ParseOptions, Result};

#[derive(Parser)]
#[command(name = "linemark")]
#[command(version, about = "Parse markdown into a tree of blocks with source line ranges")]
struct Cli {
    /// Markdown file to parse
    file: PathBuf,

    /// Parse options file (JSON, or TOML with a .toml extension)
    #[arg(long, value_name = "PATH")]
    options: Option<PathBuf>,

    /// Print the editable block covering this line
    #[arg(long, value_name = "N", conflicts_with = "extract")]
    line: Option<usize>,

    /// Print the raw source lines START through END
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    extract: Option<Vec<usize>>,

    /// Emit compact JSON instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,
}

/// The block resolved for `--line`.
#[derive(Serialize)]
struct LineMatch<'a> {
    line: usize,
    id: Option<NodeId>,
    location: Option<NodeLocation>,
    text: Option<String>,
    node: Option<&'a linemark::MarkdownNode>,
}

fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}

fn line_match(result: &ParseResult, line: usize) -> LineMatch<'_> {
    let id = result.find_editable_node_at(line);
    LineMatch {
        line,
        location: id.as_ref().and_then(|id| result.location(id)),
        text: id.as_ref().and_then(|id| result.editable_text(id)),
        node: id.as_ref().and_then(|id| result.find_node(id)),
        id,
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = match &cli.options {
        Some(path) => load_options(path),
        None => ParseOptions::default(),
    };
    debug!("Using options: {:?}", options);

    let markdown = fs::read_to_string(&cli.file).map_err(|e| Error::FileRead {
        path: cli.file.clone(),
        source: e,
    })?;
    let result = MarkdownParser::with_options(options).parse(&markdown);
    info!(
        "Parsed {} ({} located blocks)",
        cli.file.display(),
        result.locations.len()
    );

    if let Some(range) = &cli.extract {
        let [start, end] = range.as_slice() else {
            return Err(Error::Application(
                "--extract takes exactly two line numbers".to_string(),
            ));
        };
        writeln!(io::stdout().lock(), "{}", result.extract_lines(*start, *end))?;
        return Ok(());
    }

    let output = match cli.line {
        Some(line) => to_json(&line_match(&result, line), cli.compact)?,
        None => to_json(&result, cli.compact)?,
    };
    writeln!(io::stdout().lock(), "{}", output)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
