//! blame-lens - inspect captured blame output the way an editor would
//!
//! # Usage
//! ```bash
//! git blame -f -n src/main.rs > captures/src/main.rs.blame
//! blame-lens range src/main.rs --captures captures --start 10 --end 20
//! blame-lens range src/main.rs --captures captures --sha 1a2b3c4d
//! blame-lens uris src/main.rs --captures captures --root "$PWD"
//! blame-lens decode 'blame:1. Jane Doe, 2021-03-04 - src/1a2b3c4d: main.rs?{...}'
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blame_lens::git::{BlameStore, CapturedSource};
use blame_lens::models::{CommitRecord, LineRecord, Range};
use blame_lens::resource::{decode_resource_uri, encode_resource_uri};
use blame_lens::LensConfig;

/// Slice captured blame output by visible line range
#[derive(Parser)]
#[command(name = "blame-lens")]
#[command(about = "Slice captured blame output by line range", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// URI scheme used for resource identifiers
    #[arg(long, global = true, default_value = "blame")]
    scheme: String,

    /// chrono format for commit dates in resource identifiers
    #[arg(long, global = true, default_value = "%Y-%m-%d")]
    date_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print blame for a line range as JSON
    Range {
        /// File identifier (capture is read from <CAPTURES>/<FILE>.blame)
        file: String,

        #[command(flatten)]
        lines: LineArgs,

        /// Only lines attributed to this commit hash
        #[arg(long)]
        sha: Option<String>,
    },
    /// Print one resource identifier per commit in a line range
    Uris {
        file: String,

        #[command(flatten)]
        lines: LineArgs,

        /// Repository root joined with commit paths
        #[arg(long)]
        root: PathBuf,
    },
    /// Decode a resource identifier's query
    Decode { uri: String },
}

#[derive(Args)]
struct LineArgs {
    /// First line (0-indexed)
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// Last line, inclusive (0-indexed)
    #[arg(long, default_value_t = u32::MAX)]
    end: u32,

    /// Directory holding captured blame output
    #[arg(long, default_value = ".")]
    captures: PathBuf,
}

impl LineArgs {
    fn range(&self) -> Range {
        Range::lines(self.start, self.end)
    }

    fn store(&self) -> BlameStore<CapturedSource> {
        BlameStore::new(CapturedSource::new(&self.captures))
    }
}

/// Range output with commits in first-appearance order
#[derive(Serialize)]
struct RangeOutput<'a> {
    commits: Vec<&'a CommitRecord>,
    lines: &'a [LineRecord],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = LensConfig {
        scheme: cli.scheme,
        date_format: cli.date_format,
    };

    match cli.command {
        Commands::Range { file, lines, sha } => {
            let store = lines.store();
            let range = lines.range();

            let json = match sha {
                Some(sha) => {
                    let view = store.blame_for_sha_range(&file, &sha, &range).await?;
                    if view.commit.is_none() {
                        tracing::warn!("Commit {} does not appear in {}", sha, file);
                    }
                    serde_json::to_string_pretty(&view)?
                }
                None => {
                    let result = store.blame_for_range(&file, &range).await?;
                    serde_json::to_string_pretty(&RangeOutput {
                        commits: result.ordered_commits(),
                        lines: &result.lines,
                    })?
                }
            };
            println!("{}", json);
        }
        Commands::Uris { file, lines, root } => {
            let store = lines.store();
            let range = lines.range();

            let result = store.blame_for_range(&file, &range).await?;
            let commits = result.ordered_commits();
            for (index, commit) in commits.iter().enumerate() {
                let uri = encode_resource_uri(&config, &root, commit, &range, index, commits.len())?;
                println!("{}", uri);
            }
        }
        Commands::Decode { uri } => {
            let query = decode_resource_uri(&uri)?;
            println!("{}", serde_json::to_string_pretty(&query)?);
        }
    }

    Ok(())
}
