use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use riskscan::{Analyzer, AnalyzerConfig, Error, ScanSummary};

#[derive(Parser)]
#[command(
    name = "riskscan",
    about = "Flag risky video titles and descriptions",
    version
)]
struct Cli {
    /// JSON-lines files of {"title": ..., "description": ...} (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// Analyze a single title instead of reading JSON lines
    #[arg(long, conflicts_with = "files")]
    title: Option<String>,

    /// Description for --title
    #[arg(long, requires = "title", default_value = "")]
    description: String,

    /// Analyzer settings (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one storage record per flagged category instead of verdicts
    #[arg(long)]
    records: bool,

    /// Print scan totals after all inputs
    #[arg(long)]
    summary: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Deserialize)]
struct VideoInput {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

struct Scan {
    analyzer: Analyzer,
    summary: ScanSummary,
    records: bool,
    pretty: bool,
}

impl Scan {
    fn analyze(&mut self, video: &VideoInput, out: &mut impl Write) -> Result<(), Error> {
        let verdict = self.analyzer.analyze_content(&video.title, &video.description);
        self.summary.record(&verdict);

        if self.records {
            let limit = self.analyzer.config().flagged_text_limit;
            for record in verdict.to_records(&video.title, &video.description, limit) {
                self.emit(&record, out)?;
            }
        } else {
            self.emit(&verdict, out)?;
        }
        Ok(())
    }

    fn analyze_lines<R: BufRead>(
        &mut self,
        reader: R,
        source: &str,
        out: &mut impl Write,
    ) -> Result<(), Error> {
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let video: VideoInput = serde_json::from_str(&line).map_err(|e| {
                error!(source, line = number + 1, "invalid input line");
                Error::Json(e)
            })?;
            self.analyze(&video, out)?;
        }
        info!(source, videos = self.summary.videos_analyzed, "input done");
        Ok(())
    }

    fn emit<T: Serialize>(&self, value: &T, out: &mut impl Write) -> Result<(), Error> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, value)?;
        } else {
            serde_json::to_writer(&mut *out, value)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = match &cli.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };

    let mut scan = Scan {
        analyzer: Analyzer::with_config(config)?,
        summary: ScanSummary::new(),
        records: cli.records,
        pretty: cli.pretty,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(title) = cli.title {
        let video = VideoInput {
            title,
            description: cli.description,
        };
        scan.analyze(&video, &mut out)?;
    } else if cli.files.is_empty() {
        let stdin = io::stdin();
        scan.analyze_lines(stdin.lock(), "stdin", &mut out)?;
    } else {
        for path in &cli.files {
            let file = File::open(path)?;
            scan.analyze_lines(BufReader::new(file), &path.to_string_lossy(), &mut out)?;
        }
    }

    if cli.summary {
        scan.emit(&scan.summary, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
