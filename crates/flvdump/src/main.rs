use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use flvprobe::FlvTraversal;
use flvprobe_amf0::DecodeLimits;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod report;

#[derive(Debug, clap::Parser)]
#[command(
    name = "flvdump",
    bin_name = "flvdump",
    about = "Prints the tags and onMetaData record of an FLV file"
)]
struct Cli {
    /// The FLV file to read
    path: PathBuf,
    /// Longest AMF0 string that will be decoded, in bytes
    #[arg(long, env = "FLVDUMP_MAX_STRING_LEN")]
    max_string_len: Option<u32>,
    /// Largest AMF0 strict array that will be decoded, in elements
    #[arg(long, env = "FLVDUMP_MAX_ARRAY_LEN")]
    max_array_len: Option<u32>,
    /// Deepest AMF0 nesting that will be followed
    #[arg(long, env = "FLVDUMP_MAX_DEPTH")]
    max_depth: Option<u32>,
    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Do not print a line per tag
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Cli {
    fn limits(&self) -> DecodeLimits {
        let defaults = DecodeLimits::default();
        DecodeLimits {
            max_string_len: self.max_string_len.unwrap_or(defaults.max_string_len),
            max_array_len: self.max_array_len.unwrap_or(defaults.max_array_len),
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
        }
    }

    fn run(self) -> anyhow::Result<()> {
        let file = File::open(&self.path).with_context(|| format!("open {}", self.path.display()))?;
        let mut reader = BufReader::new(file);

        let mut printer = report::TagPrinter::new(io::stdout(), self.quiet || self.json);
        let traversal = FlvTraversal::run_with(&mut reader, &mut printer, self.limits());

        if self.json {
            report::print_json(&traversal).context("json")?;
        } else {
            report::print_text(&traversal);
        }

        match traversal.error() {
            Some(err) => Err(anyhow::anyhow!("{err}")).with_context(|| format!("traverse {}", self.path.display())),
            None => Ok(()),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = Cli::parse().run() {
        Cli::command().error(ErrorKind::Io, format!("{err:#}")).exit()
    }
}
