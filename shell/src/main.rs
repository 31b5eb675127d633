use anyhow::Result;
use clap::Parser;
use fre_core::{FsSource, IndexMode, MatchMode, DEFAULT_TOP_K};
use fre_shell::{Config, OutputFormat, Session};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "fre")]
#[command(about = "Interactive word-frequency index over the files of a directory", long_about = None)]
struct Args {
    /// Maximum number of results printed by `search`
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Add onto existing counts when indexing again instead of starting fresh
    #[arg(long, default_value_t = false)]
    accumulate: bool,
    /// Only return files that contain every query term
    #[arg(long, default_value_t = false)]
    strict_and: bool,
    /// Output format for `index` and `search`
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
    /// Directory to index before the first prompt
    #[arg(long)]
    index: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();

    let config = Config {
        top_k: args.top_k,
        index_mode: if args.accumulate { IndexMode::Accumulate } else { IndexMode::Fresh },
        match_mode: if args.strict_and { MatchMode::All } else { MatchMode::Any },
        output: args.output,
    };
    let list_dir = std::env::current_dir()?;
    let mut session = Session::new(FsSource, config, list_dir);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    if let Some(dir) = args.index {
        session.index_path(&dir, &mut stdout)?;
        stdout.flush()?;
    }
    session.run(stdin.lock(), &mut stdout)
}
