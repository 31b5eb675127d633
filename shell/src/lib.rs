use anyhow::Result;
use clap::ValueEnum;
use fre_core::{index_directory, search, DirectorySource, IndexMode, IndexStats, InvertedIndex, MatchMode, SearchHit, DEFAULT_TOP_K};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub top_k: usize,
    pub index_mode: IndexMode,
    pub match_mode: MatchMode,
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K, index_mode: IndexMode::Fresh, match_mode: MatchMode::Any, output: OutputFormat::Text }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `index <path>`; `None` when the path is missing.
    Index(Option<String>),
    List,
    Search(String),
    Help,
    Quit,
    Empty,
    Unsupported(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };
        match keyword.to_ascii_lowercase().as_str() {
            "index" if rest.is_empty() => Command::Index(None),
            "index" => Command::Index(Some(rest.to_string())),
            "search" => Command::Search(rest.to_string()),
            "list" if rest.is_empty() => Command::List,
            "help" if rest.is_empty() => Command::Help,
            "quit" if rest.is_empty() => Command::Quit,
            _ => Command::Unsupported(line.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Serialize)]
struct IndexResponse<'a> {
    path: &'a Path,
    stats: &'a IndexStats,
    throughput_mb_s: f64,
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    query: &'a str,
    took_s: f64,
    results: &'a [SearchHit],
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// One interactive session: owns the index and answers commands one at a time.
pub struct Session<S> {
    source: S,
    index: InvertedIndex,
    config: Config,
    list_dir: PathBuf,
}

impl<S: DirectorySource> Session<S> {
    pub fn new(source: S, config: Config, list_dir: PathBuf) -> Self {
        Self { source, index: InvertedIndex::new(), config, list_dir }
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<()> {
        writeln!(out, "File Retrieval Engine v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "Type 'help' for a list of supported commands.")?;
        writeln!(out)?;
        let mut buf = Vec::new();
        loop {
            write!(out, "> ")?;
            out.flush()?;
            buf.clear();
            // invalid UTF-8 is replaced, never fatal
            let command = if input.read_until(b'\n', &mut buf)? == 0 {
                writeln!(out)?;
                Command::Quit
            } else {
                Command::parse(&String::from_utf8_lossy(&buf))
            };
            if self.execute(command, out)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        match command {
            Command::Index(Some(path)) => self.index_path(Path::new(&path), out)?,
            Command::Index(None) => writeln!(out, "Invalid command. Usage: index <dataset path>")?,
            Command::List => self.list(out)?,
            Command::Search(query) => self.search(&query, out)?,
            Command::Help => print_help(out)?,
            Command::Empty => {}
            Command::Unsupported(_) => {
                writeln!(out, "Unsupported command. Type 'help' for a list of supported commands.")?
            }
            Command::Quit => {
                writeln!(out, "Closing application...")?;
                writeln!(out, "Application terminated.")?;
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Index `path`, reporting the outcome on `out`. Indexing errors are
    /// reported, never returned; only write failures propagate.
    pub fn index_path<W: Write>(&mut self, path: &Path, out: &mut W) -> Result<()> {
        let stats = match index_directory(&self.source, &mut self.index, path, self.config.index_mode) {
            Ok(stats) => stats,
            Err(err) => {
                tracing::warn!(error = %err, "index command failed");
                return match self.config.output {
                    OutputFormat::Text => Ok(writeln!(out, "Indexing failed: {err}")?),
                    OutputFormat::Json => write_json(out, &ErrorResponse { error: err.to_string() }),
                };
            }
        };
        let throughput = stats.throughput_mb_per_s();
        match self.config.output {
            OutputFormat::Text => {
                for failure in &stats.failures {
                    writeln!(out, "Skipped {}: {}", failure.path.display(), failure.reason)?;
                }
                writeln!(out, "Indexing completed. {} file(s) indexed.", stats.files_indexed)?;
                writeln!(out, "Indexing throughput: {throughput:.2} MB/s")?;
            }
            OutputFormat::Json => {
                write_json(out, &IndexResponse { path, stats: &stats, throughput_mb_s: throughput })?;
            }
        }
        Ok(())
    }

    fn search<W: Write>(&self, query: &str, out: &mut W) -> Result<()> {
        let start = std::time::Instant::now();
        let hits = search(&self.index, query, self.config.top_k, self.config.match_mode);
        let took_s = start.elapsed().as_secs_f64();
        match self.config.output {
            OutputFormat::Text => {
                if hits.is_empty() {
                    writeln!(out, "No matching files.")?;
                    return Ok(());
                }
                writeln!(out, "Top {} file(s):", hits.len())?;
                for hit in &hits {
                    writeln!(out, "{} - Total occurrences: {}", hit.file_id, hit.score)?;
                }
            }
            OutputFormat::Json => write_json(out, &SearchResponse { query, took_s, results: &hits })?,
        }
        Ok(())
    }

    fn list<W: Write>(&self, out: &mut W) -> Result<()> {
        let names: Vec<String> = WalkDir::new(&self.list_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable directory entry");
                    None
                }
            })
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        if names.is_empty() {
            writeln!(out, "Directory is empty or does not exist.")?;
            return Ok(());
        }
        writeln!(out, "Files in directory:")?;
        for name in names {
            writeln!(out, "{name}")?;
        }
        Ok(())
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "Supported commands:")?;
    writeln!(out, "- index <dataset path>: Index all files in the given dataset path.")?;
    writeln!(out, "- list: List all files in the current directory.")?;
    writeln!(out, "- search <AND query>: Search the index, e.g. 'search cats AND dogs'.")?;
    writeln!(out, "- quit: Close the application.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("  index /tmp/data  "), Command::Index(Some("/tmp/data".into())));
        assert_eq!(Command::parse("index"), Command::Index(None));
        assert_eq!(Command::parse("INDEX  my docs"), Command::Index(Some("my docs".into())));
        assert_eq!(Command::parse("search cats AND dogs"), Command::Search("cats AND dogs".into()));
        assert_eq!(Command::parse("search"), Command::Search(String::new()));
        assert_eq!(Command::parse("Help"), Command::Help);
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse("list"), Command::List);
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("frobnicate"), Command::Unsupported("frobnicate".into()));
        assert_eq!(Command::parse("quit now"), Command::Unsupported("quit now".into()));
    }
}
