//! Command-line argument parsing for the entry driver binary
//!
//! Each input line is typed into a fresh, focused entry with completion
//! running against the given address books, then the entry is blurred and
//! its destinations printed.

use clap::Parser;
use std::path::PathBuf;

use crate::config::EntryConfig;

/// Type recipient lines into a destination entry and print what it makes of them
#[derive(Parser, Debug)]
#[command(name = "destination-entry", version, about)]
pub struct CliArgs {
    /// Lines to type; read from stdin when none are given
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Address books to complete from (YAML)
    #[arg(short, long, value_name = "PATH")]
    pub books: Option<PathBuf>,

    /// Config file to use instead of the one in the config directory
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show addresses next to resolved contact names
    #[arg(long)]
    pub show_address: bool,

    /// Characters needed before contacts are queried
    #[arg(long, value_name = "N")]
    pub min_length: Option<usize>,

    /// Press Enter after each address so type-ahead completions are kept
    #[arg(short, long)]
    pub accept: bool,
}

/// Options derived from CLI arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub inputs: Vec<String>,
    pub books: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub show_address: bool,
    pub minimum_query_length: Option<usize>,
    pub accept: bool,
}

impl CliArgs {
    pub fn into_options(self) -> Result<RunOptions, String> {
        if self.min_length == Some(0) {
            return Err("--min-length must be at least 1".to_string());
        }

        Ok(RunOptions {
            inputs: self.inputs,
            books: self.books,
            config_path: self.config,
            show_address: self.show_address,
            minimum_query_length: self.min_length,
            accept: self.accept,
        })
    }
}

impl RunOptions {
    /// Command-line flags override the loaded config
    pub fn apply(&self, mut config: EntryConfig) -> EntryConfig {
        if self.show_address {
            config.show_address = true;
        }
        if let Some(len) = self.minimum_query_length {
            config = config.with_minimum_query_length(len);
        }
        config
    }

    /// Addresses of one input line, in typing order
    pub fn segments(line: &str) -> Vec<&str> {
        line.split(|c| c == ',' || c == ';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}
