//! Command line arguments.

use clap::{Parser, ValueEnum};

use crate::IndexingError;

/// Default number of documents per bulk request.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// How rows are read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Stream through a server-side cursor.
    Cursor,
    /// Probe every primary key with a point lookup.
    PkScan,
}

#[derive(Debug, Parser)]
#[command(name = "search-reindexer")]
#[command(about = "Rebuild a search index from a Postgres table", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Documents buffered before a bulk submission
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Rows fetched from the cursor per round trip (default: chunk size)
    #[arg(long)]
    pub fetch_window: Option<usize>,

    /// Extraction strategy
    #[arg(long, value_enum, default_value_t = Strategy::Cursor)]
    pub strategy: Strategy,

    /// Exclusive upper bound of keys to scan (default: largest key in the table + 1)
    #[arg(long)]
    pub key_upper_bound: Option<i64>,
}

impl Cli {
    /// Reject flag combinations before any I/O happens.
    pub fn validate(&self) -> Result<(), IndexingError> {
        if self.chunk_size == 0 {
            return Err(IndexingError::config("--chunk-size must be at least 1"));
        }
        if self.fetch_window == Some(0) {
            return Err(IndexingError::config("--fetch-window must be at least 1"));
        }
        if let Some(bound) = self.key_upper_bound {
            if self.strategy != Strategy::PkScan {
                return Err(IndexingError::config(
                    "--key-upper-bound only applies to --strategy pk-scan",
                ));
            }
            if bound < 0 {
                return Err(IndexingError::config("--key-upper-bound must not be negative"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("search-reindexer").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert!(!cli.verbose);
        assert_eq!(cli.chunk_size, 1000);
        assert_eq!(cli.strategy, Strategy::Cursor);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_pk_scan_flags() {
        let cli = parse(&[
            "--strategy",
            "pk-scan",
            "--key-upper-bound",
            "500",
            "--chunk-size",
            "50",
        ]);
        assert_eq!(cli.strategy, Strategy::PkScan);
        assert_eq!(cli.key_upper_bound, Some(500));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_invalid_combinations() {
        assert!(parse(&["--chunk-size", "0"]).validate().is_err());
        assert!(parse(&["--fetch-window", "0"]).validate().is_err());
        assert!(parse(&["--key-upper-bound", "10"]).validate().is_err());
        assert!(parse(&["--strategy", "pk-scan", "--key-upper-bound=-1"])
            .validate()
            .is_err());
    }

    #[test]
    fn test_non_numeric_chunk_size_fails_to_parse() {
        assert!(Cli::try_parse_from(["search-reindexer", "--chunk-size", "lots"]).is_err());
    }
}
