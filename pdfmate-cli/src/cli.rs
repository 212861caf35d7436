//! Command-line interface definition for pdfmate.
//!
//! Each subcommand maps onto one library operation; the global flags map
//! onto [`Config`].

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pdfmate::config::{CompressionLevel, Config, OperationOptions, SourcePolicy};
use pdfmate::error::Result;

/// Merge, split and compress PDF documents.
#[derive(Parser, Debug)]
#[command(name = "pdfmate")]
#[command(version)]
#[command(about = "Merge, split and compress PDF documents", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Directory receiving the output files
    ///
    /// Output names are generated from the source name and a timestamp;
    /// existing files are never overwritten.
    #[arg(short, long, value_name = "DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// Mark the outputs for sharing once they are saved
    ///
    /// The flag is echoed in the JSON outcome for the calling shell.
    #[arg(long, global = true)]
    pub share: bool,

    /// Print the outcome (or error) as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output - show statistics and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Merge files in order into one document
    ///
    /// Example:
    ///   pdfmate merge cover.pdf body.pdf appendix.pdf -o out/
    Merge {
        /// Input PDF files, in output order
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<PathBuf>,

        /// Skip unreadable inputs with a warning instead of failing
        #[arg(long)]
        skip_unreadable: bool,

        /// Add one bookmark per input, titled with its file name
        #[arg(short, long)]
        bookmarks: bool,
    },

    /// Split a file into chunks of N pages
    ///
    /// The last chunk holds the remaining pages.
    Split {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Pages per output file
        #[arg(short = 'n', long, value_name = "N")]
        pages_per_file: u32,
    },

    /// Extract pages START through END into a new file
    ///
    /// END is clamped to the last page.
    Range {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// First page (1-based)
        #[arg(value_name = "START")]
        start: u32,

        /// Last page (1-based, inclusive)
        #[arg(value_name = "END")]
        end: u32,
    },

    /// Recompress a file's streams
    Compress {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Compression level
        ///
        /// - low: fast deflate, classic xref table
        /// - normal: balanced deflate, compact xref streams (default)
        /// - high: strongest deflate, compact xref streams
        #[arg(short, long, value_name = "LEVEL", default_value = "normal")]
        #[arg(value_parser = ["low", "normal", "high"])]
        level: String,
    },

    /// Show page count, version and metadata of a file
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

impl Cli {
    /// Convert the parsed arguments into a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the flags conflict or the output directory does
    /// not exist.
    pub fn to_config(&self) -> Result<Config> {
        let mut options = OperationOptions {
            share_after_save: self.global.share,
            ..OperationOptions::default()
        };
        if let Command::Merge {
            skip_unreadable,
            bookmarks,
            ..
        } = &self.command
        {
            options.bookmarks = *bookmarks;
            if *skip_unreadable {
                options.source_policy = SourcePolicy::Skip;
            }
        }

        let config = Config {
            output_dir: self.global.output_dir.clone(),
            options,
            verbose: self.global.verbose,
            quiet: self.global.quiet,
            json: self.global.json,
        };
        if !matches!(self.command, Command::Info { .. }) {
            config.validate()?;
        }

        Ok(config)
    }

    /// Compression level of a `compress` invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if the level name is not recognised.
    pub fn compression_level(level: &str) -> Result<CompressionLevel> {
        level.parse()
    }
}
