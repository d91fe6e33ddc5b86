//! Command-line surface. Every flag is optional; with none given the tool
//! recovers from `SOURCE_URL` into `OUTPUT_PATH`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "recover", version, about = "Fetch, decrypt, and store a passphrase-sealed secret")]
pub struct Cli {
    /// Override SOURCE_URL.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Override OUTPUT_PATH.
    #[arg(long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch the blob, decrypt it, and write the plaintext (default).
    Recover,
    /// Seal a UTF-8 text file into a base64 blob printed on stdout.
    Seal {
        /// File whose contents are sealed.
        #[arg(long)]
        input: PathBuf,
    },
}

impl Cli {
    pub fn action(&self) -> Command {
        self.command.clone().unwrap_or(Command::Recover)
    }
}
