//! Command-line interface

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "electricians-service")]
#[command(about = "Electricians directory HTTP service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Keep records in memory instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Mint a bearer token signed with JWT_SIGNER_SECRET")]
    IssueToken {
        #[arg(long, help = "Subject identifier placed in the id claim")]
        subject: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, help = "Numeric permission level")]
        permission_level: i64,
    },
}

impl Cli {
    /// The subcommand to run; bare invocation serves from PostgreSQL
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve { memory: false })
    }
}
