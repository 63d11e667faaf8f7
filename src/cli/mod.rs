//! CLI module for ElStudio
//!
//! Provides command-line interface parsing for the elstudio-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod admin;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ElStudio administration backend
#[derive(Parser, Debug)]
#[command(
    name = "elstudio-server",
    version,
    about = "ElStudio - authentication and administration backend",
    long_about = "Authentication, user, role and organization administration API.\n\n\
                  Run without arguments to start the server, or use 'create-admin' to \
                  bootstrap the first super_admin account.",
    after_help = "EXAMPLES:\n    \
                  elstudio-server                                   # Start the server\n    \
                  elstudio-server --config prod.toml serve          # Use a custom config file\n    \
                  elstudio-server create-admin --email a@b.c --password s3cret\n    \
                  elstudio-server config                            # Show effective configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "elstudio.toml", global = true)]
    pub config: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Create a super_admin account, or grant super_admin to an existing one
    ///
    /// The account is created with the given password and does not have to
    /// change it at first login.
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long, env = "ELSTUDIO_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, default_value = "Admin")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// Show the effective configuration
    Config {
        /// Only validate, print nothing on success
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
