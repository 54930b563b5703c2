//! Command-line interface for tactix.

use clap::Parser;
use std::path::PathBuf;

/// Tactix - two-player tic-tac-toe over WebSockets
#[derive(Parser, Debug)]
#[command(name = "tactix")]
#[command(about = "Room-based tic-tac-toe server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    pub port: u16,

    /// Directory of static assets served alongside the game channel
    #[arg(long, default_value = "public")]
    pub assets: PathBuf,
}
