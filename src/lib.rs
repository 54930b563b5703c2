//! Tactix - a room-based tic-tac-toe server.
//!
//! Anonymous WebSocket clients join named rooms and play two-player
//! tic-tac-toe with the server as the authority over game state.
//!
//! # Architecture
//!
//! - **Game**: pure rules over a 9-cell board (apply, win, draw)
//! - **Session**: the in-memory room registry and turn state machine
//! - **Protocol**: the JSON wire messages
//! - **Server**: the axum WebSocket + static-asset surface
//!
//! # Example
//!
//! ```no_run
//! use tactix::{SessionManager, server};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let sessions = SessionManager::new();
//! let app = server::router(sessions, Path::new("public"));
//!
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", 3000)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
mod game;
pub mod protocol;
pub mod server;
mod session;

pub use game::{Board, Mark, Square, rules};
pub use session::{ConnId, Outbox, RoomKey, RoomStatus, SessionManager};
