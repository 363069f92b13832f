//! HexForge Application
//!
//! Headless shell over the core: map files, encounter rolls and
//! generated-edit batches from the command line.

mod app;
mod cli;

pub use app::{App, AppError, ResponseFile};
pub use cli::{Cli, Command, GenerateKind};
