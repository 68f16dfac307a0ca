pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod server;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{Result, ServeError};
pub use server::CookieServer;
