pub mod config;
pub mod error;
pub mod status;
pub mod text;
pub mod types;

// Keep the public surface small and intentional.
pub use config::*;
pub use error::*;
pub use status::*;
pub use text::*;
pub use types::*;
