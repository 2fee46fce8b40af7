pub mod cli;
pub mod load;
pub mod types;

pub use cli::Cli;
pub use load::{generate_token, load_configs};
pub use types::{AppConfig, ToolPaths};
