pub mod commands;

pub use commands::{execute, open_cache, resolve_store_path, Commands, DEFAULT_STORE_PATH};
