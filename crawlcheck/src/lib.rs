// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{CrawlArgs, expand_path, exit_code, load_config, verbosity_level};
