//! CLI command handlers, one per file.

mod completions;
mod fetch;
mod forget;
mod status;

pub use completions::run_completions;
pub use fetch::run_fetch;
pub use forget::run_forget;
pub use status::run_status;
