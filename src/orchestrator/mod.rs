//! Orchestration layer.
//!
//! `dispatcher` fans one lookup out across the registry; `app` wraps a whole
//! run, from startup logging to the report file. Nothing below this layer
//! knows about concurrency bounds or report files.

pub mod app;
pub mod dispatcher;

pub use app::App;
pub use dispatcher::dispatch;
