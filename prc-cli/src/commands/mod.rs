//! CLI command implementations

pub mod batch;
pub mod config;
pub mod context;
pub mod lines;
pub mod list;
pub mod run;
pub mod single;

pub use batch::BatchArgs;
pub use config::ConfigArgs;
pub use context::Context;
pub use lines::LinesArgs;
pub use list::ListArgs;
pub use single::{AddArgs, EditArgs, ReactArgs, ReplyArgs, ResolveArgs};
