//! CLI domain: parse, route, and output only.
//! Document handling lives in `config` and `state`; the route table only calls into them.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ConfigCommands, StateCommands};
pub use route::RunContext;
