//! CLI command handlers, one file per command.

mod config_path;
mod get;
mod list;
mod resources;

pub use config_path::run_config_path;
pub use get::run_get;
pub use list::{run_list, ListArgs};
pub use resources::run_resources;

#[cfg(test)]
pub(crate) use list::write_items;
