pub mod add;
pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config_cmd;
pub mod list;
pub mod toggle;
