pub mod add;
pub mod common;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod favorite;
pub mod list;
pub mod search;
pub mod shell;
pub mod status;
