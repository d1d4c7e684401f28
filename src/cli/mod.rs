//! Command-line surface: argument types and the command dispatcher

pub mod dispatcher;
pub mod main_types;
