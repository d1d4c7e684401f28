//! Terminal output: tables of records and view-state rendering

pub mod state;
pub mod table;

pub use state::{exit_code, render_state};
pub use table::{PermissionRow, TableDisplay, TableRow};
