//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display.

pub mod account;
pub mod register;
pub mod statement;

pub use account::format_account_list;
pub use register::{format_register, format_register_row};
pub use statement::{format_statement_details, format_statement_list};
