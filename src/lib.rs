//! Tally - double-entry personal ledger for the terminal
//!
//! This library provides the core functionality for the Tally CLI. Every
//! transaction is a set of line items whose amounts sum to zero; the
//! consistency engine keeps that invariant intact while recategorizing,
//! reconciling statements, and recomputing running balances.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, transactions, statements, rules)
//! - `storage`: Single-document JSON entity store with atomic write transactions
//! - `services`: Business logic layer (the consistency engine lives here)
//! - `audit`: Audit logging system
//! - `display`: Terminal table rendering
//! - `export`: CSV export
//! - `cli`: Command handlers

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{TallyError, TallyResult};
