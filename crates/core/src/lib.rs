//! Core business logic for Rejournal.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the store ports in `reassignment::ports`.
//!
//! # Modules
//!
//! - `books` - Ledgers, entries, payments and company settings
//! - `reassignment` - Moving entries and their payments to another ledger

pub mod books;
pub mod reassignment;
