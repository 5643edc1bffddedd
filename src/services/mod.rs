//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the book table's rules and its persistence so route
//! handlers stay focused on protocol translation.

pub mod books;
pub mod persistence;
pub mod search;
