//! Traits and definitions shared by the mapview crates.
//!
//! # Modules
//!
//! - [`memory_owner`]: the contract between a memory provider and the views
//!   that address its bytes

pub mod memory_owner;
