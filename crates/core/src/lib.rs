//! Servicelane Core - Shared types library.
//!
//! This crate provides common types used across all Servicelane components:
//! - `data` - Backend data access, entity services, and reporting
//! - the desktop shells that present that data (out of tree)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no backend
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
