//! Servicelane Data - typed access to the shop's REST backend.
//!
//! This crate is the data-access core shared by every Servicelane shell:
//! a generic repository over the backend's REST interface, one thin
//! domain-named service per entity, a read-model enrichment step for
//! display, and a pure in-memory reporting engine for the admin dashboard.
//!
//! # Architecture
//!
//! ```text
//! caller -> entity service -> repository -> transport -> backend
//!                                  |
//!                        decoded entities back up
//! ```
//!
//! The transport is a trait object, so everything above it can be exercised
//! against an in-memory backend in tests. The reporting engine never touches
//! the transport at all; it is fed materialized entity lists.
//!
//! # Modules
//!
//! - [`config`] - Backend configuration from environment variables
//! - [`transport`] - The REST transport seam and its reqwest implementation
//! - [`repository`] - Generic typed query engine shared by all services
//! - [`models`] - Persisted entities and the display read model
//! - [`services`] - Domain-named facades, one per entity
//! - [`reporting`] - Pure aggregation for the admin dashboard

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod models;
pub mod reporting;
pub mod repository;
pub mod services;
pub mod transport;

pub use config::{BackendConfig, ConfigError};
pub use repository::{Entity, FilterOp, Repository, RepositoryError};
pub use services::{ServiceError, Services};
pub use transport::{HttpTransport, Method, Response, Transport, TransportError};
