//! Todo service: a transactional task-list data layer.
//!
//! This crate provides the record model, repository, transaction-owning
//! service and transfer schemas of a small todo list backed by one
//! relational table, along with `PostgreSQL` and in-memory store adapters.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`todo`]: Todo records, persistence and orchestration
//! - [`config`]: Explicit database and pool settings

pub mod config;
pub mod todo;
