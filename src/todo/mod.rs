//! Todo list data service.
//!
//! Creates, lists and bulk-deletes todo records held in a single table. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The stateless data-access translator in [`repository`]
//! - Transaction-owning orchestration in [`services`]
//! - Boundary input/output shapes in [`schemas`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod repository;
pub mod schemas;
pub mod services;
