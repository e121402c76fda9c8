//! Domain layer for the motos service.
//!
//! Holds everything that does not need a database or an HTTP stack: shared
//! type aliases, the `tipo` enumeration, field validation helpers, the
//! timestamp auditing policy and the domain error type.

pub mod audit;
pub mod error;
pub mod moto;
pub mod pagination;
pub mod types;
pub mod validation;
