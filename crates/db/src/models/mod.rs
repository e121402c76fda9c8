//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - One `Deserialize` + `Validate` DTO per write operation; each DTO is the
//!   validation group for that operation

pub mod moto;
