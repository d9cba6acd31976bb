//! # osq-core: The Vocabulary of the Query Engine
//!
//! Everything the engine agrees on before it touches a cloud:
//!
//! - [`Preset`]: the closed set of comparison operators, grouped by kind.
//! - [`ValueKind`] and [`Property`]: what a resource attribute holds and
//!   how it is named.
//! - [`ResourceType`] / [`LookupTarget`]: which OpenStack collections can be
//!   queried, and which can be resolved by id for derived properties.
//! - [`QueryError`]: the error taxonomy shared by every layer.
//!
//! The comparison laws (`IntegerPreset::compare`, `DateTimePreset::compare`,
//! `GenericPreset::matches`) live here as pure functions so they can be proven
//! in `osq-verify` independently of any I/O.

pub mod error;
pub mod preset;
pub mod property;
pub mod resource;

pub use error::{BoxError, QueryError, Result};
pub use preset::{contains, DateTimePreset, GenericPreset, IntegerPreset, Preset, StringPreset};
pub use property::{Property, ValueKind};
pub use resource::{LookupTarget, ResourceType};
