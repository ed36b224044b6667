//! Core chain types and resolution.
//!
//! - [`error`](crate::core::error) - the [`Error`] node, construction and mutation
//! - [`chain`](crate::core::chain) - chain walking and facet resolvers
//! - [`compat`](crate::core::compat) - capability contracts for foreign types
//! - [`result`](crate::core::result) - `Result` alias and extension traits

pub mod chain;
pub mod compat;
pub mod error;
pub mod result;

#[cfg(feature = "serde")]
mod serde;

pub use chain::{Chain, chain, error_code, error_message, error_stacktrace, find_source, root_cause};
pub use compat::{ClientFacing, Compat, HasStacktrace};
pub use error::{Annotation, Error};
pub use result::{ErrorResultExt, Result, ResultExt};
