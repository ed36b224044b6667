//! # Strata Error Handling
//!
//! Layered application errors for the Strata ecosystem. Every error node
//! carries three independent, optional facets next to its cause:
//!
//! - a machine-readable **code** for programmatic branching,
//! - an end-user-safe **message**, kept out of the rendered trace,
//! - an **operation** name building a readable causal trace as the error
//!   climbs the call chain.
//!
//! Construction flows downward ([`Error::new`], [`Error::wrap`]);
//! resolution flows upward by walking the chain from the outermost node
//! ([`error_code`], [`error_message`], [`error_stacktrace`]). The walk
//! follows [`std::error::Error::source`], so foreign wrappers interposed
//! between library nodes are seen through.
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_error::prelude::*;
//!
//! fn fetch_user(id: u64) -> Result<String> {
//!     Err(Error::new("FetchUser", codes::DATABASE, format!("no row for user {id}"))
//!         .with_message("User not found"))
//! }
//!
//! fn handle() -> Result<String> {
//!     fetch_user(7).op("Handle")
//! }
//!
//! let err = handle().unwrap_err();
//! assert_eq!(err.to_string(), "Handle: FetchUser: [database_error] no row for user 7");
//! assert_eq!(error_code(&err), Some(codes::DATABASE));
//! assert_eq!(error_message(&err), Some("User not found"));
//! ```
//!
//! Constructors never fail, never log and never panic; consumers decide
//! what to do with the resolved facets. A typical handler logs the
//! rendered chain and [`error_stacktrace`] for operators, branches on
//! [`error_code`], and shows [`error_message`] (or a hardcoded default)
//! to the end user.

pub mod caller;
pub mod codes;
pub mod core;
pub mod macros;

pub use self::core::{
    Annotation, Chain, ClientFacing, Compat, Error, ErrorResultExt, HasStacktrace, Result,
    ResultExt, chain, error_code, error_message, error_stacktrace, find_source, root_cause,
};

/// Everything a call site typically needs.
pub mod prelude {
    pub use crate::codes;
    pub use crate::core::{
        ClientFacing, Compat, Error, ErrorResultExt, HasStacktrace, Result, ResultExt, chain,
        error_code, error_message, error_stacktrace, find_source,
    };
}
