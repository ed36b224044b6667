//! Result type and extension traits.
//!
//! The extension methods only ever touch the error path, so call sites can
//! apply them unconditionally: on `Ok` nothing is constructed and nothing
//! is captured.

use std::error::Error as StdError;

use smol_str::SmolStr;

use crate::caller;
use crate::core::error::Error;

/// Result type for operations that fail with a chain [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Adds an operation name to the error path of any `Result`.
pub trait ResultExt<T> {
    /// Wraps the error with an explicit operation name.
    ///
    /// ```rust
    /// use strata_error::{codes, Error, ErrorResultExt, Result, ResultExt};
    ///
    /// fn get() -> Result<(), std::io::Error> {
    ///     Err(std::io::Error::other("connection refused"))
    /// }
    ///
    /// fn get_user() -> Result<()> {
    ///     get().op("GetUser").code(codes::DATABASE)
    /// }
    ///
    /// let err = get_user().unwrap_err();
    /// assert_eq!(err.to_string(), "GetUser: [database_error] connection refused");
    /// ```
    fn op(self, op: impl Into<SmolStr>) -> Result<T>;

    /// Wraps the error with the operation name of the calling function,
    /// resolved from the live call stack. Evaluated only on the error
    /// path.
    fn op_here(self) -> Result<T>;

    /// Wraps the error with an operation name and a lazily built context
    /// annotation.
    fn op_info(self, op: impl Into<SmolStr>, info: impl FnOnce() -> String) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn op(self, op: impl Into<SmolStr>) -> Result<T> {
        self.map_err(|e| Error::wrap(op.into(), e))
    }

    #[inline(never)]
    fn op_here(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(Error::wrap(caller::caller_name(caller::DIRECT_CALLER), e)),
        }
    }

    fn op_info(self, op: impl Into<SmolStr>, info: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| Error::wrap_info(op.into(), e, info()))
    }
}

/// Fluent facet setters for results already carrying a chain [`Error`].
///
/// Mirrors wrapping call sites that immediately classify what they wrapped,
/// such as tagging a storage failure before handing it up.
pub trait ErrorResultExt<T> {
    /// Sets the classification code on the error path.
    fn code(self, code: impl Into<SmolStr>) -> Result<T>;

    /// Sets the end-user-safe message on the error path.
    fn message(self, message: impl Into<String>) -> Result<T>;
}

impl<T> ErrorResultExt<T> for Result<T> {
    fn code(self, code: impl Into<SmolStr>) -> Result<T> {
        self.map_err(|e| e.with_code(code))
    }

    fn message(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_message(message))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::codes;
    use crate::core::chain::{error_code, error_message};

    fn io_down() -> Result<u32, std::io::Error> {
        Err(std::io::Error::other("io down"))
    }

    #[test]
    fn op_wraps_only_the_error_path() {
        let ok: Result<u32, std::io::Error> = Ok(7);
        assert_eq!(ok.op("GetUser").expect("ok passes through"), 7);

        let err = io_down().op("GetUser").expect_err("wrapped");
        assert_eq!(err.to_string(), "GetUser: io down");
    }

    #[test]
    fn op_here_captures_the_enclosing_function() {
        let err = io_down().op_here().expect_err("wrapped");
        assert_eq!(
            err.operation(),
            Some("op_here_captures_the_enclosing_function")
        );
    }

    #[test]
    fn op_info_is_lazy() {
        let ok: Result<u32, std::io::Error> = Ok(7);
        let ok = ok.op_info("GetUser", || unreachable!("must not run on Ok"));
        assert_eq!(ok.expect("ok passes through"), 7);

        let err = io_down()
            .op_info("GetUser", || format!("cannot find id {}", 42))
            .expect_err("wrapped");
        assert_eq!(err.to_string(), "GetUser: (cannot find id 42): io down");
    }

    #[test]
    fn code_and_message_set_on_the_error_path() {
        let err = io_down()
            .op("GetUser")
            .code(codes::DATABASE)
            .message("Could not load your profile")
            .expect_err("wrapped");

        assert_eq!(error_code(&err), Some(codes::DATABASE));
        assert_eq!(error_message(&err), Some("Could not load your profile"));
    }
}
