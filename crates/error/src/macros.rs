//! Format-string construction macros.

/// Creates a root [`Error`](crate::Error) with a formatted cause.
///
/// # Examples
///
/// ```rust
/// use strata_error::{codes, new_error};
///
/// let id = 42;
/// let err = new_error!("GetUser", codes::NOT_EXISTS, "no row for user {id}");
/// assert_eq!(err.to_string(), "GetUser: [not_exists] no row for user 42");
/// ```
#[macro_export]
macro_rules! new_error {
    ($op:expr, $code:expr, $fmt:expr) => {
        $crate::Error::new($op, $code, format!($fmt))
    };
    ($op:expr, $code:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::Error::new($op, $code, format!($fmt, $($arg)*))
    };
}

/// Wraps an error, splicing a formatted context annotation into the trace.
///
/// Without a format string this is plain [`Error::wrap`](crate::Error::wrap).
///
/// # Examples
///
/// ```rust
/// use strata_error::{codes, wrap_error, Error};
///
/// let inner = Error::new("Foo", codes::DATABASE, "cannot foo");
/// let err = wrap_error!("Fizz", inner, "failed to fizz {} times", 3);
/// assert_eq!(
///     err.to_string(),
///     "Fizz: (failed to fizz 3 times): Foo: [database_error] cannot foo",
/// );
/// ```
#[macro_export]
macro_rules! wrap_error {
    ($op:expr, $err:expr) => {
        $crate::Error::wrap($op, $err)
    };
    ($op:expr, $err:expr, $fmt:expr) => {
        $crate::Error::wrap_info($op, $err, format!($fmt))
    };
    ($op:expr, $err:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::Error::wrap_info($op, $err, format!($fmt, $($arg)*))
    };
}
