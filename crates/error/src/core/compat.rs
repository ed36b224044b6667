//! Capability contracts for foreign error types.
//!
//! Types from outside the library participate in facet resolution by
//! implementing [`ClientFacing`] and/or [`HasStacktrace`]. The two
//! contracts are independent; a type may implement either without the
//! other.
//!
//! Resolution walks a type-erased `dyn Error` chain, and erased links can
//! only be rediscovered by downcasting to a concrete type. [`Compat`] is
//! that concrete anchor: constructing it from a foreign implementor keeps
//! the facet accessors reachable after erasure. Library nodes and plain
//! foreign wrappers need no anchor; wrappers cooperate through an ordinary
//! [`source`](StdError::source).

use std::error::Error as StdError;
use std::fmt;

/// Exposes client-oriented facets of an error: a short classification
/// code and an end-user-safe message.
///
/// Implemented by [`Error`](crate::Error) for its own facets. Foreign
/// types implement it and ride through chains inside [`Compat`].
///
/// ```rust
/// use strata_error::{error_code, ClientFacing, Compat, Error};
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("row not found")]
/// struct DbError;
///
/// impl ClientFacing for DbError {
///     fn client_code(&self) -> Option<&str> {
///         Some("not_exists")
///     }
///
///     fn client_message(&self) -> Option<&str> {
///         None
///     }
/// }
///
/// let err = Error::wrap("GetUser", Compat::client_facing(DbError));
/// assert_eq!(error_code(&err), Some("not_exists"));
/// ```
pub trait ClientFacing: StdError {
    /// Short classification token, such as `"database_error"`.
    fn client_code(&self) -> Option<&str>;

    /// End-user-safe message, logically separate from the error cause.
    fn client_message(&self) -> Option<&str>;
}

/// Exposes a captured stacktrace snapshot.
///
/// Independent of [`ClientFacing`]; resolution picks the innermost
/// non-empty snapshot in a chain.
pub trait HasStacktrace: StdError {
    /// The captured snapshot, if one was taken.
    fn stacktrace(&self) -> Option<&str>;
}

/// Per-capability accessor thunk. Monomorphized against the adapted
/// concrete type at construction, which is what survives erasure.
type Accessor = for<'a> fn(&'a (dyn StdError + 'static)) -> Option<&'a str>;

fn absent<'a>(_: &'a (dyn StdError + 'static)) -> Option<&'a str> {
    None
}

/// Carries a foreign capability implementor through a `dyn Error` chain.
///
/// Transparent to rendering and unwrapping: `Display` and `source` both
/// delegate to the adapted error, so the chain reads exactly as it would
/// without the anchor.
pub struct Compat {
    inner: Box<dyn StdError + Send + Sync + 'static>,
    code: Accessor,
    message: Accessor,
    stack: Accessor,
}

impl Compat {
    /// Adapts a [`ClientFacing`] implementor.
    pub fn client_facing<E>(err: E) -> Self
    where
        E: ClientFacing + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(err),
            code: |e| e.downcast_ref::<E>().and_then(ClientFacing::client_code),
            message: |e| e.downcast_ref::<E>().and_then(ClientFacing::client_message),
            stack: absent,
        }
    }

    /// Adapts a [`HasStacktrace`] implementor.
    pub fn stacktraced<E>(err: E) -> Self
    where
        E: HasStacktrace + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(err),
            code: absent,
            message: absent,
            stack: |e| e.downcast_ref::<E>().and_then(HasStacktrace::stacktrace),
        }
    }

    /// Adapts a type implementing both contracts.
    pub fn faceted<E>(err: E) -> Self
    where
        E: ClientFacing + HasStacktrace + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(err),
            code: |e| e.downcast_ref::<E>().and_then(ClientFacing::client_code),
            message: |e| e.downcast_ref::<E>().and_then(ClientFacing::client_message),
            stack: |e| e.downcast_ref::<E>().and_then(HasStacktrace::stacktrace),
        }
    }

    /// The adapted error's classification code, if exposed.
    pub fn client_code(&self) -> Option<&str> {
        (self.code)(self.inner_dyn())
    }

    /// The adapted error's client message, if exposed.
    pub fn client_message(&self) -> Option<&str> {
        (self.message)(self.inner_dyn())
    }

    /// The adapted error's stacktrace, if exposed.
    pub fn stacktrace(&self) -> Option<&str> {
        (self.stack)(self.inner_dyn())
    }

    /// The adapted error itself.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }

    fn inner_dyn(&self) -> &(dyn StdError + 'static) {
        let inner: &(dyn StdError + 'static) = &*self.inner;
        inner
    }
}

impl fmt::Debug for Compat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Compat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Compat {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner_dyn().source()
    }
}

impl ClientFacing for crate::Error {
    fn client_code(&self) -> Option<&str> {
        self.code()
    }

    fn client_message(&self) -> Option<&str> {
        self.message()
    }
}

impl HasStacktrace for crate::Error {
    fn stacktrace(&self) -> Option<&str> {
        self.stacktrace()
    }
}
