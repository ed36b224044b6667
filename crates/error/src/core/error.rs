//! The [`Error`] chain node and its construction and mutation surface.

use std::error::Error as StdError;
use std::fmt;

use smol_str::SmolStr;
use thiserror::Error as ThisError;

use crate::caller;
use crate::core::chain;

/// Boxed cause slot. Every node owns exactly one of these; the chain is a
/// singly linked list of owners terminated by a [`Leaf`].
pub(crate) type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Terminal display-string error at the root of every library-built chain.
///
/// Carries no facets. Its existence is what keeps the non-empty-cause
/// invariant structural: [`Error`] cannot be built without a cause, so a
/// chain always bottoms out here or in a caller-supplied foreign error.
#[derive(Debug, ThisError)]
#[error("{0}")]
pub(crate) struct Leaf(pub(crate) String);

/// Context string interposed between a node and its cause by
/// [`Error::wrap_info`].
///
/// Renders as `"(<info>): "` ahead of the cause and participates in the
/// unwrap walk through [`source`](StdError::source), but carries no code,
/// message or stacktrace facets of its own.
#[derive(Debug)]
pub struct Annotation {
    pub(crate) info: String,
    pub(crate) source: BoxedCause,
}

impl Annotation {
    /// The context string supplied at the wrap site.
    #[inline]
    pub fn info(&self) -> &str {
        &self.info
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}): ", self.info)?;
        fmt::Display::fmt(&self.source, f)
    }
}

impl StdError for Annotation {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let cause: &(dyn StdError + 'static) = &*self.source;
        Some(cause)
    }
}

/// A standard application error.
///
/// Each node carries up to three independent facets next to its cause:
///
/// * `code` - a short machine-readable classification token such as
///   `"database_error"`, for programmatic branching. See [`crate::codes`]
///   for the conventional tokens.
/// * `message` - end-user-safe text. Never printed by `Display`; retrieve
///   it with [`chain::error_message`].
/// * `op` - the operation (usually a function name) that produced or
///   rethrew this node, building the readable trace `Display` prints.
///
/// An `Error` always has a cause and therefore cannot itself be the true
/// root of a chain: [`Error::new`] roots the chain in a fresh leaf built
/// from plain text, and [`Error::wrap`] takes the cause from the caller.
///
/// Nodes are owned values. Wrapping consumes the cause; mutators consume
/// and return the node for fluent chaining.
#[derive(Debug)]
pub struct Error {
    pub(crate) op: Option<SmolStr>,
    pub(crate) code: Option<SmolStr>,
    pub(crate) message: Option<String>,
    pub(crate) stacktrace: Option<String>,
    pub(crate) source: BoxedCause,
}

/// Maps the empty string to "unset". Facets are optional and the public
/// surface accepts plain string inputs, so normalization happens once here.
fn non_empty<S: AsRef<str>>(s: S) -> Option<S> {
    if s.as_ref().is_empty() { None } else { Some(s) }
}

impl Error {
    /// Constructs a root node over a fresh leaf built from `cause`.
    ///
    /// `op` is conventionally the enclosing function name and `code` a
    /// short classification token; either may be empty and is then unset.
    /// A stacktrace snapshot is captured at the call site, so the deepest
    /// node of a chain is the one closest to the fault.
    ///
    /// ```rust
    /// use strata_error::{codes, Error};
    ///
    /// let err = Error::new("Foo", codes::DATABASE, "cannot foo");
    /// assert_eq!(err.to_string(), "Foo: [database_error] cannot foo");
    /// ```
    #[inline(never)]
    pub fn new(
        op: impl Into<SmolStr>,
        code: impl Into<SmolStr>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            op: non_empty(op.into()),
            code: non_empty(code.into()),
            message: None,
            stacktrace: Some(caller::stacktrace_snapshot()),
            source: Box::new(Leaf(cause.into())),
        }
    }

    /// [`Error::new`] with the operation name resolved from the calling
    /// frame instead of supplied explicitly.
    ///
    /// The name is derived once per call from the live call stack (see
    /// [`caller::caller_name`]); closures keep their `{{closure}}` suffix
    /// and an unresolvable frame yields the literal `"unknown"`.
    #[inline(never)]
    pub fn here(code: impl Into<SmolStr>, cause: impl Into<String>) -> Self {
        let op = caller::caller_name(caller::DIRECT_CALLER);
        Self::new(op, code, cause)
    }

    /// Wraps an existing error one level deeper, adding `op` to the trace.
    ///
    /// `err` may be another [`Error`] or any foreign error type. The new
    /// node starts with no code and no message; chain
    /// [`with_code`](Error::with_code) when wrapping a foreign error that
    /// carries no classification of its own.
    ///
    /// If the wrapped error already resolves to a stacktrace the first
    /// capture wins and no new snapshot is taken; otherwise one is captured
    /// here.
    ///
    /// ```rust
    /// use strata_error::{codes, Error};
    ///
    /// let db = std::io::Error::other("connection refused");
    /// let err = Error::wrap("GetUser", db).with_code(codes::DATABASE);
    /// assert_eq!(err.to_string(), "GetUser: [database_error] connection refused");
    /// ```
    #[inline(never)]
    pub fn wrap<E>(op: impl Into<SmolStr>, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let has_trace = chain::error_stacktrace(&err).is_some();
        Self {
            op: non_empty(op.into()),
            code: None,
            message: None,
            stacktrace: if has_trace {
                None
            } else {
                Some(caller::stacktrace_snapshot())
            },
            source: Box::new(err),
        }
    }

    /// [`Error::wrap`] with the operation name resolved from the calling
    /// frame.
    #[inline(never)]
    pub fn wrap_here<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let op = caller::caller_name(caller::DIRECT_CALLER);
        Self::wrap(op, err)
    }

    /// Wraps `err` and splices `info` into the rendered trace between this
    /// node's operation and the cause.
    ///
    /// The annotation is interposed as its own chain link ahead of `err`,
    /// so it participates in the unwrap walk but contributes nothing to
    /// code, message or stacktrace resolution.
    ///
    /// ```rust
    /// use strata_error::{codes, Error};
    ///
    /// let inner = Error::new("Foo", codes::DATABASE, "cannot foo");
    /// let err = Error::wrap_info("Fizz", inner, "failed to fizz");
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Fizz: (failed to fizz): Foo: [database_error] cannot foo",
    /// );
    /// ```
    #[inline(never)]
    pub fn wrap_info<E>(op: impl Into<SmolStr>, err: E, info: impl Into<String>) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let has_trace = chain::error_stacktrace(&err).is_some();
        Self {
            op: non_empty(op.into()),
            code: None,
            message: None,
            stacktrace: if has_trace {
                None
            } else {
                Some(caller::stacktrace_snapshot())
            },
            source: Box::new(Annotation {
                info: info.into(),
                source: Box::new(err),
            }),
        }
    }

    // =========================================================================
    // Fluent mutators
    // =========================================================================

    /// Sets the classification code on this node.
    ///
    /// Only the receiver is touched; codes set deeper in the chain stay in
    /// place and lose outermost-first resolution to this one.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<SmolStr>) -> Self {
        self.code = non_empty(code.into());
        self
    }

    /// Sets the end-user-safe message on this node.
    ///
    /// The message never appears in the rendered trace; it is retrieved
    /// with [`chain::error_message`].
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = non_empty(message.into());
        self
    }

    /// Clears the message on this node **and on every library node below
    /// it**, through annotation links.
    ///
    /// The cascade is deliberate: a message set deep in the chain would
    /// otherwise still win resolution after the outer caller believed it
    /// had suppressed messaging. A foreign wrapper bounds the cascade,
    /// since its cause is reachable only by shared reference and cannot be
    /// mutated through it.
    #[must_use]
    pub fn clear_message(mut self) -> Self {
        self.message = None;
        let cause: &mut (dyn StdError + 'static) = self.source.as_mut();
        clear_downstream(cause);
        self
    }

    // =========================================================================
    // Facet accessors (this node only; chain-wide resolution lives in
    // `chain::error_code` and friends)
    // =========================================================================

    /// The operation name recorded on this node.
    #[inline]
    pub fn operation(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// The classification code set on this node, if any.
    #[inline]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The end-user-safe message set on this node, if any.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The stacktrace snapshot captured by this node, if any.
    #[inline]
    pub fn stacktrace(&self) -> Option<&str> {
        self.stacktrace.as_deref()
    }
}

/// Clears messages down the owned chain. Stops at the first link that is
/// neither a library node nor an annotation.
fn clear_downstream(err: &mut (dyn StdError + 'static)) {
    if let Some(node) = err.downcast_mut::<Error>() {
        node.message = None;
        let next: &mut (dyn StdError + 'static) = node.source.as_mut();
        clear_downstream(next);
    } else if let Some(ann) = err.downcast_mut::<Annotation>() {
        let next: &mut (dyn StdError + 'static) = ann.source.as_mut();
        clear_downstream(next);
    }
}

impl fmt::Display for Error {
    /// Renders the chain outermost to innermost.
    ///
    /// Each node contributes `"<op>: "` when it has an operation and
    /// `"[<code>] "` when it holds a code; annotations contribute
    /// `"(<info>): "`; the terminal leaf contributes its raw text.
    /// Messages are never rendered.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(op) = &self.op {
            write!(f, "{op}: ")?;
        }
        if let Some(code) = &self.code {
            write!(f, "[{code}] ")?;
        }
        fmt::Display::fmt(&self.source, f)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        let cause: &(dyn StdError + 'static) = &*self.source;
        Some(cause)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::codes;
    use crate::core::chain::{error_code, error_message, error_stacktrace};

    /// A wrapper from outside the library, cooperating only through
    /// `source()`.
    #[derive(Debug, ThisError)]
    #[error("not encouraged but compatible: {source}")]
    struct ForeignWrap {
        #[source]
        source: Error,
    }

    fn inner_internal() -> Error {
        Error::new("Inner", codes::INTERNAL, "cannot do something")
    }

    #[rstest]
    #[case::new_constructs(
        Error::new("Foo", codes::DATABASE, "cannot do something"),
        "Foo: [database_error] cannot do something"
    )]
    #[case::wrap_adds_op(
        Error::wrap("Outer", inner_internal()),
        "Outer: Inner: [internal_error] cannot do something"
    )]
    #[case::wrap_adds_op_and_info(
        Error::wrap_info("Outer", inner_internal(), "optional info here"),
        "Outer: (optional info here): Inner: [internal_error] cannot do something"
    )]
    #[case::wraps_foreign_errors(
        Error::wrap("Foo", std::io::Error::other("basic error")),
        "Foo: basic error"
    )]
    #[case::wrap_foreign_then_set_code(
        Error::wrap("Foo", std::io::Error::other("database error")).with_code(codes::DATABASE),
        "Foo: [database_error] database error"
    )]
    #[case::empty_facets_render_nothing(Error::new("", "", "bare"), "bare")]
    fn renders_chain(#[case] err: Error, #[case] want: &str) {
        assert_eq!(err.to_string(), want);
    }

    #[test]
    fn renders_through_foreign_wrapper() {
        let err = Error::wrap("Outer", inner_internal());
        let wrapped = ForeignWrap { source: err };
        let outer = Error::wrap("Outer2", wrapped);
        assert_eq!(
            outer.to_string(),
            "Outer2: not encouraged but compatible: Outer: Inner: [internal_error] cannot do something",
        );
    }

    #[test]
    fn each_explicit_code_renders_at_its_node() {
        let err = Error::wrap("Outer", inner_internal()).with_code(codes::DATABASE);
        assert_eq!(
            err.to_string(),
            "Outer: [database_error] Inner: [internal_error] cannot do something",
        );
    }

    #[test]
    fn empty_cause_text_is_permitted() {
        let err = Error::new("Foo", "", "");
        assert_eq!(err.to_string(), "Foo: ");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn with_code_targets_only_the_receiver() {
        let err = Error::wrap("Outer", inner_internal()).with_code(codes::DATABASE);
        assert_eq!(err.code(), Some(codes::DATABASE));
        assert_eq!(error_code(&err), Some(codes::DATABASE));

        // The inner classification is still in place underneath.
        let inner = crate::core::chain::find_source::<Error>(err.source().expect("cause"))
            .expect("inner node");
        assert_eq!(inner.code(), Some(codes::INTERNAL));
    }

    #[test]
    fn message_is_not_rendered() {
        let err = Error::new("Foo", codes::UNEXPECTED, "boom").with_message("don't print me");
        assert_eq!(err.to_string(), "Foo: [unexpected_error] boom");
        assert_eq!(error_message(&err), Some("don't print me"));
    }

    #[test]
    fn clear_message_cascades_through_the_chain() {
        let err = Error::new("Foo", codes::INTERNAL, "fail").with_message("clear me!");
        let err = Error::wrap("Outer", err).with_message("clear me too!");
        let err = Error::wrap_info("Outer2", err, "with info").with_message("clear all of us!");

        let cleared = err.clear_message();
        assert_eq!(error_message(&cleared), None);
    }

    #[test]
    fn clear_message_stops_at_foreign_links() {
        let deep = Error::new("Inner", "", "boom").with_message("deep");
        let foreign = ForeignWrap { source: deep };
        let cleared = Error::wrap("Outer", foreign)
            .with_message("shallow")
            .clear_message();

        // The foreign wrapper owns its cause; the cascade cannot reach past
        // it, so the deep message is still resolvable.
        assert_eq!(error_message(&cleared), Some("deep"));
    }

    #[test]
    fn new_captures_a_stacktrace_at_the_origin() {
        let err = Error::new("Foo", "", "boom");
        let trace = err.stacktrace().expect("captured");
        assert!(!trace.is_empty());
    }

    #[test]
    fn wrap_propagates_the_innermost_stacktrace() {
        let inner = Error::new("Foo", "", "boom");
        let inner_trace = inner.stacktrace().expect("captured").to_owned();

        let outer = Error::wrap("Bar", inner);
        assert_eq!(outer.stacktrace(), None);
        assert_eq!(error_stacktrace(&outer), Some(inner_trace.as_str()));
    }

    #[test]
    fn wrap_captures_when_the_cause_has_no_stacktrace() {
        let outer = Error::wrap("Bar", std::io::Error::other("io down"));
        assert!(outer.stacktrace().is_some());
    }

    #[inline(never)]
    fn fetch_user() -> Error {
        Error::here(codes::DATABASE, "connection refused")
    }

    #[test]
    fn here_captures_the_enclosing_function() {
        let err = fetch_user();
        assert_eq!(err.operation(), Some("fetch_user"));
        assert_eq!(
            err.to_string(),
            "fetch_user: [database_error] connection refused"
        );
    }

    #[test]
    fn wrap_here_inside_a_closure_names_the_closure() {
        let err = (|| Error::wrap_here(inner_internal()))();
        let op = err.operation().expect("operation captured");
        assert!(op.ends_with("{{closure}}"), "got {op}");
        assert!(
            op.starts_with("wrap_here_inside_a_closure_names_the_closure"),
            "got {op}"
        );
    }

    #[test]
    fn here_inside_a_spawned_task_names_the_task_closure() {
        let err = std::thread::spawn(|| Error::here("", "boom"))
            .join()
            .expect("join");
        let op = err.operation().expect("operation captured");
        assert!(op.ends_with("{{closure}}"), "got {op}");
    }
}
