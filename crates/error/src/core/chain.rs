//! Chain walking and facet resolution.
//!
//! The unwrap protocol is [`std::error::Error::source`]: any error exposing
//! its immediate cause that way is a valid chain link, so the resolvers see
//! through foreign wrapping layers interposed between library nodes.

use std::error::Error as StdError;
use std::fmt;

use crate::core::compat::Compat;
use crate::core::error::Error;

/// Iterator over a cause chain, outermost first.
///
/// Yields the head itself, then each `source()` in turn until a link with
/// no further cause.
#[derive(Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn StdError + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn StdError + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = cur.source();
        Some(cur)
    }
}

impl fmt::Debug for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.clone().map(|link| link.to_string()))
            .finish()
    }
}

/// Walks `err` and everything below it.
pub fn chain<'a>(err: &'a (dyn StdError + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

/// Resolves the effective classification code of a chain.
///
/// The walk is outermost first and the first link carrying a code wins: an
/// outer layer that reclassified an error (say, a database failure
/// re-tagged as `internal_error`) overrides the original token. `None`
/// when no link in the chain carries a code.
pub fn error_code<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a str> {
    for link in chain(err) {
        if let Some(node) = link.downcast_ref::<Error>() {
            if node.code.is_some() {
                return node.code.as_deref();
            }
        } else if let Some(compat) = link.downcast_ref::<Compat>() {
            if let Some(code) = compat.client_code() {
                return Some(code);
            }
        }
    }
    None
}

/// Resolves the effective end-user-safe message of a chain.
///
/// Same walk and precedence as [`error_code`]: outermost set message wins.
pub fn error_message<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a str> {
    for link in chain(err) {
        if let Some(node) = link.downcast_ref::<Error>() {
            if node.message.is_some() {
                return node.message.as_deref();
            }
        } else if let Some(compat) = link.downcast_ref::<Compat>() {
            if let Some(message) = compat.client_message() {
                return Some(message);
            }
        }
    }
    None
}

/// Resolves the stacktrace of a chain.
///
/// Opposite precedence from [`error_code`]: the **innermost** captured
/// trace wins, since a trace is most useful from where the fault actually
/// originated rather than where it was last rethrown.
pub fn error_stacktrace<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a str> {
    let mut innermost = None;
    for link in chain(err) {
        if let Some(node) = link.downcast_ref::<Error>() {
            if node.stacktrace.is_some() {
                innermost = node.stacktrace.as_deref();
            }
        } else if let Some(compat) = link.downcast_ref::<Compat>() {
            if let Some(trace) = compat.stacktrace() {
                innermost = Some(trace);
            }
        }
    }
    innermost
}

/// First link in the chain downcastable to `T`, outermost first.
pub fn find_source<'a, T: StdError + 'static>(err: &'a (dyn StdError + 'static)) -> Option<&'a T> {
    chain(err).find_map(|link| link.downcast_ref::<T>())
}

/// The terminal link of the chain.
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    chain(err).last().unwrap_or(err)
}
