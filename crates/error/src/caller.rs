//! Call-stack introspection.
//!
//! Two capture primitives back the construction surface: [`caller_name`]
//! resolves the function name a fixed number of frames above the capture
//! point (used when an operation name is not supplied explicitly), and
//! [`stacktrace_snapshot`] freezes the whole stack as text for the
//! stacktrace facet.
//!
//! Both are evaluated eagerly, once per call, and read only the calling
//! thread's own stack. Nothing is cached: the answer depends on the
//! dynamic call site.

use std::fmt::Write as _;

/// Resolved when the requested frame is missing or has no symbol.
const UNKNOWN: &str = "unknown";

/// Frames between [`caller_name`] and the function a capturing
/// constructor was called from: the primitive itself, then the
/// constructor. Every function on that path is `#[inline(never)]` so the
/// count holds across build profiles.
pub(crate) const DIRECT_CALLER: usize = 2;

/// Resolves the name of the function `skip` frames above this one.
///
/// `skip == 0` names this primitive itself; `1` its immediate caller, and
/// so on. Returns the literal `"unknown"` when the offset exceeds the
/// available stack depth or the frame has no resolvable symbol.
///
/// Names are stripped of enclosing module qualifiers but keep closure
/// suffixes, so a closure nested in `foo` resolves as `foo::{{closure}}`
/// and a second concurrently spawned closure keeps the same shape from its
/// own spawn site.
#[inline(never)]
pub fn caller_name(skip: usize) -> String {
    let mut depth = 0usize;
    let mut base: Option<usize> = None;
    let mut resolved: Option<String> = None;

    backtrace::trace(|frame| {
        let mut raw: Option<String> = None;
        backtrace::resolve_frame(frame, |symbol| {
            if raw.is_none() {
                raw = symbol.name().map(|name| name.to_string());
            }
        });

        if let Some(name) = raw {
            match base {
                None => {
                    if is_capture_frame(&name) {
                        base = Some(depth);
                        if skip == 0 {
                            resolved = Some(name);
                        }
                    }
                }
                Some(anchor) => {
                    if depth == anchor + skip {
                        resolved = Some(name);
                    }
                }
            }
        }
        depth += 1;
        resolved.is_none()
    });

    resolved.map_or_else(|| UNKNOWN.to_owned(), |name| normalize(&name))
}

/// Captures the current call stack as a formatted snapshot.
#[inline(never)]
pub fn stacktrace_snapshot() -> String {
    let mut out = String::new();
    // The Debug rendering of a resolved backtrace is the conventional
    // multi-line `idx: symbol` listing.
    let _ = write!(out, "{:?}", backtrace::Backtrace::new());
    out
}

/// True for the frame of [`caller_name`] itself, excluding the tracing
/// closure nested inside it.
fn is_capture_frame(raw: &str) -> bool {
    let name = strip_hash(raw);
    name == "caller_name" || name.ends_with("::caller_name")
}

/// Drops the trailing `::h<hex>` disambiguator the symbol mangler appends.
fn strip_hash(name: &str) -> &str {
    match name.rfind("::h") {
        Some(idx)
            if !name[idx + 3..].is_empty()
                && name[idx + 3..].chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            &name[..idx]
        }
        _ => name,
    }
}

/// Reduces a mangled-path symbol to the bare function name, keeping
/// closure suffixes: `app::user::fetch::{{closure}}` becomes
/// `fetch::{{closure}}`.
fn normalize(raw: &str) -> String {
    let name = strip_hash(raw);
    let segments: Vec<&str> = name.split("::").collect();

    let mut last_named = segments.len().saturating_sub(1);
    while last_named > 0 && segments[last_named].starts_with("{{") {
        last_named -= 1;
    }
    segments[last_named..].join("::")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("app::user::fetch::h1a2b3c4d5e6f7a8b", "fetch")]
    #[case::closure("app::user::fetch::{{closure}}::hdeadbeef01234567", "fetch::{{closure}}")]
    #[case::nested_closures(
        "app::user::fetch::{{closure}}::{{closure}}",
        "fetch::{{closure}}::{{closure}}"
    )]
    #[case::no_hash("app::user::fetch", "fetch")]
    #[case::bare("fetch", "fetch")]
    #[case::h_named_fn_keeps_its_name("app::hacked", "hacked")]
    fn normalizes_symbols(#[case] raw: &str, #[case] want: &str) {
        assert_eq!(normalize(raw), want);
    }

    #[test]
    fn strips_only_a_trailing_hash() {
        assert_eq!(strip_hash("a::b::h0123456789abcdef"), "a::b");
        assert_eq!(strip_hash("a::b::hotel"), "a::b::hotel");
        assert_eq!(strip_hash("a::b"), "a::b");
    }

    #[inline(never)]
    fn grab() -> String {
        caller_name(1)
    }

    #[test]
    fn resolves_the_immediate_caller() {
        assert_eq!(grab(), "grab");
    }

    #[test]
    fn skip_zero_names_the_primitive_itself() {
        assert_eq!(caller_name(0), "caller_name");
    }

    #[test]
    fn offset_past_the_stack_is_unknown() {
        assert_eq!(caller_name(10_000), "unknown");
    }

    #[test]
    fn closures_keep_their_suffix() {
        let name = (|| caller_name(1))();
        assert!(name.ends_with("::{{closure}}"), "got {name}");
    }

    #[test]
    fn spawned_tasks_resolve_their_own_stack() {
        let name = std::thread::spawn(|| caller_name(1))
            .join()
            .expect("join");
        assert!(name.ends_with("::{{closure}}"), "got {name}");
    }

    #[test]
    fn snapshot_is_non_empty_and_multiline() {
        let snapshot = stacktrace_snapshot();
        assert!(snapshot.contains('\n'));
    }
}
