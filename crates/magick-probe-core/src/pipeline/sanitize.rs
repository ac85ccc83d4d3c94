//! Repair of non-standard numeric literals in convert's JSON output.
//!
//! Some ImageMagick builds print `-nan`, `inf` or the MSVC spellings
//! `1.#IND` / `1.#INF` for channel statistics, which no JSON parser accepts.

use regex::bytes::{NoExpand, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

static RE_INVALID_NUMBER: OnceLock<Regex> = OnceLock::new();

fn invalid_number() -> &'static Regex {
    RE_INVALID_NUMBER
        .get_or_init(|| Regex::new(r": -?(?:1\.#IN[DF]|nan|inf)").expect("static pattern"))
}

/// Rewrite every invalid numeric value to `null`.
///
/// Borrows the input unchanged when there is nothing to fix.
pub fn sanitize(raw: &[u8]) -> Cow<'_, [u8]> {
    invalid_number().replace_all(raw, NoExpand(&b": null"[..]))
}
