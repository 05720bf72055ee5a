//! Note identity
//!
//! A note's identifier is its normalized filename stem. It is embedded in the
//! output as the Org-roam `:ID:` and used as the target of every `[[id:...]]`
//! link, so it must be stable across runs and predictable by a human reading
//! the vault.

use chrono::NaiveDateTime;
use deunicode::deunicode;

/// Separator placed between words of an identifier
pub const SEPARATOR: char = '_';

/// Identifier used when a stem has no letters or digits at all
const FALLBACK_IDENTIFIER: &str = "note";

/// Normalize a filename stem into an identifier
///
/// Transliterates to ASCII (`Café` becomes `cafe`, `Привет` becomes
/// `privet`), lowercases, drops apostrophes and collapses every run of other
/// characters into a single `_`. The result only ever contains `[a-z0-9_]`,
/// never starts or ends with `_`, and normalizing it again is a no-op.
pub fn normalize_stem(stem: &str) -> String {
    let ascii = deunicode(stem);
    let mut identifier = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if matches!(c, '\'' | '\u{2019}') {
            continue;
        }
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_separator && !identifier.is_empty() {
                identifier.push(SEPARATOR);
            }
            pending_separator = false;
            identifier.push(c);
        } else {
            pending_separator = true;
        }
    }

    if identifier.is_empty() {
        FALLBACK_IDENTIFIER.to_string()
    } else {
        identifier
    }
}

/// `YYYYMMDDHHMMSS-{identifier}.org`
pub fn output_filename(created: NaiveDateTime, identifier: &str) -> String {
    format!("{}-{identifier}.org", created.format("%Y%m%d%H%M%S"))
}
