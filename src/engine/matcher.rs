//! Fuzzy identity resolution of free-text person references.
//!
//! Similarity is the Jaro-Winkler score from `strsim` (standard prefix scale 0.1,
//! prefix capped at four characters). The acceptance threshold below is calibrated
//! for that metric only: a first-name reference such as `maya` scores about 0.88
//! against `maya patel`, while unrelated short names stay under 0.75.

use crate::models::TeamMember;

/// Minimum similarity for a reference to resolve to a member.
pub const MATCH_THRESHOLD: f64 = 0.75;

/// Result of resolving a reference against the roster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentityMatch {
    /// Position of the member in the roster slice
    pub index: usize,
    pub ratio: f64,
    /// Another member scored the same top ratio; the earliest one won.
    pub ambiguous: bool,
}

/// Normalize a chat reference: strip one leading `@`, turn dots into spaces, trim, lowercase.
pub fn normalize_reference(reference: &str) -> String {
    let stripped = reference.trim_start().strip_prefix('@').unwrap_or(reference.trim_start());
    stripped.replace('.', " ").trim().to_lowercase()
}

/// Similarity between an already-normalized reference and a display name.
pub fn similarity(normalized_reference: &str, name: &str) -> f64 {
    strsim::jaro_winkler(normalized_reference, &name.trim().to_lowercase())
}

/// Find the best-scoring roster member for `reference`.
///
/// Ties at the top ratio go to the member that comes first in `roster`.
/// Returns `None` when nothing reaches [`MATCH_THRESHOLD`].
pub fn best_match(reference: &str, roster: &[TeamMember]) -> Option<IdentityMatch> {
    let needle = normalize_reference(reference);
    if needle.is_empty() {
        return None;
    }

    let mut best: Option<IdentityMatch> = None;
    for (index, member) in roster.iter().enumerate() {
        let ratio = similarity(&needle, &member.name);
        match best.as_mut() {
            Some(current) if ratio > current.ratio => {
                *current = IdentityMatch {
                    index,
                    ratio,
                    ambiguous: false,
                };
            }
            Some(current) if ratio == current.ratio => current.ambiguous = true,
            Some(_) => {}
            None => {
                best = Some(IdentityMatch {
                    index,
                    ratio,
                    ambiguous: false,
                })
            }
        }
    }

    best.filter(|m| m.ratio >= MATCH_THRESHOLD)
}

/// Resolve `reference` to a roster member.
pub fn match_member<'a>(reference: &str, roster: &'a [TeamMember]) -> Option<&'a TeamMember> {
    best_match(reference, roster).map(|m| &roster[m.index])
}
