//! Operator-controlled release ordering

use snapshot::Release;

/// Reorder `releases` so preferred names come first.
///
/// Releases named in `preference` are emitted in preference order, then the
/// rest keep their original relative order. Names in `preference` with no
/// matching release are ignored, and a name repeated in `preference` only
/// counts at its first position. The output is a permutation of the input:
/// if the input holds several releases with one name they are all emitted,
/// in input order, at that name's slot.
pub fn resolve(preference: &[String], releases: Vec<Release>) -> Vec<Release> {
    if preference.is_empty() {
        return releases;
    }

    let mut slots: Vec<Option<Release>> = releases.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());

    for name in preference {
        for slot in &mut slots {
            if slot.as_ref().is_some_and(|r| &r.name == name) {
                ordered.extend(slot.take());
            }
        }
    }

    ordered.extend(slots.into_iter().flatten());
    ordered
}
