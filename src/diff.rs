use std::collections::HashSet;

/// Identifiers present in `current` but not in `previous`.
///
/// Plain set subtraction: builds that disappeared since the last run are not
/// reported. Output keeps the first-seen order of `current` and has no duplicates.
pub fn new_identifiers(current: &[String], previous: &[String]) -> Vec<String> {
    let old: HashSet<&str> = previous.iter().map(String::as_str).collect();
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut fresh = Vec::new();
    for id in current {
        if !old.contains(id.as_str()) && emitted.insert(id.as_str()) {
            fresh.push(id.clone());
        }
    }
    fresh
}
