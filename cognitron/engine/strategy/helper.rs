/// Removes duplicate expansions while preserving first-seen order.
#[must_use]
pub fn dedup_expansions(expansions: Vec<String>) -> Vec<String> {
    let mut seen = indexmap::IndexSet::new();
    for expansion in expansions {
        seen.insert(expansion);
    }
    seen.into_iter().collect()
}

/// Caps an expansion list at `limit` entries.
#[must_use]
pub fn cap_expansions(mut expansions: Vec<String>, limit: usize) -> Vec<String> {
    expansions.truncate(limit.max(1));
    expansions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let deduped = dedup_expansions(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(deduped, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn cap_never_empties() {
        let capped = cap_expansions(vec!["a".into(), "b".into()], 0);
        assert_eq!(capped.len(), 1);
    }
}
