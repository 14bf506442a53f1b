//! Typo suggestions for operator names and the document id format check.

/// The candidate nearest to `name`, ignoring case.
///
/// Nothing is suggested when more than half of the longer string would have
/// to change, so `zzzz` does not become `eq`. Earlier candidates win ties.
pub(crate) fn nearest<'a>(name: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let wanted = name.to_lowercase();
    candidates
        .iter()
        .map(|&c| (c, edit_distance(&wanted, &c.to_lowercase())))
        .fold(None, |best: Option<(&'a str, usize)>, (c, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((c, d)),
        })
        .filter(|&(c, d)| d <= name.chars().count().max(c.chars().count()) / 2)
        .map(|(c, _)| c)
}

/// Levenshtein distance over chars, keeping a single row plus the diagonal.
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag
            } else {
                1 + diag.min(above).min(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

/// Ids are lowercase ASCII words joined by single hyphens (`icp-fit-2`).
pub(crate) fn is_kebab_case(id: &str) -> bool {
    !id.is_empty()
        && id.split('-').all(|word| {
            !word.is_empty()
                && word
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OPERATOR_NAMES;

    #[test]
    fn edit_distance_counts_single_char_edits() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("nin", "nin"), 0);
        assert_eq!(edit_distance("regx", "regex"), 1);
    }

    #[test]
    fn operator_typos_get_a_suggestion() {
        assert_eq!(nearest("gtee", OPERATOR_NAMES), Some("gte"));
        assert_eq!(nearest("startwith", OPERATOR_NAMES), Some("startsWith"));
        assert_eq!(nearest("containz", OPERATOR_NAMES), Some("contains"));
        assert_eq!(nearest("ENDSWITH", OPERATOR_NAMES), Some("endsWith"));
    }

    #[test]
    fn unrelated_names_get_none() {
        assert_eq!(nearest("zzzzzzzzzzzzz", OPERATOR_NAMES), None);
        assert_eq!(nearest("anything", &[]), None);
    }

    #[test]
    fn first_candidate_wins_a_tie() {
        assert_eq!(nearest("ab", &["ax", "ay"]), Some("ax"));
    }

    #[test]
    fn kebab_case_ids() {
        assert!(is_kebab_case("icp-fit-2"));
        assert!(is_kebab_case("risk"));
        assert!(!is_kebab_case(""));
        assert!(!is_kebab_case("Icp_fit"));
        assert!(!is_kebab_case("-fit"));
        assert!(!is_kebab_case("fit-"));
        assert!(!is_kebab_case("icp--fit"));
    }
}
