//! Near-miss suggestions and id-shape checks for profile validation.

/// Closest candidate by edit distance, or `None` when nothing is within
/// half the longer string's length.
pub(crate) fn suggest<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let needle = input.to_lowercase();
    candidates
        .iter()
        .map(|&c| (c, edit_distance(&needle, &c.to_lowercase())))
        .min_by_key(|&(_, d)| d)
        .filter(|&(c, d)| d <= input.len().max(c.len()) / 2)
        .map(|(c, _)| c)
}

/// Levenshtein distance over chars, single rolling row.
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = diagonal + usize::from(ca != *cb);
            diagonal = row[j + 1];
            row[j + 1] = substitution.min(row[j] + 1).min(row[j + 1] + 1);
        }
    }
    row[b.len()]
}

/// Manual ids become chunk-id prefixes: lowercase alphanumerics joined by
/// single hyphens, e.g. `xj-1999`.
pub(crate) fn is_manual_id(s: &str) -> bool {
    !s.is_empty()
        && s.split('-').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMATS: &[&str] = &["pdf-ocr", "pdf-native", "html", "epub"];

    #[test]
    fn edit_distance_basic() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("8A", "8A"), 0);
    }

    #[test]
    fn suggest_finds_close() {
        assert_eq!(suggest("pdf_ocr", FORMATS), Some("pdf-ocr"));
        assert_eq!(suggest("HTM", FORMATS), Some("html"));
    }

    #[test]
    fn suggest_rejects_distant() {
        assert_eq!(suggest("microfiche", FORMATS), None);
    }

    #[test]
    fn manual_id_shape() {
        assert!(is_manual_id("xj-1999"));
        assert!(is_manual_id("tm9-8014"));
        assert!(!is_manual_id("XJ-1999"));
        assert!(!is_manual_id("xj--1999"));
        assert!(!is_manual_id("xj::1999"));
        assert!(!is_manual_id("-xj"));
    }
}
