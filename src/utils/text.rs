/// True when `term` occurs in `haystack` without being glued to a letter or
/// digit on either side. Both inputs are expected to be lower-cased already.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }

    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Trimmed value, or `None` when blank.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_requires_boundaries() {
        assert!(contains_term("muscat, oman", "oman"));
        assert!(!contains_term("bucharest, romania", "oman"));
        assert!(contains_term("senior c++ developer", "c++"));
        assert!(!contains_term("javascript engineer", "java"));
    }

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("Data Engineer @ Acme, Tunis"), "data-engineer-acme-tunis");
        assert_eq!(slugify("  --  "), "");
    }
}
