//! Statement extraction — decompose an answer into checkable units.
//!
//! A statement is one sentence-level unit, the atomic unit of fact
//! verification. Extraction is a pure function: no state, no I/O.

/// Split `answer` into non-empty statements, order preserved.
///
/// Sentences terminate on `.`, `!`, `?`, or end of input; whitespace-only
/// fragments are dropped. An answer with no terminator yields itself as a
/// single statement. An empty answer yields nothing.
pub fn extract_statements(answer: &str) -> Vec<String> {
    answer
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_empty() {
        assert!(extract_statements("").is_empty());
        assert!(extract_statements("   ").is_empty());
    }

    #[test]
    fn test_extract_single_sentence() {
        let statements = extract_statements("Rust is a systems language.");
        assert_eq!(statements, vec!["Rust is a systems language"]);
    }

    #[test]
    fn test_extract_no_terminator_is_one_statement() {
        let statements = extract_statements("an answer without punctuation");
        assert_eq!(statements, vec!["an answer without punctuation"]);
    }

    #[test]
    fn test_extract_mixed_terminators_preserve_order() {
        let statements = extract_statements("First! Second? Third.");
        assert_eq!(statements, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_extract_drops_whitespace_fragments() {
        let statements = extract_statements("One sentence...  Another. ");
        assert_eq!(statements, vec!["One sentence", "Another"]);
    }

    #[test]
    fn test_extract_only_punctuation() {
        assert!(extract_statements("...!?").is_empty());
    }
}
