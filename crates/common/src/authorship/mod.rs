//! Author-name similarity for authorship claims
//!
//! Imported papers carry free-text author names. A registered user can claim
//! one of those names; the heuristic below decides which names are plausible
//! matches for the user's full name.

/// Default threshold above which a name counts as a potential match
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

fn tokens(name: &str) -> Vec<String> {
    name.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Token-overlap similarity between two names in `[0.0, 1.0]`.
///
/// A token of `a` matches when some token of `b` is equal to it or one
/// contains the other. The match count is divided by the larger token count.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let left = tokens(a);
    let right = tokens(b);

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let matches = left
        .iter()
        .filter(|l| {
            right
                .iter()
                .any(|r| l == &r || l.contains(r.as_str()) || r.contains(l.as_str()))
        })
        .count();

    matches as f64 / left.len().max(right.len()) as f64
}

/// A free-text author name on a paper that resembles a user's name
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    pub author_name: String,
    pub similarity: f64,
}

/// Best-scoring author name at or above `threshold`, if any
pub fn best_match<'a, I>(full_name: &str, authors: I, threshold: f64) -> Option<NameMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    authors
        .into_iter()
        .map(|author| NameMatch {
            author_name: author.to_string(),
            similarity: name_similarity(full_name, author),
        })
        .filter(|m| m.similarity >= threshold)
        .max_by(|x, y| x.similarity.total_cmp(&y.similarity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_score_one() {
        assert_eq!(name_similarity("Ada Lovelace", "Ada Lovelace"), 1.0);
    }

    #[test]
    fn comparison_ignores_case() {
        assert_eq!(name_similarity("ada LOVELACE", "Ada Lovelace"), 1.0);
    }

    #[test]
    fn disjoint_names_score_zero() {
        assert_eq!(name_similarity("Ada Lovelace", "Alan Turing"), 0.0);
    }

    #[test]
    fn empty_names_score_zero() {
        assert_eq!(name_similarity("", "Alan Turing"), 0.0);
        assert_eq!(name_similarity("Alan Turing", "   "), 0.0);
    }

    #[test]
    fn denominator_is_larger_token_count() {
        // 2 of 3 tokens match
        let score = name_similarity("Ada Lovelace", "Augusta Ada Lovelace");
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
        assert!(score < DEFAULT_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn substring_tokens_match() {
        // "j." is not a substring of "john", but "smith" matches exactly
        assert_eq!(name_similarity("J. Smith", "John Smith"), 0.5);
        // "jon" is contained in "jonathan"
        assert_eq!(name_similarity("Jon Smith", "Jonathan Smith"), 1.0);
    }

    #[test]
    fn best_match_respects_threshold() {
        let authors = ["Alan Turing", "Grace Hopper", "Grace B. Hopper"];

        let found = best_match("Grace Hopper", authors.iter().copied(), 0.7).unwrap();
        assert_eq!(found.author_name, "Grace Hopper");
        assert_eq!(found.similarity, 1.0);

        assert!(best_match("Edsger Dijkstra", authors.iter().copied(), 0.7).is_none());
    }
}
