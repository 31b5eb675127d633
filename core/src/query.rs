use std::collections::HashMap;

use serde::Serialize;

use crate::{FileId, InvertedIndex, Token};

pub const DEFAULT_TOP_K: usize = 10;

/// Case-sensitive separator between query terms.
const AND: &str = "AND";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Every file holding at least one term, scored by the sum over all terms.
    #[default]
    Any,
    /// Only files holding every term.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub file_id: FileId,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub terms: Vec<Token>,
}

impl Query {
    /// Split on the literal `AND`, trim and lowercase each term, drop blanks.
    /// Terms are used verbatim afterwards, so `"cats,"` will not match `cats`.
    pub fn parse(raw: &str) -> Self {
        let terms = raw
            .split(AND)
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}

/// Rank files for `raw_query`, best first, ties by file id. At most `top_k` hits.
pub fn search(index: &InvertedIndex, raw_query: &str, top_k: usize, mode: MatchMode) -> Vec<SearchHit> {
    let query = Query::parse(raw_query);
    if query.is_empty() || top_k == 0 {
        return Vec::new();
    }

    // file -> (score, number of terms matched)
    let mut scores: HashMap<&FileId, (u64, usize)> = HashMap::new();
    for term in &query.terms {
        for (file_id, count) in index.lookup(term) {
            let entry = scores.entry(file_id).or_insert((0, 0));
            entry.0 += u64::from(*count);
            entry.1 += 1;
        }
    }

    let required = query.terms.len();
    let mut scored: Vec<SearchHit> = scores
        .into_iter()
        .filter(|(_, (_, matched))| mode == MatchMode::Any || *matched == required)
        .map(|(file_id, (score, _))| SearchHit { file_id: file_id.clone(), score })
        .collect();
    let total_hits = scored.len();
    scored.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.file_id.cmp(&b.file_id)));
    scored.truncate(top_k);

    tracing::debug!(terms = ?query.terms, ?mode, total_hits, returned = scored.len(), "query evaluated");
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(file_id: &str, score: u64) -> SearchHit {
        SearchHit { file_id: file_id.to_string(), score }
    }

    fn cat_dog_index() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_occurrences("a.txt", "cat", 2);
        index.add_occurrences("b.txt", "dog", 1);
        index
    }

    #[test]
    fn parse_splits_on_uppercase_and_only() {
        assert_eq!(Query::parse("  Cats AND dogs ").terms, vec!["cats", "dogs"]);
        assert_eq!(Query::parse("cats and dogs").terms, vec!["cats and dogs"]);
        assert_eq!(Query::parse("AND cat AND AND").terms, vec!["cat"]);
        assert!(Query::parse("   ").is_empty());
    }

    #[test]
    fn union_with_sum_scoring() {
        let index = cat_dog_index();
        let hits = search(&index, "cat AND dog", DEFAULT_TOP_K, MatchMode::Any);
        assert_eq!(hits, vec![hit("a.txt", 2), hit("b.txt", 1)]);
    }

    #[test]
    fn scores_sum_across_terms() {
        let mut index = cat_dog_index();
        index.add_occurrences("b.txt", "cat", 3);
        let hits = search(&index, "cat AND dog", DEFAULT_TOP_K, MatchMode::Any);
        assert_eq!(hits, vec![hit("b.txt", 4), hit("a.txt", 2)]);
    }

    #[test]
    fn strict_mode_requires_every_term() {
        let mut index = cat_dog_index();
        index.add_occurrences("c.txt", "cat", 1);
        index.add_occurrences("c.txt", "dog", 1);
        let hits = search(&index, "cat AND dog", DEFAULT_TOP_K, MatchMode::All);
        assert_eq!(hits, vec![hit("c.txt", 2)]);
    }

    #[test]
    fn exact_lookup_not_substring() {
        let mut index = InvertedIndex::new();
        index.add_occurrence("a.txt", "concatenate");
        assert!(search(&index, "cat", DEFAULT_TOP_K, MatchMode::Any).is_empty());
    }

    #[test]
    fn ties_break_by_file_id() {
        let mut index = InvertedIndex::new();
        for f in ["c.txt", "a.txt", "b.txt"] {
            index.add_occurrence(f, "cat");
        }
        let hits = search(&index, "CAT", DEFAULT_TOP_K, MatchMode::Any);
        assert_eq!(hits, vec![hit("a.txt", 1), hit("b.txt", 1), hit("c.txt", 1)]);
    }

    #[test]
    fn truncates_to_top_k() {
        let mut index = InvertedIndex::new();
        for i in 0..15u32 {
            index.add_occurrences(&format!("f{i:02}.txt"), "cat", i + 1);
        }
        let hits = search(&index, "cat", DEFAULT_TOP_K, MatchMode::Any);
        assert_eq!(hits.len(), 10);
        assert_eq!(hits[0], hit("f14.txt", 15));
        assert_eq!(hits[9], hit("f05.txt", 6));
        assert_eq!(search(&index, "cat", 3, MatchMode::Any).len(), 3);
        assert!(search(&index, "cat", 0, MatchMode::Any).is_empty());
    }

    #[test]
    fn empty_query_is_empty_result() {
        let index = cat_dog_index();
        assert!(search(&index, "", DEFAULT_TOP_K, MatchMode::Any).is_empty());
        assert!(search(&index, " \t ", DEFAULT_TOP_K, MatchMode::All).is_empty());
    }
}
