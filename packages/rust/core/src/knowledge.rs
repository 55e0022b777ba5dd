//! Knowledge store: ordered keyword records and first-match lookup.
//!
//! Matching is plain substring containment against the lower-cased query.
//! No tokenisation, no fuzzy scoring. The first record in declaration order
//! with any matching keyword wins.

use tracing::{debug, instrument};

use lexi_shared::{KnowledgeRecord, LexiError, Result};

/// Immutable, ordered set of knowledge records.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    records: Vec<KnowledgeRecord>,
}

impl KnowledgeStore {
    /// Build a store, normalising keywords to lower case.
    ///
    /// Surrounding whitespace is kept: `" tort "` only matches the word on its
    /// own. Fails if a record has no keywords or a keyword is blank, since a
    /// blank keyword would match every query.
    pub fn new(records: Vec<KnowledgeRecord>) -> Result<Self> {
        let mut normalized = Vec::with_capacity(records.len());

        for (idx, mut record) in records.into_iter().enumerate() {
            if record.keywords.is_empty() {
                return Err(LexiError::validation(format!(
                    "record {idx} has no keywords"
                )));
            }

            let mut keywords = Vec::with_capacity(record.keywords.len());
            for keyword in &record.keywords {
                let keyword = keyword.to_lowercase();
                if keyword.trim().is_empty() {
                    return Err(LexiError::validation(format!(
                        "record {idx} has a blank keyword"
                    )));
                }
                if !keywords.contains(&keyword) {
                    keywords.push(keyword);
                }
            }
            record.keywords = keywords;
            normalized.push(record);
        }

        debug!(records = normalized.len(), "knowledge store built");
        Ok(Self {
            records: normalized,
        })
    }

    /// Return the first record having a keyword contained in `query`, ignoring case.
    #[instrument(level = "debug", skip(self), fields(records = self.records.len()))]
    pub fn find_match(&self, query: &str) -> Option<&KnowledgeRecord> {
        let query = query.to_lowercase();
        let found = self.records.iter().find(|record| {
            record
                .keywords
                .iter()
                .any(|keyword| query.contains(keyword.as_str()))
        });

        debug!(matched = found.is_some(), "keyword scan finished");
        found
    }

    /// Records in declaration order.
    pub fn records(&self) -> &[KnowledgeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexi_shared::{AppConfig, Citation};

    fn record(keywords: &[&str], answer: &str) -> KnowledgeRecord {
        KnowledgeRecord {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            answer: answer.into(),
            citation: Citation::new(format!("cite {answer}"), format!("/{answer}.pdf")),
        }
    }

    fn seeded() -> KnowledgeStore {
        KnowledgeStore::new(AppConfig::default().records).expect("seeded store")
    }

    #[test]
    fn matches_keyword_case_insensitively() {
        let store = seeded();
        let hit = store
            .find_match("What does SECTION 166 say?")
            .expect("section 166 should match");
        assert!(hit.answer.contains("Motor Vehicles Act"));
        assert_eq!(hit.citation.link, "/Dani_Devi_v_Pritam_Singh.pdf");
    }

    #[test]
    fn substring_containment_not_tokenised() {
        let store = seeded();
        // "self-employed" inside a longer word still counts.
        assert!(store.find_match("a self-employedness question").is_some());
        assert!(store.find_match("motoraccident").is_none());
    }

    #[test]
    fn unmatched_query_returns_none() {
        let store = seeded();
        assert!(store.find_match("what is the capital of France").is_none());
    }

    #[test]
    fn first_record_in_declaration_order_wins() {
        let store = KnowledgeStore::new(vec![
            record(&["lease"], "first"),
            record(&["deposit", "lease"], "second"),
        ])
        .expect("store");

        assert_eq!(store.find_match("lease deposit").unwrap().answer, "first");
        assert_eq!(store.find_match("my deposit").unwrap().answer, "second");
    }

    #[test]
    fn lookup_is_deterministic() {
        let store = seeded();
        let a = store.find_match("motor accident claim").map(|r| r.answer.clone());
        let b = store.find_match("motor accident claim").map(|r| r.answer.clone());
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn keywords_are_normalised() {
        let store = KnowledgeStore::new(vec![record(&["Tenancy", "tenancy", "EVICTION"], "t")])
            .expect("store");
        assert_eq!(store.records()[0].keywords, vec!["tenancy", "eviction"]);
        assert!(store.find_match("Eviction notice").is_some());
    }

    #[test]
    fn padded_keyword_keeps_its_spaces() {
        let store = KnowledgeStore::new(vec![record(&[" Tort "], "tort")]).expect("store");
        assert_eq!(store.records()[0].keywords, vec![" tort "]);
        assert!(store.find_match("how do I distort a photo").is_none());
        assert!(store.find_match("is this a tort claim").is_some());
    }

    #[test]
    fn blank_keyword_is_rejected() {
        let err = KnowledgeStore::new(vec![record(&["ok"], "a"), record(&["  "], "b")])
            .expect_err("blank keyword");
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn record_without_keywords_is_rejected() {
        assert!(KnowledgeStore::new(vec![record(&[], "empty")]).is_err());
    }

    #[test]
    fn empty_store_never_matches() {
        let store = KnowledgeStore::new(Vec::new()).expect("empty store");
        assert!(store.is_empty());
        assert!(store.find_match("section 166").is_none());
    }
}
