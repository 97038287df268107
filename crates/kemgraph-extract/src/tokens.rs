//! Token lookup, dependency heads and span filtering.

use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};

use crate::document::{Document, Token};
use crate::error::ExtractError;

/// Index of a token in [`Document::tokens`].
pub type TokenIdx = usize;

const SYMBOLS: [&str; 4] = ["$", "#", "&", "€"];

/// Read-only view over a document's tokens and dependency tree.
///
/// Spans handed out by this index are sorted by character offset and duplicate-free.
#[derive(Debug)]
pub struct TokenIndex<'d> {
    tokens: &'d [Token],
    by_id: AHashMap<&'d str, TokenIdx>,
    governors: Vec<Option<(TokenIdx, &'d str)>>,
    sentences: BTreeMap<usize, Vec<TokenIdx>>,
}

impl<'d> TokenIndex<'d> {
    pub fn new(doc: &'d Document) -> Self {
        let tokens = doc.tokens.as_slice();
        let by_id: AHashMap<&str, TokenIdx> = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        let mut governors = vec![None; tokens.len()];
        for dep in &doc.deps {
            match (by_id.get(dep.from.as_str()), by_id.get(dep.to.as_str())) {
                (Some(&from), Some(&to)) if from != to => {
                    if governors[to].is_none() {
                        governors[to] = Some((from, dep.label.as_str()));
                    }
                }
                _ => tracing::debug!(from = %dep.from, to = %dep.to, "ignoring dependency"),
            }
        }

        let mut sentences: BTreeMap<usize, Vec<TokenIdx>> = BTreeMap::new();
        for (i, t) in tokens.iter().enumerate() {
            sentences.entry(t.sentence).or_default().push(i);
        }
        for members in sentences.values_mut() {
            members.sort_by_key(|&i| (tokens[i].offset, i));
        }

        Self {
            tokens,
            by_id,
            governors,
            sentences,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, idx: TokenIdx) -> &'d Token {
        &self.tokens[idx]
    }

    pub fn lookup(&self, id: &str) -> Option<TokenIdx> {
        self.by_id.get(id).copied()
    }

    pub fn sentence_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.sentences.keys().copied()
    }

    /// Resolve token ids into a sorted span.
    pub fn resolve_span(&self, ids: &[String], item: &str) -> Result<Vec<TokenIdx>, ExtractError> {
        if ids.is_empty() {
            return Err(ExtractError::EmptySpan { item: item.to_string() });
        }
        let resolved = ids
            .iter()
            .map(|id| self.lookup(id).ok_or_else(|| ExtractError::UnknownToken(id.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.sorted(resolved))
    }

    /// Sort by offset and drop duplicates.
    pub fn sorted(&self, tokens: impl IntoIterator<Item = TokenIdx>) -> Vec<TokenIdx> {
        let set: BTreeSet<(usize, TokenIdx)> = tokens
            .into_iter()
            .map(|i| (self.tokens[i].offset, i))
            .collect();
        set.into_iter().map(|(_, i)| i).collect()
    }

    pub fn governor(&self, idx: TokenIdx) -> Option<TokenIdx> {
        self.governors[idx].map(|(from, _)| from)
    }

    /// Label of the dependency governing `idx`.
    pub fn relation(&self, idx: TokenIdx) -> Option<&'d str> {
        self.governors[idx].map(|(_, label)| label)
    }

    /// Dependency edges as `(governor, dependent, label)`, in input order.
    pub fn edges<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = (TokenIdx, TokenIdx, &'a str)> + 'a {
        doc.deps.iter().filter_map(move |dep| {
            let from = self.lookup(&dep.from)?;
            let to = self.lookup(&dep.to)?;
            Some((from, to, dep.label.as_str()))
        })
    }

    /// The single token of `span` whose governor lies outside the span.
    ///
    /// `None` when the span is empty or has several such roots.
    pub fn head(&self, span: &[TokenIdx]) -> Option<TokenIdx> {
        let mut root = None;
        for &t in span {
            let outside = match self.governor(t) {
                Some(g) => !span.contains(&g),
                None => true,
            };
            if outside {
                match root {
                    None => root = Some(t),
                    Some(r) if r != t => return None,
                    Some(_) => {}
                }
            }
        }
        root
    }

    /// Whether the sorted span is a contiguous run of its first token's sentence.
    pub fn is_consecutive(&self, span: &[TokenIdx]) -> bool {
        let Some(&first) = span.first() else {
            return false;
        };
        let Some(sentence) = self.sentences.get(&self.tokens[first].sentence) else {
            return false;
        };
        match sentence.iter().position(|&t| t == first) {
            Some(start) => sentence
                .get(start..start + span.len())
                .is_some_and(|window| window == span),
            None => false,
        }
    }

    /// Drop leading determiners, pronouns and particles, and every token without a
    /// letter or digit (currency-like symbols excepted).
    pub fn filter_terms(&self, span: &[TokenIdx]) -> Vec<TokenIdx> {
        let mut out = Vec::with_capacity(span.len());
        let mut at_beginning = true;
        for t in self.sorted(span.iter().copied()) {
            let token = &self.tokens[t];
            let upos = token.upos.to_ascii_uppercase();
            if at_beginning && matches!(upos.as_str(), "DET" | "PRON" | "PART") {
                continue;
            }
            let form = token.form.as_str();
            if SYMBOLS.contains(&form) || form.chars().any(|c| c.is_ascii_alphanumeric()) {
                out.push(t);
                at_beginning = false;
            }
        }
        out
    }

    /// Space-joined forms, lower-cased except for proper nouns.
    pub fn label(&self, span: &[TokenIdx]) -> String {
        self.sorted(span.iter().copied())
            .into_iter()
            .map(|t| {
                let token = &self.tokens[t];
                if token.upos == "PROPN" {
                    token.form.clone()
                } else {
                    token.form.to_lowercase()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn sentence_of(&self, span: &[TokenIdx]) -> Option<usize> {
        span.first().map(|&t| self.tokens[t].sentence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Dependency;

    fn tok(id: &str, sentence: usize, offset: usize, form: &str, upos: &str) -> Token {
        Token {
            id: id.to_string(),
            sentence,
            offset,
            length: form.chars().count(),
            form: form.to_string(),
            lemma: form.to_lowercase(),
            upos: upos.to_string(),
            ..Default::default()
        }
    }

    fn dep(from: &str, to: &str, label: &str) -> Dependency {
        Dependency {
            from: from.to_string(),
            to: to.to_string(),
            label: label.to_string(),
        }
    }

    // "The New York office ." with "office" as root.
    fn doc() -> Document {
        Document {
            uri: "http://x.org/d".into(),
            tokens: vec![
                tok("t1", 0, 0, "The", "DET"),
                tok("t2", 0, 4, "New", "PROPN"),
                tok("t3", 0, 8, "York", "PROPN"),
                tok("t4", 0, 13, "office", "NOUN"),
                tok("t5", 0, 20, ".", "PUNCT"),
                tok("t6", 1, 22, "Yes", "INTJ"),
            ],
            deps: vec![
                dep("t4", "t1", "det"),
                dep("t3", "t2", "compound"),
                dep("t4", "t3", "compound"),
                dep("t4", "t5", "punct"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn head_is_the_unique_root_inside_the_span() {
        let d = doc();
        let idx = TokenIndex::new(&d);
        assert_eq!(idx.head(&[1, 2]), Some(2));
        assert_eq!(idx.head(&[0, 1, 2, 3]), Some(3));
        // "The" and "New York" hang off "office", which is outside.
        assert_eq!(idx.head(&[0, 1, 2]), None);
        assert_eq!(idx.relation(2), Some("compound"));
    }

    #[test]
    fn spans_resolve_sorted_and_deduplicated() {
        let d = doc();
        let idx = TokenIndex::new(&d);
        let ids: Vec<String> = ["t3", "t2", "t3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(idx.resolve_span(&ids, "e1").unwrap(), vec![1, 2]);
        assert_eq!(
            idx.resolve_span(&["t9".to_string()], "e1"),
            Err(ExtractError::UnknownToken("t9".into()))
        );
        assert!(matches!(idx.resolve_span(&[], "e1"), Err(ExtractError::EmptySpan { .. })));
    }

    #[test]
    fn consecutive_within_sentence_only() {
        let d = doc();
        let idx = TokenIndex::new(&d);
        assert!(idx.is_consecutive(&[1, 2, 3]));
        assert!(!idx.is_consecutive(&[1, 3]));
        assert!(!idx.is_consecutive(&[4, 5]));
    }

    #[test]
    fn filtering_and_labels() {
        let d = doc();
        let idx = TokenIndex::new(&d);
        assert_eq!(idx.filter_terms(&[0, 1, 2, 3, 4]), vec![1, 2, 3]);
        assert_eq!(idx.label(&[1, 2, 3]), "New York office");
    }
}
