//! Mention arena with a token → mention index.
//!
//! Mentions are addressed by dense `u32` handles (their position in the arena) and
//! are never removed. Each token keeps a Roaring bitmap of the handles of every
//! mention whose extent covers it.

use ahash::AHashMap;
use kemgraph_rdf::RdfNode;
use roaring::RoaringBitmap;

use crate::tokens::TokenIdx;

pub type MentionHandle = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub iri: RdfNode,
    /// Dependency head of the extent, when it has exactly one.
    pub head: Option<TokenIdx>,
    /// Sorted by offset, duplicate-free.
    pub extent: Vec<TokenIdx>,
}

impl Mention {
    pub fn covers(&self, token: TokenIdx) -> bool {
        self.extent.contains(&token)
    }
}

#[derive(Debug, Default)]
pub struct SpanIndex {
    mentions: Vec<Mention>,
    by_token: AHashMap<TokenIdx, RoaringBitmap>,
    by_extent: AHashMap<Vec<TokenIdx>, MentionHandle>,
}

impl SpanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mention; a mention with the same extent is reused.
    pub fn insert(&mut self, mention: Mention) -> MentionHandle {
        if let Some(&handle) = self.by_extent.get(&mention.extent) {
            return handle;
        }
        let handle = self.mentions.len() as MentionHandle;
        for &t in &mention.extent {
            self.by_token.entry(t).or_default().insert(handle);
        }
        self.by_extent.insert(mention.extent.clone(), handle);
        self.mentions.push(mention);
        handle
    }

    pub fn get(&self, handle: MentionHandle) -> Option<&Mention> {
        self.mentions.get(handle as usize)
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MentionHandle, &Mention)> {
        self.mentions
            .iter()
            .enumerate()
            .map(|(i, m)| (i as MentionHandle, m))
    }

    /// Handles of the mentions covering `token`.
    pub fn covering(&self, token: TokenIdx) -> RoaringBitmap {
        self.by_token.get(&token).cloned().unwrap_or_default()
    }

    /// Handles of the mentions covering any of `tokens`.
    pub fn covering_any(&self, tokens: &[TokenIdx]) -> RoaringBitmap {
        let mut out = RoaringBitmap::new();
        for t in tokens {
            if let Some(bits) = self.by_token.get(t) {
                out |= bits;
            }
        }
        out
    }

    /// The mention with exactly this (sorted) extent.
    pub fn find_exact(&self, extent: &[TokenIdx]) -> Option<MentionHandle> {
        self.by_extent.get(extent).copied()
    }

    /// Largest mention covering `token`; ties go to the earliest registered.
    pub fn best(&self, token: TokenIdx) -> Option<MentionHandle> {
        let bits = self.by_token.get(&token)?;
        let mut best: Option<(usize, MentionHandle)> = None;
        for handle in bits.iter() {
            let size = self.mentions[handle as usize].extent.len();
            if best.map_or(true, |(s, _)| size > s) {
                best = Some((size, handle));
            }
        }
        best.map(|(_, h)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mention(extent: &[TokenIdx]) -> Mention {
        Mention {
            iri: RdfNode::iri(format!("http://x.org/d#m{extent:?}")),
            head: extent.last().copied(),
            extent: extent.to_vec(),
        }
    }

    #[test]
    fn insert_is_idempotent_on_extent() {
        let mut idx = SpanIndex::new();
        let a = idx.insert(mention(&[1, 2]));
        let b = idx.insert(mention(&[1, 2]));
        assert_eq!(a, b);
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.find_exact(&[1, 2]), Some(a));
        assert_eq!(idx.find_exact(&[1]), None);
    }

    #[test]
    fn covering_sets_follow_extents() {
        let mut idx = SpanIndex::new();
        let a = idx.insert(mention(&[1, 2]));
        let b = idx.insert(mention(&[2]));
        let c = idx.insert(mention(&[5]));
        assert_eq!(idx.covering(2).iter().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(idx.covering_any(&[1, 5]).iter().collect::<Vec<_>>(), vec![a, c]);
        assert!(idx.covering(9).is_empty());
    }

    #[test]
    fn best_prefers_largest_then_earliest() {
        let mut idx = SpanIndex::new();
        idx.insert(mention(&[3]));
        let wide = idx.insert(mention(&[2, 3]));
        let other_wide = idx.insert(mention(&[3, 4]));
        assert_eq!(idx.best(3), Some(wide));
        assert_ne!(idx.best(3), Some(other_wide));
        assert_eq!(idx.best(4), Some(other_wide));
        assert_eq!(idx.best(7), None);
    }
}
