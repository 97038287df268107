//! Union-find over dense `usize` ids (path compression + union by rank).

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Grow to `n` elements; new elements are singletons.
    pub fn grow(&mut self, n: usize) {
        while self.parent.len() < n {
            self.parent.push(self.parent.len());
            self.rank.push(0);
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut x0 = x;
        while self.parent[x0] != x0 {
            x0 = self.parent[x0];
        }
        let root = x0;
        let mut x1 = x;
        while self.parent[x1] != x1 {
            let p = self.parent[x1];
            self.parent[x1] = root;
            x1 = p;
        }
        root
    }

    /// Merge the classes of `a` and `b`; returns `false` if they were already merged.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let rka = self.rank[ra];
        let rkb = self.rank[rb];
        if rka < rkb {
            self.parent[ra] = rb;
        } else if rka > rkb {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] = rka.saturating_add(1);
        }
        true
    }

    /// All classes, each sorted ascending, ordered by their smallest member.
    pub fn classes(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for id in 0..self.parent.len() {
            let root = self.find(id);
            by_root.entry(root).or_default().push(id);
        }
        let mut out: Vec<Vec<usize>> = by_root.into_values().collect();
        out.sort_by_key(|members| members[0]);
        out
    }
}
