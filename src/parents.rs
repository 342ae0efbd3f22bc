//! Parent links: every id points at a strictly shorter id.
//!
//! Suffix-array positions are swept in decreasing LCP order while a pair of
//! union-find forests tracks the extent of each LCP interval. When the sweep
//! drops below a height, every interval closed at that height takes its parent
//! from whichever bordering position has the larger LCP.

use crate::catalog::{Catalog, Id, DOCUMENT_ID, EMPTY_ID};
use crate::suffix_array::SuffixIndex;

/// Union-find over suffix-array positions, tracking both interval ends.
struct IntervalSets {
    left: Vec<usize>,
    right: Vec<usize>,
}

impl IntervalSets {
    fn new(n: usize) -> Self {
        Self {
            left: (0..n).collect(),
            right: (0..n).collect(),
        }
    }

    fn find(forest: &mut [usize], mut x: usize) -> usize {
        while forest[x] != x {
            forest[x] = forest[forest[x]];
            x = forest[x];
        }
        x
    }

    /// Leftmost position of the interval containing `x`.
    fn left_end(&mut self, x: usize) -> usize {
        Self::find(&mut self.left, x)
    }

    /// Rightmost position of the interval containing `x`.
    fn right_end(&mut self, x: usize) -> usize {
        Self::find(&mut self.right, x)
    }

    fn merge(&mut self, x: usize, y: usize) {
        let (x, y) = (self.left_end(x), self.left_end(y));
        if x == y {
            return;
        }
        if x < y {
            self.left[y] = x;
        } else {
            self.left[x] = y;
        }
        let (x, y) = (self.right_end(x), self.right_end(y));
        assert_ne!(x, y, "interval forests diverged");
        if x < y {
            self.right[x] = y;
        } else {
            self.right[y] = x;
        }
    }
}

/// `parent(id)` for every id in a [`Catalog`].
#[derive(Debug, Clone)]
pub struct ParentLinks {
    parent: Vec<Id>,
}

impl ParentLinks {
    pub fn build(catalog: &Catalog, index: &SuffixIndex) -> Self {
        let n = index.len();
        let lcp = &index.lcp;
        let mut parent = vec![EMPTY_ID; catalog.len()];
        let mut sets = IntervalSets::new(n);

        let mut order: Vec<(usize, usize)> = lcp.iter().copied().zip(0..n).collect();
        order.sort_unstable_by(|a, b| b.cmp(a));

        let mut last_height = order.first().map_or(0, |&(h, _)| h);
        let mut pending = Vec::new();
        for &(height, i) in &order {
            if height != last_height {
                last_height = height;
                for &j in &pending {
                    let l = sets.left_end(j);
                    let r = sets.right_end(j);
                    assert!(l > 0, "a positive-height interval cannot start at rank 0");
                    let pick_right = r + 1 < n && lcp[r + 1] >= lcp[l - 1];
                    let border = if pick_right { r + 1 } else { l - 1 };
                    parent[catalog.lcp_id(j)] = catalog.lcp_id(border);
                }
                pending.clear();
            }
            pending.push(i);
            if i > 0 && lcp[i - 1] >= height {
                sets.merge(i, i - 1);
            }
            if i + 1 < n && lcp[i + 1] >= height {
                sets.merge(i + 1, i);
            }
        }

        let anchored = catalog.position_id(0);
        if parent[DOCUMENT_ID] == EMPTY_ID
            && catalog.span(anchored).len < catalog.span(DOCUMENT_ID).len
        {
            parent[DOCUMENT_ID] = anchored;
        }

        for (id, &p) in parent.iter().enumerate().skip(1) {
            // An empty document has nothing shorter to point at.
            if id == DOCUMENT_ID && catalog.span(id).len == 0 {
                continue;
            }
            assert!(
                catalog.span(p).len < catalog.span(id).len,
                "parent of id {id} is not shorter"
            );
        }
        log::debug!("parent links built for {} ids", parent.len());
        Self { parent }
    }

    #[inline]
    pub fn parent(&self, id: Id) -> Id {
        self.parent[id]
    }

    /// Ancestors of `id`, nearest first, ending with the empty id.
    pub fn chain(&self, id: Id) -> impl Iterator<Item = Id> + '_ {
        let mut current = id;
        std::iter::from_fn(move || {
            if current == EMPTY_ID {
                return None;
            }
            current = self.parent[current];
            Some(current)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(content: &[u8]) -> (Vec<u8>, Catalog, ParentLinks) {
        let mut text = content.to_vec();
        text.push(0);
        let index = SuffixIndex::build(&text);
        let catalog = Catalog::build(&text, &index);
        let links = ParentLinks::build(&catalog, &index);
        (text, catalog, links)
    }

    #[test]
    fn test_union_find_tracks_ends() {
        let mut sets = IntervalSets::new(6);
        sets.merge(2, 1);
        sets.merge(3, 2);
        assert_eq!(sets.left_end(3), 1);
        assert_eq!(sets.right_end(1), 3);
        assert_eq!(sets.left_end(5), 5);
    }

    #[test]
    fn test_banana_chain() {
        let (_, catalog, links) = build(b"banana");
        let ana = catalog.lookup(1, 3).unwrap();
        let a = catalog.lookup(1, 1).unwrap();
        let na = catalog.lookup(2, 2).unwrap();
        assert_eq!(links.parent(ana), a);
        assert_eq!(links.parent(a), EMPTY_ID);
        assert_eq!(links.parent(na), EMPTY_ID);
    }

    #[test]
    fn test_document_parent_is_anchored_repeat() {
        let (_, catalog, links) = build(b"abcab");
        assert_eq!(links.parent(DOCUMENT_ID), catalog.lookup(0, 2).unwrap());
    }

    #[test]
    fn test_chains_shrink_to_empty() {
        let (_, catalog, links) = build(b"abracadabra abracadabra");
        for id in 0..catalog.len() {
            let chain: Vec<Id> = links.chain(id).collect();
            assert!(chain.len() <= catalog.span(id).len);
            if id != EMPTY_ID {
                assert_eq!(chain.last(), Some(&EMPTY_ID));
            }
            let mut len = catalog.span(id).len;
            for p in chain {
                assert!(catalog.span(p).len < len);
                len = catalog.span(p).len;
            }
        }
    }

    #[test]
    fn test_empty_document() {
        let (_, catalog, links) = build(b"");
        assert_eq!(links.parent(DOCUMENT_ID), EMPTY_ID);
        assert_eq!(catalog.span(DOCUMENT_ID).len, 0);
        assert_eq!(links.chain(DOCUMENT_ID).collect::<Vec<_>>(), vec![EMPTY_ID]);
    }
}
