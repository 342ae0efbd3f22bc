//! Content-addressed catalog of the substrings the grammar can name.

use crate::hash::PrefixHash;
use crate::suffix_array::SuffixIndex;
use ahash::AHashMap as HashMap;
use std::collections::hash_map::Entry;

/// Dense handle of a distinct substring value.
pub type Id = usize;

/// The zero-length substring.
pub const EMPTY_ID: Id = 0;
/// The whole document.
pub const DOCUMENT_ID: Id = 1;

/// Representative occurrence of an id inside the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Maps every single byte, every LCP-implied repeat and the document itself to
/// an [`Id`], deduplicated by content hash.
#[derive(Debug, Clone)]
pub struct Catalog {
    spans: Vec<Span>,
    dict: HashMap<u64, Id>,
    hash: PrefixHash,
    /// Id of the repeat shared with the previous suffix, per suffix-array rank.
    lcp_ids: Vec<Id>,
    /// Id of the longest repeat (at least one byte) anchored at each offset.
    pos_to_id: Vec<Id>,
}

impl Catalog {
    /// Builds the catalog for `text` (content plus terminator).
    pub fn build(text: &[u8], index: &SuffixIndex) -> Self {
        let n = text.len();
        assert!(n > 0, "indexed text always carries a terminator");
        assert_eq!(index.len(), n, "suffix index does not match the text");

        let mut catalog = Self {
            spans: Vec::with_capacity(n + 2),
            dict: HashMap::with_capacity(n + 2),
            hash: PrefixHash::new(text),
            lcp_ids: Vec::with_capacity(n),
            pos_to_id: vec![EMPTY_ID; n + 1],
        };

        let empty = catalog.intern(n, 0);
        assert_eq!(empty, EMPTY_ID);
        // The document owns its id even when its content is empty.
        let doc_hash = catalog.hash.substring(0, n - 1);
        catalog.spans.push(Span {
            offset: 0,
            len: n - 1,
        });
        catalog.dict.entry(doc_hash).or_insert(DOCUMENT_ID);

        for pos in 0..n {
            catalog.intern(pos, 1);
        }
        for i in 0..n {
            let id = catalog.intern(index.sa[i], index.lcp[i]);
            catalog.lcp_ids.push(id);
        }

        for pos in 0..n {
            let rank = index.rank[pos];
            let next = index.lcp.get(rank + 1).copied().unwrap_or(0);
            let len = index.lcp[rank].max(next).max(1);
            catalog.pos_to_id[pos] = catalog
                .lookup(pos, len)
                .expect("every anchored repeat is interned");
        }

        log::debug!("catalog: {} ids over {} positions", catalog.len(), n);
        catalog
    }

    /// Returns the id of `text[offset..offset + len]`, creating it on first sight.
    fn intern(&mut self, offset: usize, len: usize) -> Id {
        let hash = self.hash.substring(offset, offset + len);
        match self.dict.entry(hash) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let id = self.spans.len();
                self.spans.push(Span { offset, len });
                e.insert(id);
                id
            }
        }
    }

    /// Id of the content at `text[offset..offset + len]`, if catalogued.
    pub fn lookup(&self, offset: usize, len: usize) -> Option<Id> {
        self.dict
            .get(&self.hash.substring(offset, offset + len))
            .copied()
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline]
    pub fn span(&self, id: Id) -> Span {
        self.spans[id]
    }

    /// Id of the longest repeat starting at `offset`.
    #[inline]
    pub fn position_id(&self, offset: usize) -> Id {
        self.pos_to_id[offset]
    }

    /// Id of the prefix shared by the suffixes ranked `rank - 1` and `rank`.
    #[inline]
    pub fn lcp_id(&self, rank: usize) -> Id {
        self.lcp_ids[rank]
    }
}
