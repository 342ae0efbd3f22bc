//! Short printable names for ids, most referenced first.

use crate::catalog::Id;
use ahash::AHashSet as HashSet;

/// Issues names from a growing base-N sequence over the charset.
///
/// Names are produced shortest first. Reserved names are skipped for good, so
/// the pool only ever grows and a name keeps its position once issued.
#[derive(Debug, Clone)]
pub struct SymbolAllocator {
    charset: Vec<u8>,
    reserved: HashSet<String>,
    pool: Vec<String>,
    /// Sequence number of the next candidate, skipped ones included.
    next_seq: u64,
    skipped: usize,
}

impl SymbolAllocator {
    pub fn new<I, S>(charset: &[u8], reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        assert!(!charset.is_empty(), "symbol charset must not be empty");
        Self {
            charset: charset.to_vec(),
            reserved: reserved.into_iter().map(Into::into).collect(),
            pool: Vec::new(),
            next_seq: 0,
            skipped: 0,
        }
    }

    /// Number of names issued so far.
    pub fn issued(&self) -> usize {
        self.pool.len()
    }

    /// Number of reserved candidates skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Grows the pool to at least `count` names.
    fn reserve(&mut self, count: usize) {
        while self.pool.len() < count {
            let name = self.candidate(self.next_seq);
            self.next_seq += 1;
            if self.reserved.contains(&name) {
                self.skipped += 1;
                continue;
            }
            self.pool.push(name);
        }
    }

    /// The `seq`-th name of the unfiltered sequence.
    fn candidate(&self, mut seq: u64) -> String {
        let base = self.charset.len() as u64;
        let mut len = 1;
        let mut width = base;
        while seq >= width {
            seq -= width;
            len += 1;
            width = width.saturating_mul(base);
        }
        let mut name = String::with_capacity(len);
        for _ in 0..len {
            name.push(self.charset[(seq % base) as usize] as char);
            seq /= base;
        }
        name
    }

    /// Names every id, ordering by descending reference count then ascending id.
    pub fn assign(&mut self, refcounts: &[u32]) -> SymbolTable {
        self.reserve(refcounts.len());
        let mut order: Vec<Id> = (0..refcounts.len()).collect();
        order.sort_by_key(|&id| (std::cmp::Reverse(refcounts[id]), id));

        let mut names = vec![String::new(); refcounts.len()];
        for (slot, &id) in order.iter().enumerate() {
            names[id] = self.pool[slot].clone();
        }
        SymbolTable { names }
    }
}

/// Per-iteration mapping from id to name.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    names: Vec<String>,
}

impl SymbolTable {
    #[inline]
    pub fn name(&self, id: Id) -> &str {
        &self.names[id]
    }

    #[inline]
    pub fn name_len(&self, id: Id) -> usize {
        self.names[id].len()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CHARSET, DEFAULT_RESERVED};

    fn allocator() -> SymbolAllocator {
        SymbolAllocator::new(DEFAULT_CHARSET, DEFAULT_RESERVED.iter().copied())
    }

    #[test]
    fn test_most_referenced_gets_shortest_name() {
        let mut alloc = allocator();
        let table = alloc.assign(&[0, 5, 5, 9]);
        assert_eq!(table.name(3), "a");
        assert_eq!(table.name(1), "b");
        assert_eq!(table.name(2), "c");
        assert_eq!(table.name(0), "d");
    }

    #[test]
    fn test_names_grow_in_length() {
        let mut alloc = allocator();
        let table = alloc.assign(&vec![0; 60]);
        assert_eq!(table.name(53), "_");
        assert_eq!(table.name(54), "aa");
        assert_eq!(table.name(55), "ba");
    }

    #[test]
    fn test_reserved_names_are_skipped() {
        let mut alloc = allocator();
        let table = alloc.assign(&vec![1; 54 * 54 + 54]);
        for id in 0..table.len() {
            assert!(!DEFAULT_RESERVED.contains(&table.name(id)));
        }
        // Only "or" falls inside the first two name lengths.
        assert_eq!(alloc.skipped(), 1);
    }

    #[test]
    fn test_pool_only_grows() {
        let mut alloc = allocator();
        alloc.assign(&[0; 10]);
        assert_eq!(alloc.issued(), 10);
        let table = alloc.assign(&[0; 3]);
        assert_eq!(alloc.issued(), 10);
        assert_eq!(table.name(2), "c");
    }

    #[test]
    fn test_custom_reserved_set() {
        let mut alloc = SymbolAllocator::new(b"ab", ["b"]);
        let table = alloc.assign(&[0, 0, 0]);
        assert_eq!(table.name(0), "a");
        assert_eq!(table.name(1), "aa");
        assert_eq!(table.name(2), "ba");
    }
}
