//! Suffix array, rank array and adjacent-suffix LCP array.
//!
//! Built by prefix doubling with counting sorts, so construction is
//! `O(n log n)` regardless of how repetitive the input is.

/// The suffix order of a text together with its inverse and height arrays.
#[derive(Debug, Clone)]
pub struct SuffixIndex {
    /// `sa[i]` is the offset of the suffix ranked `i`.
    pub sa: Vec<usize>,
    /// `rank[p]` is the rank of the suffix starting at `p`.
    pub rank: Vec<usize>,
    /// `lcp[i]` is the common prefix length of the suffixes ranked `i - 1` and `i`;
    /// `lcp[0]` is zero.
    pub lcp: Vec<usize>,
}

impl SuffixIndex {
    /// Builds the index over `text`.
    pub fn build(text: &[u8]) -> Self {
        let n = text.len();
        let sa = suffix_order(text);

        let mut rank = vec![0; n];
        for (i, &pos) in sa.iter().enumerate() {
            rank[pos] = i;
        }
        debug_assert!((0..n).all(|i| rank[sa[i]] == i));

        let lcp = heights(text, &sa, &rank);
        Self { sa, rank, lcp }
    }

    /// Number of suffixes, including the terminator's.
    pub fn len(&self) -> usize {
        self.sa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }
}

fn suffix_order(text: &[u8]) -> Vec<usize> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sa = vec![0; n];
    let mut rank: Vec<usize> = text.iter().map(|&b| b as usize).collect();
    let mut next_rank = vec![0; n];
    let mut by_second = vec![0; n];
    let mut bucket = vec![0usize; n.max(256)];

    let mut classes = 256;
    counting_sort(&rank, 0..n, &mut bucket[..classes], &mut sa);

    let mut k = 1;
    while k < n {
        // Suffixes too short for a second key sort first.
        let mut filled = 0;
        for pos in n - k..n {
            by_second[filled] = pos;
            filled += 1;
        }
        for &pos in &sa {
            if pos >= k {
                by_second[filled] = pos - k;
                filled += 1;
            }
        }

        counting_sort(&rank, by_second.iter().copied(), &mut bucket[..classes], &mut sa);

        let key = |pos: usize| (rank[pos], rank.get(pos + k).copied());
        next_rank[sa[0]] = 0;
        for i in 1..n {
            let bump = key(sa[i]) != key(sa[i - 1]);
            next_rank[sa[i]] = next_rank[sa[i - 1]] + bump as usize;
        }
        std::mem::swap(&mut rank, &mut next_rank);

        classes = rank[sa[n - 1]] + 1;
        if classes == n {
            break;
        }
        k *= 2;
    }
    sa
}

/// Stable counting sort of `order` by `keys`, written into `out`.
fn counting_sort<I>(keys: &[usize], order: I, bucket: &mut [usize], out: &mut [usize])
where
    I: DoubleEndedIterator<Item = usize> + Clone,
{
    bucket.fill(0);
    for pos in order.clone() {
        bucket[keys[pos]] += 1;
    }
    let mut sum = 0;
    for count in bucket.iter_mut() {
        sum += *count;
        *count = sum;
    }
    for pos in order.rev() {
        let slot = &mut bucket[keys[pos]];
        *slot -= 1;
        out[*slot] = pos;
    }
}

/// Kasai's linear-time height computation.
fn heights(text: &[u8], sa: &[usize], rank: &[usize]) -> Vec<usize> {
    let n = text.len();
    let mut lcp = vec![0; n];
    let mut h = 0;
    for pos in 0..n {
        if rank[pos] == 0 {
            h = 0;
            continue;
        }
        let prev = sa[rank[pos] - 1];
        while pos + h < n && prev + h < n && text[pos + h] == text[prev + h] {
            h += 1;
        }
        lcp[rank[pos]] = h;
        h = h.saturating_sub(1);
    }
    lcp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(text: &[u8]) -> Vec<usize> {
        let mut sa: Vec<usize> = (0..text.len()).collect();
        sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
        sa
    }

    fn common_prefix(a: &[u8], b: &[u8]) -> usize {
        a.iter().zip(b).take_while(|(x, y)| x == y).count()
    }

    #[test]
    fn test_banana() {
        let index = SuffixIndex::build(b"banana\0");
        assert_eq!(index.sa, vec![6, 5, 3, 1, 0, 4, 2]);
        assert_eq!(index.lcp, vec![0, 0, 1, 3, 0, 0, 2]);
    }

    #[test]
    fn test_matches_naive_order() {
        for text in [&b"mississippi\0"[..], b"aaaaaaaaaa\0", b"abcabcabd\0", b"\0", b"ba"] {
            let index = SuffixIndex::build(text);
            assert_eq!(index.sa, naive(text), "text {:?}", text);
            for i in 0..index.len() {
                assert_eq!(index.rank[index.sa[i]], i);
            }
            for i in 1..index.len() {
                let expected = common_prefix(&text[index.sa[i - 1]..], &text[index.sa[i]..]);
                assert_eq!(index.lcp[i], expected);
            }
        }
    }

    #[test]
    fn test_empty_text() {
        let index = SuffixIndex::build(b"");
        assert!(index.is_empty());
        assert!(index.lcp.is_empty());
    }
}
