/// Polynomial rolling hash over every prefix of a text.
///
/// `substring(l, r)` hashes `text[l..r]` in O(1). Equal byte strings always
/// hash equal, wherever they occur.
#[derive(Debug, Clone)]
pub struct PrefixHash {
    prefix: Vec<u64>,
    powers: Vec<u64>,
}

const MULTIPLIER: u64 = 0x0100_0193;
const BIAS: u64 = 0x1234;

impl PrefixHash {
    pub fn new(text: &[u8]) -> Self {
        let mut prefix = Vec::with_capacity(text.len() + 1);
        let mut powers = Vec::with_capacity(text.len() + 1);
        prefix.push(0u64);
        powers.push(1u64);
        for (i, &b) in text.iter().enumerate() {
            prefix.push(
                prefix[i]
                    .wrapping_mul(MULTIPLIER)
                    .wrapping_add(b as u64 + BIAS),
            );
            powers.push(powers[i].wrapping_mul(MULTIPLIER));
        }
        Self { prefix, powers }
    }

    /// Hash of `text[l..r]`. The empty string hashes to zero.
    #[inline]
    pub fn substring(&self, l: usize, r: usize) -> u64 {
        debug_assert!(l <= r);
        self.prefix[r].wrapping_sub(self.prefix[l].wrapping_mul(self.powers[r - l]))
    }
}
