use std::{cmp, fmt, ops::Index};

/// How often each byte value occurs in some input.
///
/// All 256 counters are stored, but iteration only ever yields the bytes
/// that actually occur.
#[derive(Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl Index<u8> for FrequencyTable {
    type Output = u64;

    fn index(&self, index: u8) -> &u64 {
        &self.counts[index as usize]
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

// Only the bytes that occur, so trace output stays readable.
impl fmt::Debug for FrequencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FrequencyTable {
    pub fn of(bytes: &[u8]) -> Self {
        let mut this = FrequencyTable::default();
        for &byte in bytes {
            this.counts[byte as usize] += 1;
        }
        this
    }

    pub fn get(&self, byte: u8) -> u64 {
        self[byte]
    }

    /// Present bytes and their counts, in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=u8::MAX)
            .zip(self.counts.iter().copied())
            .filter(|&(_, count)| count > 0)
    }

    /// Number of distinct bytes present.
    pub fn distinct(&self) -> usize {
        self.iter().count()
    }

    /// Total number of bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Shannon entropy in bits per symbol.
    pub fn entropy(&self) -> f64 {
        let total = self.total() as f64;
        self.iter()
            .map(|(_, count)| {
                let p = count as f64 / total;
                -p * p.log2()
            })
            .sum::<f64>()
            .max(0.0)
    }

    /// The `n` most frequent bytes, most frequent first; ties go to the lower byte.
    pub fn most_frequent(&self, n: usize) -> Vec<(u8, u64)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by_key(|&(byte, count)| (cmp::Reverse(count), byte));
        sorted.truncate(n);
        sorted
    }

    /// Share of the input taken by `byte`, as a fraction of 1.
    pub fn share(&self, byte: u8) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self[byte] as f64 / total as f64,
        }
    }
}
