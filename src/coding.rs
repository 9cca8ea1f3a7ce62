use {
    crate::tree::HuffmanTree,
    arr_macro::arr,
    bitvec::prelude::*,
    std::{fmt, ops::Index},
};

/// The bit string for every byte that has a leaf in some tree.
pub struct HuffmanCoding {
    codings: [Option<BitBox<Msb0, u8>>; 256],
}

/// Output of [`HuffmanCoding::pack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    pub payload: Vec<u8>,
    /// Zero bits appended to the last byte, or 8 if none were needed.
    pub padding: u8,
    /// Code bits, not counting padding.
    pub bit_len: usize,
}

impl Index<u8> for HuffmanCoding {
    type Output = BitSlice<Msb0, u8>;

    /// # Panics
    ///
    /// If `index` has no leaf in the tree this coding was made from.
    fn index(&self, index: u8) -> &BitSlice<Msb0, u8> {
        match &self.codings[index as usize] {
            Some(coding) => &**coding,
            None => panic!("byte {:#04x} has no Huffman code", index),
        }
    }
}

// Only the bytes that have a code.
impl fmt::Debug for HuffmanCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg_map = f.debug_map();
        for byte in 0..=u8::MAX {
            if let Some(code) = self.code_string(byte) {
                dbg_map.entry(&byte, &code);
            }
        }
        dbg_map.finish()
    }
}

impl HuffmanCoding {
    pub fn of(tree: &HuffmanTree) -> Self {
        let mut this = HuffmanCoding {
            // BitBox is not Copy, so no `[None; 256]`
            codings: arr![None; 256],
        };
        let mut path = BitVec::new();
        if let HuffmanTree::Leaf { .. } = tree {
            // Never hand out an empty code.
            path.push(false);
        }
        this.apply(tree, &mut path);
        log::trace!("Huffman coding: {:?}", this);
        this
    }

    fn apply(&mut self, tree: &HuffmanTree, path: &mut BitVec<Msb0, u8>) {
        match tree {
            &HuffmanTree::Leaf { byte } => {
                let coding = &mut self.codings[byte as usize];
                debug_assert!(coding.is_none());
                *coding = Some(path.clone().into_boxed_bitslice());
            }
            HuffmanTree::Node { left, right } => {
                path.push(false);
                self.apply(left, path);
                path.pop();
                if let Some(right) = right {
                    path.push(true);
                    self.apply(right, path);
                    path.pop();
                }
            }
        }
    }

    pub fn get(&self, byte: u8) -> Option<&BitSlice<Msb0, u8>> {
        self.codings[byte as usize].as_deref()
    }

    /// The code for `byte` spelled out as `0`s and `1`s.
    pub fn code_string(&self, byte: u8) -> Option<String> {
        self.get(byte).map(|code| {
            code.iter()
                .map(|bit| match bit {
                    true => '1',
                    false => '0',
                })
                .collect()
        })
    }

    fn push_byte(&self, byte: u8, bits: &mut BitVec<Msb0, u8>) {
        bits.extend_from_slice(&self[byte])
    }

    /// Concatenate the codes of `bytes`, most significant bit first, and pad
    /// the result with zero bits to a whole number of bytes.
    ///
    /// # Panics
    ///
    /// If some byte in `bytes` has no code.
    pub fn pack(&self, bytes: &[u8]) -> Packed {
        let mut bits: BitVec<Msb0, u8> = BitVec::new();
        for &byte in bytes {
            self.push_byte(byte, &mut bits);
        }

        let bit_len = bits.len();
        let padding = 8 - (bit_len % 8) as u8;
        while bits.len() % 8 != 0 {
            bits.push(false);
        }
        log::debug!("Packed {} bits with {} bits of padding", bit_len, padding % 8);

        Packed {
            payload: bits.into_vec(),
            padding,
            bit_len,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::frequency::FrequencyTable};

    fn coding_of(bytes: &[u8]) -> HuffmanCoding {
        HuffmanCoding::of(&HuffmanTree::build(&FrequencyTable::of(bytes)).unwrap())
    }

    #[test]
    fn codes_follow_tree_paths() {
        let coding = coding_of(b"aaaabbbcc");
        assert_eq!(coding.code_string(b'a').as_deref(), Some("0"));
        assert_eq!(coding.code_string(b'c').as_deref(), Some("10"));
        assert_eq!(coding.code_string(b'b').as_deref(), Some("11"));
        assert_eq!(coding.code_string(b'd'), None);
    }

    #[test]
    fn single_symbol_code_is_zero() {
        assert_eq!(coding_of(b"aaaa").code_string(b'a').as_deref(), Some("0"));

        let bare = HuffmanCoding::of(&HuffmanTree::Leaf { byte: 7 });
        assert_eq!(bare.code_string(7).as_deref(), Some("0"));
    }

    #[test]
    fn codes_are_prefix_free() {
        let bytes: Vec<u8> = (0..=u8::MAX)
            .flat_map(|byte| std::iter::repeat(byte).take(byte as usize % 17 + 1))
            .collect();
        let coding = coding_of(&bytes);
        let codes: Vec<String> = (0..=u8::MAX)
            .map(|byte| coding.code_string(byte).unwrap())
            .collect();
        for (i, a) in codes.iter().enumerate() {
            assert!(!a.is_empty());
            for (j, b) in codes.iter().enumerate() {
                assert!(i == j || !b.starts_with(a.as_str()), "{} prefixes {}", a, b);
            }
        }
    }

    #[test]
    fn pack_pads_with_zero_bits() {
        let packed = coding_of(b"aaaabbbcc").pack(b"aaaabbbcc");
        assert_eq!(packed.payload, [0x0F, 0xE8]);
        assert_eq!(packed.padding, 2);
        assert_eq!(packed.bit_len, 14);
    }

    #[test]
    fn pack_without_padding_uses_eight() {
        let packed = coding_of(b"a").pack(b"aaaaaaaa");
        assert_eq!(packed.payload, [0x00]);
        assert_eq!(packed.padding, 8);
        assert_eq!(packed.bit_len, 8);
    }

    #[test]
    fn packed_length_is_weighted_code_length() {
        let input = b"the quick brown fox jumps over the lazy dog";
        let frequencies = FrequencyTable::of(input);
        let coding = coding_of(input);
        let expected: usize = frequencies
            .iter()
            .map(|(byte, count)| count as usize * coding[byte].len())
            .sum();
        let packed = coding.pack(input);
        assert_eq!(packed.bit_len, expected);
        assert_eq!(packed.payload.len(), (expected + 7) / 8);
    }
}
