use {
    crate::{
        error::{Error, Result},
        frequency::FrequencyTable,
    },
    bitvec::{prelude::*, slice::Iter as BitSliceIter},
    std::cmp,
};

/// Discriminator byte for a leaf; the symbol byte follows.
pub const LEAF: u8 = b'1';
/// Discriminator byte for an internal node; left then right subtree follow.
pub const INTERNAL: u8 = b'0';
/// Byte written after the whole tree.
pub const TERMINATOR: u8 = b'#';

/// A tree over 256 distinct symbols is at most 255 edges deep, so no node
/// sits deeper than this.
const MAX_DEPTH: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanTree {
    Leaf {
        byte: u8,
    },
    /// `right` is only ever absent on the root of a single-symbol tree.
    Node {
        left: Box<HuffmanTree>,
        right: Option<Box<HuffmanTree>>,
    },
}

/// A queue entry during construction.
///
/// Entries are ordered by `(weight, order)`. Leaves get `order` from their
/// position in ascending byte order; every merged node gets the next unused
/// value, so it sorts after all existing entries of the same weight.
#[derive(Debug)]
struct Weighted {
    weight: u64,
    order: usize,
    tree: HuffmanTree,
}

impl Weighted {
    fn key(&self) -> cmp::Reverse<(u64, usize)> {
        cmp::Reverse((self.weight, self.order))
    }
}

impl HuffmanTree {
    /// Build the optimal prefix tree for `frequencies`.
    ///
    /// Fails only with [`Error::EmptyInput`], when no byte occurs at all.
    pub fn build(frequencies: &FrequencyTable) -> Result<Self> {
        // Create a leaf node out of each byte and put them in a list of nodes.
        let mut nodes: Vec<Weighted> = frequencies
            .iter()
            .enumerate()
            .map(|(order, (byte, weight))| Weighted {
                weight,
                order,
                tree: HuffmanTree::Leaf { byte },
            })
            .collect();

        match nodes.len() {
            0 => return Err(Error::EmptyInput),
            1 => {
                // A lone symbol still needs a one-bit code.
                let only = nodes.remove(0);
                return Ok(HuffmanTree::Node {
                    left: Box::new(only.tree),
                    right: None,
                });
            }
            _ => {}
        }

        // Keep it sorted as a sort of poor man's priority queue.
        // Sorted high-to-low, so the lowest key is at the back.
        nodes.sort_unstable_by_key(Weighted::key);
        let mut next_order = nodes.len();

        // Repeat until the list contains just 1 node, the root of the tree.
        while nodes.len() > 1 {
            // NB: Vec::pop is the back element
            let (left, right) = match (nodes.pop(), nodes.pop()) {
                (Some(left), Some(right)) => (left, right),
                _ => break,
            };

            let node = Weighted {
                weight: left.weight + right.weight,
                order: next_order,
                tree: HuffmanTree::Node {
                    left: Box::new(left.tree),
                    right: Some(Box::new(right.tree)),
                },
            };
            next_order += 1;

            let sorted_idx = nodes
                .binary_search_by_key(&node.key(), Weighted::key)
                .unwrap_or_else(|x| x);
            nodes.insert(sorted_idx, node);
        }

        let root = nodes.remove(0).tree;
        log::trace!("Huffman tree: {:?}", root);
        Ok(root)
    }

    /// Append the pre-order serialization of this tree to `out`.
    ///
    /// The terminator is not written; that is the container's job.
    pub fn write_tree(&self, out: &mut Vec<u8>) {
        match self {
            &HuffmanTree::Leaf { byte } => {
                out.push(LEAF);
                out.push(byte);
            }
            HuffmanTree::Node { left, right } => {
                out.push(INTERNAL);
                left.write_tree(out);
                if let Some(right) = right {
                    right.write_tree(out);
                }
            }
        }
    }

    /// Read a tree written by [`write_tree`](Self::write_tree) off the front
    /// of `input`, advancing it past exactly the bytes that make up the tree.
    pub fn read_tree(input: &mut &[u8]) -> Result<Self> {
        let mut seen = [false; 256];
        Self::read_node(input, 0, &mut seen)
    }

    fn read_node(input: &mut &[u8], depth: usize, seen: &mut [bool; 256]) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(Error::MalformedTree);
        }

        match next_byte(input)? {
            LEAF => {
                let byte = next_byte(input)?;
                if seen[byte as usize] {
                    return Err(Error::MalformedTree);
                }
                seen[byte as usize] = true;
                Ok(HuffmanTree::Leaf { byte })
            }
            INTERNAL => {
                let left = Self::read_node(input, depth + 1, seen)?;
                // Any real subtree starts with a discriminator, so a terminator
                // here can only mean the single-symbol root.
                let right = if input.first() == Some(&TERMINATOR) {
                    match left {
                        HuffmanTree::Leaf { .. } if depth == 0 => None,
                        _ => return Err(Error::MalformedTree),
                    }
                } else {
                    Some(Box::new(Self::read_node(input, depth + 1, seen)?))
                };
                Ok(HuffmanTree::Node {
                    left: Box::new(left),
                    right,
                })
            }
            _ => Err(Error::MalformedTree),
        }
    }

    /// Decode exactly `symbols` bytes from `payload`.
    ///
    /// The last `padding % 8` bits of the payload are never read, and anything
    /// left after the final symbol is ignored.
    pub fn unpack(&self, payload: &[u8], padding: u8, symbols: u64) -> Result<Vec<u8>> {
        let bit_count = (payload.len() * 8).saturating_sub(usize::from(padding % 8));
        let mut bits = BitSlice::<Msb0, u8>::from_slice(payload)[..bit_count].iter();

        // Every symbol takes at least one bit.
        let capacity = cmp::min(symbols, bit_count as u64) as usize;
        let mut out = Vec::with_capacity(capacity);
        while (out.len() as u64) < symbols {
            let byte = match self.pull_root_byte(&mut bits) {
                Err(Error::UnexpectedEndOfStream) => {
                    log::debug!("Payload ran out after {} of {} symbols", out.len(), symbols);
                    return Err(Error::UnexpectedEndOfStream);
                }
                result => result?,
            };
            out.push(byte);
        }

        Ok(out)
    }

    fn pull_root_byte(&self, bits: &mut BitSliceIter<Msb0, u8>) -> Result<u8> {
        match self {
            // A bare leaf root has the code `0`.
            &HuffmanTree::Leaf { byte } => match bits.next() {
                Some(false) => Ok(byte),
                Some(true) => Err(Error::CorruptPayload),
                None => Err(Error::UnexpectedEndOfStream),
            },
            HuffmanTree::Node { .. } => self.pull_byte(bits),
        }
    }

    fn pull_byte(&self, bits: &mut BitSliceIter<Msb0, u8>) -> Result<u8> {
        match self {
            &HuffmanTree::Leaf { byte } => Ok(byte),
            HuffmanTree::Node { left, right } => match bits.next() {
                Some(false) => left.pull_byte(bits),
                Some(true) => right
                    .as_ref()
                    .ok_or(Error::CorruptPayload)?
                    .pull_byte(bits),
                None => Err(Error::UnexpectedEndOfStream),
            },
        }
    }
}

fn next_byte(input: &mut &[u8]) -> Result<u8> {
    let (&byte, rest) = input.split_first().ok_or(Error::MalformedTree)?;
    *input = rest;
    Ok(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Box<HuffmanTree> {
        Box::new(HuffmanTree::Leaf { byte })
    }

    fn node(left: Box<HuffmanTree>, right: Box<HuffmanTree>) -> Box<HuffmanTree> {
        Box::new(HuffmanTree::Node {
            left,
            right: Some(right),
        })
    }

    #[test]
    fn builds_with_fixed_tie_break() {
        let tree = HuffmanTree::build(&FrequencyTable::of(b"aaaabbbcc")).unwrap();
        assert_eq!(tree, *node(leaf(b'a'), node(leaf(b'c'), leaf(b'b'))));
    }

    #[test]
    fn equal_weights_merge_in_byte_order() {
        let tree = HuffmanTree::build(&FrequencyTable::of(b"dcba")).unwrap();
        assert_eq!(
            tree,
            *node(node(leaf(b'a'), leaf(b'b')), node(leaf(b'c'), leaf(b'd'))),
        );
    }

    #[test]
    fn single_symbol_gets_wrapped() {
        let tree = HuffmanTree::build(&FrequencyTable::of(b"zzz")).unwrap();
        assert_eq!(
            tree,
            HuffmanTree::Node {
                left: leaf(b'z'),
                right: None,
            },
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = HuffmanTree::build(&FrequencyTable::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn serialized_form() {
        let tree = HuffmanTree::build(&FrequencyTable::of(b"aaaabbbcc")).unwrap();
        let mut out = Vec::new();
        tree.write_tree(&mut out);
        assert_eq!(out, b"01a01c1b");

        let single = HuffmanTree::build(&FrequencyTable::of(b"q")).unwrap();
        let mut out = Vec::new();
        single.write_tree(&mut out);
        assert_eq!(out, b"01q");
    }

    #[test]
    fn read_stops_at_end_of_tree() {
        let mut input: &[u8] = b"01a01c1b#rest";
        let tree = HuffmanTree::read_tree(&mut input).unwrap();
        assert_eq!(tree, *node(leaf(b'a'), node(leaf(b'c'), leaf(b'b'))));
        assert_eq!(input, b"#rest");

        let mut input: &[u8] = b"01q#";
        let tree = HuffmanTree::read_tree(&mut input).unwrap();
        assert_eq!(
            tree,
            HuffmanTree::Node {
                left: leaf(b'q'),
                right: None,
            },
        );
        assert_eq!(input, b"#");
    }

    #[test]
    fn malformed_trees() {
        for bad in [
            &b""[..],
            b"0",
            b"01a",
            b"1",
            b"x",
            b"01a1a#",
            b"001a#",
            b"0001a#1b1c#",
        ]
        .iter()
        {
            let mut input = *bad;
            let err = HuffmanTree::read_tree(&mut input).unwrap_err();
            assert!(matches!(err, Error::MalformedTree), "{:?}", bad);
        }
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let bytes = vec![INTERNAL; 100_000];
        let err = HuffmanTree::read_tree(&mut &bytes[..]).unwrap_err();
        assert!(matches!(err, Error::MalformedTree));
    }

    #[test]
    fn deepest_possible_tree_is_accepted() {
        // A left-leaning chain over all 256 bytes puts two leaves 255 edges down.
        let mut bytes = vec![INTERNAL; 255];
        for byte in 0..=u8::MAX {
            bytes.extend_from_slice(&[LEAF, byte]);
        }
        bytes.push(TERMINATOR);

        let mut input = &bytes[..];
        let tree = HuffmanTree::read_tree(&mut input).unwrap();
        assert_eq!(input, [TERMINATOR]);
        let mut out = Vec::new();
        tree.write_tree(&mut out);
        assert_eq!(out, &bytes[..bytes.len() - 1]);

        let mut deeper = vec![INTERNAL; 256];
        deeper.extend_from_slice(&bytes[255..]);
        let err = HuffmanTree::read_tree(&mut &deeper[..]).unwrap_err();
        assert!(matches!(err, Error::MalformedTree));
    }

    #[test]
    fn unpack_respects_symbol_count_and_padding() {
        let tree = HuffmanTree::build(&FrequencyTable::of(b"aaaabbbcc")).unwrap();
        let payload = [0x0F, 0xE8];
        assert_eq!(tree.unpack(&payload, 2, 9).unwrap(), b"aaaabbbcc");
        assert_eq!(tree.unpack(&payload, 2, 4).unwrap(), b"aaaa");

        let err = tree.unpack(&payload, 2, 10).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEndOfStream));
        let err = tree.unpack(&payload[..1], 2, 9).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEndOfStream));
    }

    #[test]
    fn unpack_single_symbol_tree() {
        let tree = HuffmanTree::build(&FrequencyTable::of(b"a")).unwrap();
        assert_eq!(tree.unpack(&[0x00], 5, 3).unwrap(), b"aaa");
        let err = tree.unpack(&[0x20], 5, 3).unwrap_err();
        assert!(matches!(err, Error::CorruptPayload));
    }

    #[test]
    fn unpack_bare_leaf_root() {
        let tree = HuffmanTree::Leaf { byte: b'x' };
        assert_eq!(tree.unpack(&[0x00], 6, 2).unwrap(), b"xx");
        let err = tree.unpack(&[0x80], 6, 2).unwrap_err();
        assert!(matches!(err, Error::CorruptPayload));
    }
}
