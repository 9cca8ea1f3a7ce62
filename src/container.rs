//! The `HUF1` container.
//!
//! | field         | size     |                                              |
//! |---------------|----------|----------------------------------------------|
//! | magic         | 4        | `HUF1`                                       |
//! | tree          | variable | pre-order, see [`HuffmanTree::write_tree`]   |
//! | terminator    | 1        | `#`                                          |
//! | original size | 8        | little-endian `u64`                          |
//! | padding       | 1        | zero bits at the end of the payload, 8 = none |
//! | payload       | variable | codes, most significant bit first            |
//!
//! Empty input has no tree: the terminator directly follows the magic.

use {
    crate::{
        coding::HuffmanCoding,
        error::{Error, Result},
        frequency::FrequencyTable,
        tree::{HuffmanTree, TERMINATOR},
    },
    std::convert::TryInto,
};

pub const MAGIC: &[u8; 4] = b"HUF1";

/// Padding count written when the payload ends on a byte boundary.
pub const NO_PADDING: u8 = 8;

/// A parsed container, borrowing its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<'a> {
    /// `None` for empty input.
    pub tree: Option<HuffmanTree>,
    pub original_size: u64,
    pub padding: u8,
    pub payload: &'a [u8],
}

/// The result of [`compress`].
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed {
    pub container: Vec<u8>,
    pub stats: CompressionStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompressionStats {
    pub original_size: u64,
    /// Length of the whole container, header included.
    pub compressed_size: u64,
    pub distinct_symbols: usize,
}

impl CompressionStats {
    /// Compressed size over original size; `None` for empty input.
    pub fn ratio(&self) -> Option<f64> {
        match self.original_size {
            0 => None,
            original => Some(self.compressed_size as f64 / original as f64),
        }
    }

    /// Percentage of the original size saved. Negative when the container
    /// is larger than the input.
    pub fn savings(&self) -> Option<f64> {
        self.ratio().map(|ratio| (1.0 - ratio) * 100.0)
    }
}

pub fn compress(bytes: &[u8]) -> Result<Compressed> {
    let frequencies = FrequencyTable::of(bytes);
    log::trace!("Byte frequency: {:?}", frequencies);

    // Zero-byte input never reaches the tree builder.
    let container = if frequencies.is_empty() {
        Container::empty().to_bytes()
    } else {
        let tree = HuffmanTree::build(&frequencies)?;
        let coding = HuffmanCoding::of(&tree);
        let packed = coding.pack(bytes);
        Container {
            tree: Some(tree),
            original_size: bytes.len() as u64,
            padding: packed.padding,
            payload: &packed.payload,
        }
        .to_bytes()
    };

    let stats = CompressionStats {
        original_size: bytes.len() as u64,
        compressed_size: container.len() as u64,
        distinct_symbols: frequencies.distinct(),
    };
    log::debug!("Compressed: {:?}", stats);

    Ok(Compressed { container, stats })
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    Container::parse(bytes)?.decode()
}

impl Container<'static> {
    /// The container for zero bytes of input.
    pub fn empty() -> Self {
        Container {
            tree: None,
            original_size: 0,
            padding: NO_PADDING,
            payload: &[],
        }
    }
}

impl<'a> Container<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut input = match bytes.strip_prefix(&MAGIC[..]) {
            Some(rest) => rest,
            None => return Err(Error::InvalidFormat),
        };

        let tree = if input.first() == Some(&TERMINATOR) {
            None
        } else {
            Some(HuffmanTree::read_tree(&mut input)?)
        };
        match take(&mut input, 1) {
            Ok(&[TERMINATOR]) => {}
            _ => return Err(Error::MalformedTree),
        }

        let original_size = match take(&mut input, 8)?.try_into() {
            Ok(size) => u64::from_le_bytes(size),
            Err(_) => return Err(Error::UnexpectedEndOfStream),
        };
        let padding = take(&mut input, 1)?[0];
        if padding > NO_PADDING || (tree.is_none() && original_size != 0) {
            return Err(Error::InvalidFormat);
        }

        log::debug!(
            "Container: {} symbols, {} payload bytes, padding {}",
            original_size,
            input.len(),
            padding,
        );
        Ok(Container {
            tree,
            original_size,
            padding,
            payload: input,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MAGIC.len() + 1 + 8 + 1 + self.payload.len());
        out.extend_from_slice(MAGIC);
        if let Some(tree) = &self.tree {
            tree.write_tree(&mut out);
        }
        out.push(TERMINATOR);
        out.extend_from_slice(&self.original_size.to_le_bytes());
        out.push(self.padding);
        out.extend_from_slice(self.payload);
        out
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        match &self.tree {
            None => Ok(Vec::new()),
            Some(tree) => tree.unpack(self.payload, self.padding, self.original_size),
        }
    }
}

fn take<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if input.len() < n {
        return Err(Error::UnexpectedEndOfStream);
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}
