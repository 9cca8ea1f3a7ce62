//! Huffman coding of whole files into self-describing `HUF1` containers.
//!
//! ```
//! let compressed = huffile::compress(b"aaaabbbcc")?;
//! assert_eq!(compressed.stats.distinct_symbols, 3);
//! assert_eq!(huffile::decompress(&compressed.container)?, b"aaaabbbcc");
//! # Ok::<(), huffile::Error>(())
//! ```
//!
//! Compression counts byte frequencies, builds a Huffman tree from them,
//! and writes the tree followed by the packed codes. Decompression reads the
//! tree back and walks it one payload bit at a time.

mod coding;
mod container;
mod error;
mod file;
mod frequency;
mod tree;

pub use crate::{
    coding::{HuffmanCoding, Packed},
    container::{compress, decompress, Compressed, CompressionStats, Container, MAGIC, NO_PADDING},
    error::{Error, Result},
    file::{compress_file, decompress_file},
    frequency::FrequencyTable,
    tree::HuffmanTree,
};

/// Byte frequencies of `bytes`, for reporting.
pub fn analyze(bytes: &[u8]) -> FrequencyTable {
    FrequencyTable::of(bytes)
}
