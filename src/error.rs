use {std::io, thiserror::Error};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while compressing or decompressing.
#[derive(Debug, Error)]
pub enum Error {
    /// The tree builder was handed a frequency table with no symbols.
    #[error("cannot build a Huffman tree without any symbols")]
    EmptyInput,

    #[error("malformed Huffman tree")]
    MalformedTree,

    /// Not a `HUF1` container, or one with an impossible header.
    #[error("invalid container format")]
    InvalidFormat,

    /// The container ended before the declared number of symbols was decoded.
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    /// A payload bit selected a branch the tree does not have.
    #[error("payload does not match the Huffman tree")]
    CorruptPayload,

    #[error(transparent)]
    Io(#[from] io::Error),
}
