use {
    crate::{
        container::{compress, decompress, CompressionStats},
        error::Result,
    },
    std::{
        fs,
        io::{self, prelude::*},
        path::Path,
    },
};

/// Compress the file at `input` into a container at `output`.
///
/// If writing fails part way the partial output is removed. An output that
/// cannot be opened at all is not touched.
pub fn compress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<CompressionStats> {
    let bytes = fs::read(input)?;
    let compressed = compress(&bytes)?;
    write_or_discard(output.as_ref(), &compressed.container)?;
    Ok(compressed.stats)
}

/// Decompress the container at `input` into `output`, returning the number
/// of bytes written.
///
/// `output` is not touched unless the whole container decodes.
pub fn decompress_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<u64> {
    let bytes = fs::read(input)?;
    let decompressed = decompress(&bytes)?;
    write_or_discard(output.as_ref(), &decompressed)?;
    Ok(decompressed.len() as u64)
}

fn write_or_discard(path: &Path, bytes: &[u8]) -> io::Result<()> {
    // Nothing has been written if the output cannot be opened, so whatever
    // already sits at `path` is left alone.
    let file = fs::File::create(path)?;
    discard_on_error(path, file, bytes)
}

/// Write `bytes` to `out`, which was opened at `path`, removing `path` if
/// the write does not complete.
fn discard_on_error(path: &Path, mut out: impl Write, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes).and_then(|()| out.flush()).map_err(|err| {
        if let Err(remove_err) = fs::remove_file(path) {
            log::debug!("Could not remove {}: {}", path.display(), remove_err);
        }
        err
    })
}
