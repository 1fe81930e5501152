//! Release codec: binary record -> gzip -> base64
//!
//! Encoded strings are byte-compatible with the snapshots produced by earlier
//! helm-bulk releases. Those emitted gzip members with a fixed header
//! (zero mtime, "best compression" flag, unknown OS) and a deflate stream that
//! ends in an empty *final* stored block. zlib-style compressors terminate the
//! stream differently, so the member is assembled here from a sync-flushed
//! deflate stream whose trailing stored block is then marked final.
//!
//! Decoding accepts any valid gzip member, and also bare binary records with
//! no gzip header at all, which is how records were stored before compression
//! was introduced.

use crate::error::{Error, Result};
use crate::release::{Release, ReleaseRecord};
use base64::Engine as _;
use base64::engine::general_purpose;
use flate2::read::GzDecoder;
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc, Decompress, FlushDecompress, Status};
use prost::Message;
use std::io::{Read, Write};

/// Leading bytes of a gzip member using the deflate method
pub const MAGIC_GZIP: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Full member header: no flags, zero mtime, XFL=2 (best), OS=255 (unknown)
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0xff];

/// LEN/NLEN of an empty stored block, as left by a sync flush
const SYNC_MARKER: [u8; 4] = [0x00, 0x00, 0xff, 0xff];

/// Encode a release as a base64 string of its gzipped binary record
pub fn encode(release: &Release) -> Result<String> {
    let record = ReleaseRecord::from(release).encode_to_vec();
    let member = gzip(&record).map_err(|e| Error::serialize(&release.name, e))?;
    Ok(general_purpose::STANDARD.encode(member))
}

/// Decode a release from its encoded string form
pub fn decode(data: &str) -> Result<Release> {
    let bytes = general_purpose::STANDARD
        .decode(data)
        .map_err(|e| Error::format(format!("invalid base64: {e}")))?;

    if bytes.is_empty() {
        return Err(Error::format("empty record"));
    }

    let record = if bytes.starts_with(&MAGIC_GZIP) {
        gunzip(&bytes)?
    } else {
        log::debug!("Record has no gzip header, decoding as uncompressed");
        bytes
    };

    let record = ReleaseRecord::decode(record.as_slice())
        .map_err(|e| Error::format(format!("invalid release record: {e}")))?;
    Ok(Release::from(record))
}

fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut record = Vec::new();
    decoder
        .read_to_end(&mut record)
        .map_err(|e| Error::format(format!("invalid gzip stream: {e}")))?;
    Ok(record)
}

/// Build a gzip member around `record` in the historical framing
fn gzip(record: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let body = deflate(record)?;

    let mut crc = Crc::new();
    crc.update(record);

    let mut member = Vec::with_capacity(GZIP_HEADER.len() + body.len() + 8);
    member.extend_from_slice(&GZIP_HEADER);
    member.extend_from_slice(&body);
    member.extend_from_slice(&crc.sum().to_le_bytes());
    // ISIZE is the input length modulo 2^32
    member.extend_from_slice(&(record.len() as u32).to_le_bytes());
    Ok(member)
}

fn deflate(record: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(record)
        .and_then(|()| encoder.flush())
        .map_err(|e| format!("compression failed: {e}"))?;

    // Take the sync-flushed stream; the encoder finishing into the emptied
    // buffer on drop is discarded.
    let stream = std::mem::take(encoder.get_mut());
    seal(stream, record)
}

/// Mark the empty stored block that ends a sync-flushed stream as final.
///
/// The block header (BFINAL, then two BTYPE bits, all zero) starts right
/// after the last end-of-block code and is padded to the byte boundary before
/// `SYNC_MARKER`, so its BFINAL bit lies within the two bytes preceding the
/// marker. Each candidate bit is checked by inflating the result.
fn seal(mut stream: Vec<u8>, record: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let marker_at = stream
        .len()
        .checked_sub(SYNC_MARKER.len())
        .filter(|&at| stream[at..] == SYNC_MARKER)
        .ok_or("compressor did not end the stream with a sync flush")?;

    for bit in marker_at.saturating_sub(2) * 8..marker_at * 8 {
        let (byte, mask) = (bit / 8, 1u8 << (bit % 8));
        if stream[byte] & mask != 0 {
            continue;
        }
        stream[byte] |= mask;
        if inflates_to(&stream, record) {
            return Ok(stream);
        }
        stream[byte] &= !mask;
    }

    Err("could not locate the trailing stored block header".to_string())
}

/// Whether `stream` is a complete raw deflate stream producing exactly `record`
fn inflates_to(stream: &[u8], record: &[u8]) -> bool {
    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(record.len() + 1);
    matches!(
        inflater.decompress_vec(stream, &mut out, FlushDecompress::Finish),
        Ok(Status::StreamEnd)
    ) && inflater.total_in() as usize == stream.len()
        && out == record
}
