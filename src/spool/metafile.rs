//! Decoded vector page handles
//!
//! A rendered page arrives as an opaque, self-describing record stream:
//! little-endian records of `type`, `flags`, `size` (total bytes including
//! the 12-byte prologue) followed by the raw payload. The stream opens with
//! a header record whose payload begins with a bounds rectangle. Records are
//! never interpreted beyond this framing; printing replays them one by one
//! into the device canvas in their original order.

use std::io::Cursor;
use std::ops::Range;

use byteorder::{LittleEndian, ReadBytesExt};

use super::device::{DeviceFault, PageCanvas, PlayedRecord};
use super::geometry::Placement;

/// Record type of the stream-opening header record.
pub const HEADER_RECORD_TYPE: u32 = 1;

const RECORD_PROLOGUE_BYTES: usize = 12;
const HEADER_BOUNDS_BYTES: usize = 16;

/// A stored page buffer that could not be decoded into a drawable handle.
#[derive(Debug, thiserror::Error)]
pub enum DecodeFault {
    #[error("not a vector page stream")]
    BadHeader,

    #[error("record stream truncated at byte {offset}")]
    Truncated { offset: usize },

    #[error("record at byte {offset} declares invalid size {size}")]
    BadRecordSize { offset: usize, size: u32 },
}

/// One drawing record, borrowed from the decoded stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordRef<'a> {
    pub record_type: u32,
    pub flags: u32,
    pub payload: &'a [u8],
}

#[derive(Clone, Debug)]
struct RecordSpan {
    record_type: u32,
    flags: u32,
    payload: Range<usize>,
}

/// A decoded page, ready for replay.
///
/// Owns a copy of the page bytes for the duration of one draw call; the
/// whole stream is validated up front so that a malformed page fails before
/// any record reaches the device (no partial page output).
#[derive(Debug)]
pub struct Metafile {
    bytes: Vec<u8>,
    spans: Vec<RecordSpan>,
    width: i32,
    height: i32,
}

impl Metafile {
    /// Decode one stored page buffer into a drawable handle.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeFault> {
        let spans = scan_records(bytes)?;

        let header = spans.first().ok_or(DecodeFault::BadHeader)?;
        if header.record_type != HEADER_RECORD_TYPE
            || header.payload.len() < HEADER_BOUNDS_BYTES
        {
            return Err(DecodeFault::BadHeader);
        }

        let mut cursor = Cursor::new(&bytes[header.payload.clone()]);
        let left = read_i32(&mut cursor, header.payload.start)?;
        let top = read_i32(&mut cursor, header.payload.start)?;
        let right = read_i32(&mut cursor, header.payload.start)?;
        let bottom = read_i32(&mut cursor, header.payload.start)?;

        Ok(Self {
            bytes: bytes.to_vec(),
            spans,
            width: right - left,
            height: bottom - top,
        })
    }

    /// Page width in native stream units.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Page height in native stream units.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of records in the stream, header included.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.spans.len()
    }

    /// Iterate the records in stream order. Infallible: the stream was fully
    /// validated at decode time.
    pub fn records(&self) -> impl Iterator<Item = RecordRef<'_>> {
        self.spans.iter().map(|span| RecordRef {
            record_type: span.record_type,
            flags: span.flags,
            payload: &self.bytes[span.payload.clone()],
        })
    }

    /// Replay every record, in order, into the target canvas.
    ///
    /// Non-empty payloads are copied into owned buffers before playback;
    /// zero-size payloads are handed over without allocating.
    pub fn replay_into(
        &self,
        placement: &Placement,
        canvas: &mut dyn PageCanvas,
    ) -> Result<(), DeviceFault> {
        canvas.place(placement)?;

        for record in self.records() {
            let payload = if record.payload.is_empty() {
                Vec::new()
            } else {
                record.payload.to_vec()
            };
            canvas.play_record(&PlayedRecord {
                record_type: record.record_type,
                flags: record.flags,
                payload,
            })?;
        }

        Ok(())
    }
}

fn scan_records(bytes: &[u8]) -> Result<Vec<RecordSpan>, DecodeFault> {
    let mut cursor = Cursor::new(bytes);
    let mut spans = Vec::new();
    let mut offset = 0usize;

    while offset < bytes.len() {
        let record_type = read_u32(&mut cursor, offset)?;
        let flags = read_u32(&mut cursor, offset)?;
        let size = read_u32(&mut cursor, offset)?;

        let total = size as usize;
        if total < RECORD_PROLOGUE_BYTES {
            return Err(DecodeFault::BadRecordSize { offset, size });
        }
        let end = offset
            .checked_add(total)
            .ok_or(DecodeFault::BadRecordSize { offset, size })?;
        if end > bytes.len() {
            return Err(DecodeFault::Truncated { offset });
        }

        spans.push(RecordSpan {
            record_type,
            flags,
            payload: offset + RECORD_PROLOGUE_BYTES..end,
        });

        offset = end;
        cursor.set_position(offset as u64);
    }

    Ok(spans)
}

fn read_u32(cursor: &mut Cursor<&[u8]>, offset: usize) -> Result<u32, DecodeFault> {
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| DecodeFault::Truncated { offset })
}

fn read_i32(cursor: &mut Cursor<&[u8]>, offset: usize) -> Result<i32, DecodeFault> {
    cursor
        .read_i32::<LittleEndian>()
        .map_err(|_| DecodeFault::Truncated { offset })
}

/// Incrementally writes a page stream in the record layout `Metafile` reads.
///
/// Used by the spool-directory target to re-emit replayed pages, and by
/// tests to build synthetic pages.
#[derive(Debug)]
pub struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    /// Start a stream with a header record carrying the page bounds.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let mut builder = Self { bytes: Vec::new() };
        let mut bounds = Vec::with_capacity(HEADER_BOUNDS_BYTES);
        for value in [0i32, 0, width, height] {
            bounds.extend_from_slice(&value.to_le_bytes());
        }
        builder.push_record(HEADER_RECORD_TYPE, 0, &bounds);
        builder
    }

    /// Append one record.
    pub fn push_record(&mut self, record_type: u32, flags: u32, payload: &[u8]) {
        let size = (RECORD_PROLOGUE_BYTES + payload.len()) as u32;
        self.bytes.extend_from_slice(&record_type.to_le_bytes());
        self.bytes.extend_from_slice(&flags.to_le_bytes());
        self.bytes.extend_from_slice(&size.to_le_bytes());
        self.bytes.extend_from_slice(payload);
    }

    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stream() -> Vec<u8> {
        let mut builder = StreamBuilder::new(859, 1118);
        builder.push_record(70, 0, &[]);
        builder.push_record(19, 2, &[0xAA, 0xBB, 0xCC]);
        builder.push_record(14, 1, &[0x01]);
        builder.finish()
    }

    #[test]
    fn decode_reads_bounds_from_header() {
        let metafile = Metafile::decode(&sample_stream()).unwrap();
        assert_eq!(metafile.width(), 859);
        assert_eq!(metafile.height(), 1118);
    }

    #[test]
    fn records_keep_stream_order_and_bytes() {
        let stream = sample_stream();
        let metafile = Metafile::decode(&stream).unwrap();

        let records: Vec<_> = metafile.records().collect();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].record_type, HEADER_RECORD_TYPE);
        assert_eq!(records[1].record_type, 70);
        assert!(records[1].payload.is_empty());
        assert_eq!(records[2].record_type, 19);
        assert_eq!(records[2].flags, 2);
        assert_eq!(records[2].payload, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(records[3].record_type, 14);
        assert_eq!(records[3].payload, &[0x01]);
    }

    #[test]
    fn empty_buffer_is_not_a_page() {
        assert!(matches!(
            Metafile::decode(&[]),
            Err(DecodeFault::BadHeader)
        ));
    }

    #[test]
    fn stream_without_header_record_fails() {
        // Rewrite the leading record type so the stream no longer opens
        // with a header record.
        let mut bytes = StreamBuilder::new(10, 10).finish();
        bytes[0] = 99;
        assert!(matches!(
            Metafile::decode(&bytes),
            Err(DecodeFault::BadHeader)
        ));
    }

    #[test]
    fn truncated_stream_fails_decode() {
        let mut stream = sample_stream();
        stream.truncate(stream.len() - 2);
        assert!(matches!(
            Metafile::decode(&stream),
            Err(DecodeFault::Truncated { .. })
        ));
    }

    #[test]
    fn undersized_record_fails_decode() {
        let mut builder = StreamBuilder::new(10, 10);
        builder.push_record(7, 0, &[]);
        let mut stream = builder.finish();
        // Shrink the second record's declared size below the prologue size.
        let size_offset = stream.len() - RECORD_PROLOGUE_BYTES + 8;
        stream[size_offset..size_offset + 4].copy_from_slice(&4u32.to_le_bytes());
        assert!(matches!(
            Metafile::decode(&stream),
            Err(DecodeFault::BadRecordSize { .. })
        ));
    }
}
