pub const CHUNK_AXML_FILE: u32 = 0x0008_0003;
pub const CHUNK_STRING_POOL: u32 = 0x001C_0001;
pub const CHUNK_RESOURCE_IDS: u32 = 0x0008_0180;
pub const CHUNK_START_NAMESPACE: u32 = 0x0010_0100;
pub const CHUNK_END_NAMESPACE: u32 = 0x0010_0101;
pub const CHUNK_START_TAG: u32 = 0x0010_0102;
pub const CHUNK_END_TAG: u32 = 0x0010_0103;
pub const CHUNK_TEXT: u32 = 0x0010_0104;

/// Size of the `{ type, size }` header at every chunk boundary.
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Offset of the first inner chunk, just past the outer file header.
pub const FIRST_CHUNK_OFFSET: usize = 8;

// Bounds-checked little-endian reads. `None` means the read would leave the buffer.
pub(crate) fn read_u8(bytes: &[u8], ix: usize) -> Option<u8> {
    bytes.get(ix).copied()
}

pub(crate) fn read_u16(bytes: &[u8], ix: usize) -> Option<u16> {
    let end = ix.checked_add(2)?;
    let raw = bytes.get(ix..end)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

pub(crate) fn read_u32(bytes: &[u8], ix: usize) -> Option<u32> {
    let end = ix.checked_add(4)?;
    let raw = bytes.get(ix..end)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Location of one chunk inside the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub chunk_type: u32,
    pub offset: usize,
    pub size: usize,
}

impl ChunkHeader {
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    /// The chunk's bytes, header included. Empty if the header does not fit `data`.
    pub fn bytes<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        self.offset
            .checked_add(self.size)
            .and_then(|end| data.get(self.offset..end))
            .unwrap_or(&[])
    }
}

/// Forward-only walk over the flat chunk sequence of a binary XML buffer.
///
/// Each step reads an 8 byte header and strides by the declared size. The walk ends
/// at the end of the buffer, or early when a header is truncated, declares a size below
/// 8, or claims to extend past the buffer. Chunks yielded before that point stay valid.
pub struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Chunks<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Chunks::starting_at(data, FIRST_CHUNK_OFFSET)
    }

    pub fn starting_at(data: &'a [u8], offset: usize) -> Self {
        Chunks {
            data,
            pos: offset,
            done: false,
        }
    }

    fn read_header(&self) -> Option<ChunkHeader> {
        let chunk_type = read_u32(self.data, self.pos)?;
        let size = read_u32(self.data, self.pos + 4)? as usize;
        if size < CHUNK_HEADER_SIZE {
            return None;
        }
        let end = self.pos.checked_add(size)?;
        if end > self.data.len() {
            return None;
        }
        Some(ChunkHeader {
            chunk_type,
            offset: self.pos,
            size,
        })
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = ChunkHeader;

    fn next(&mut self) -> Option<ChunkHeader> {
        if self.done || self.pos >= self.data.len() {
            return None;
        }
        match self.read_header() {
            Some(header) => {
                self.pos = header.end();
                Some(header)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(chunk_type: u32, body_len: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&chunk_type.to_le_bytes());
        buf.extend_from_slice(&((body_len + CHUNK_HEADER_SIZE) as u32).to_le_bytes());
        buf.resize(body_len + CHUNK_HEADER_SIZE, 0xAB);
        buf
    }

    fn document(chunks: &[Vec<u8>]) -> Vec<u8> {
        let mut doc = chunk(CHUNK_AXML_FILE, 0);
        for c in chunks {
            doc.extend_from_slice(c);
        }
        let total = doc.len() as u32;
        doc[4..8].copy_from_slice(&total.to_le_bytes());
        doc
    }

    #[test]
    fn walks_chunks_by_declared_size() {
        let doc = document(&[
            chunk(CHUNK_STRING_POOL, 20),
            chunk(CHUNK_START_TAG, 28),
            chunk(CHUNK_END_TAG, 16),
        ]);
        let headers: Vec<ChunkHeader> = Chunks::new(&doc).collect();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers[0].chunk_type, CHUNK_STRING_POOL);
        assert_eq!(headers[0].offset, 8);
        assert_eq!(headers[1].offset, 36);
        assert_eq!(headers[1].size, 36);
        assert_eq!(headers[2].chunk_type, CHUNK_END_TAG);
        assert_eq!(headers[2].end(), doc.len());
    }

    #[test]
    fn stops_on_zero_stride() {
        let mut doc = document(&[chunk(CHUNK_TEXT, 8), chunk(CHUNK_START_TAG, 8)]);
        // zero the size of the second chunk
        doc[28..32].copy_from_slice(&0u32.to_le_bytes());
        let headers: Vec<ChunkHeader> = Chunks::new(&doc).collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].chunk_type, CHUNK_TEXT);
    }

    #[test]
    fn stops_when_chunk_overruns_buffer() {
        let mut doc = document(&[chunk(CHUNK_START_NAMESPACE, 16), chunk(CHUNK_START_TAG, 8)]);
        let overrun = (16 + 4) as u32;
        doc[36..40].copy_from_slice(&overrun.to_le_bytes());
        let mut chunks = Chunks::new(&doc);
        assert_eq!(chunks.next().map(|c| c.chunk_type), Some(CHUNK_START_NAMESPACE));
        assert_eq!(chunks.next(), None);
        assert_eq!(chunks.next(), None);
    }

    #[test]
    fn stops_on_truncated_header() {
        let doc = document(&[chunk(CHUNK_RESOURCE_IDS, 4)]);
        let truncated = &doc[..doc.len() - 9];
        assert_eq!(Chunks::new(truncated).count(), 0);
    }

    #[test]
    fn can_start_from_any_offset() {
        let doc = document(&[chunk(CHUNK_STRING_POOL, 4), chunk(CHUNK_START_TAG, 4)]);
        let headers: Vec<ChunkHeader> = Chunks::starting_at(&doc, 20).collect();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].chunk_type, CHUNK_START_TAG);
        assert_eq!(headers[0].bytes(&doc).len(), 12);
    }

    #[test]
    fn empty_and_header_only_buffers_yield_nothing() {
        assert_eq!(Chunks::new(&[]).count(), 0);
        assert_eq!(Chunks::new(&document(&[])).count(), 0);
    }

    #[test]
    fn reads_reject_out_of_bounds() {
        let data = [1u8, 2, 3];
        assert_eq!(read_u8(&data, 2), Some(3));
        assert_eq!(read_u8(&data, 3), None);
        assert_eq!(read_u16(&data, 1), Some(0x0302));
        assert_eq!(read_u16(&data, 2), None);
        assert_eq!(read_u32(&data, 0), None);
        assert_eq!(read_u32(&data, usize::MAX), None);
    }
}
