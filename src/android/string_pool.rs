use crate::android::chunk::{read_u16, read_u32, read_u8, CHUNK_HEADER_SIZE};
use bitflags::bitflags;

const STRING_COUNT_OFFSET: usize = 8;
const FLAGS_OFFSET: usize = 16;
const STRINGS_START_OFFSET: usize = 20;
const POOL_HEADER_SIZE: usize = 28;

bitflags! {
    /// Pool-wide flags word of a string pool chunk.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct StringPoolFlags: u32 {
        const SORTED = 0x0000_0001;
        const UTF8 = 0x0000_0100;
    }
}

/// Index value meaning "no string".
pub const NO_ENTRY_INDEX: u32 = 0xFFFF_FFFF;

/// Decoded strings of a binary XML string pool, in index order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    /// Decodes the string pool chunk whose header starts at `offset`.
    ///
    /// Entries that cannot be decoded (offset outside the chunk, length running past
    /// the end, undecodable bytes) become empty strings so later indices keep their
    /// position. Offset slots that do not fit inside the chunk are not counted.
    pub fn parse(data: &[u8], offset: usize) -> StringPool {
        let Some(offsets_base) = offset.checked_add(POOL_HEADER_SIZE) else {
            return StringPool::default();
        };
        let limit = chunk_limit(data, offset);
        let string_count = match read_u32(data, offset + STRING_COUNT_OFFSET) {
            Some(count) => count as usize,
            None => return StringPool::default(),
        };
        let flags = read_u32(data, offset + FLAGS_OFFSET)
            .map(StringPoolFlags::from_bits_retain)
            .unwrap_or_else(StringPoolFlags::empty);
        let strings_start = read_u32(data, offset + STRINGS_START_OFFSET).unwrap_or(0) as usize;

        let slots = limit.saturating_sub(offsets_base) / 4;
        let count = string_count.min(slots);
        let strings_base = offset.saturating_add(strings_start);

        let mut strings = Vec::with_capacity(count);
        for i in 0..count {
            let text = read_u32(data, offsets_base + i * 4)
                .and_then(|rel| strings_base.checked_add(rel as usize))
                .and_then(|at| {
                    if flags.contains(StringPoolFlags::UTF8) {
                        read_utf8_string(data, at, limit)
                    } else {
                        read_utf16_string(data, at, limit)
                    }
                })
                .unwrap_or_default();
            strings.push(text);
        }

        StringPool { strings }
    }

    /// Resolves an index, treating the sentinel and out-of-range indices as unresolved.
    pub fn get(&self, idx: u32) -> Option<&str> {
        if idx == NO_ENTRY_INDEX {
            return None;
        }
        self.strings.get(idx as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| s.as_str())
    }
}

#[cfg(test)]
impl From<Vec<String>> for StringPool {
    fn from(strings: Vec<String>) -> Self {
        StringPool { strings }
    }
}

/// Decodes the pool at `offset` and returns it with the chunk's declared size,
/// the stride to the next chunk.
pub fn decode_string_pool(data: &[u8], offset: usize) -> (StringPool, usize) {
    let size = offset
        .checked_add(4)
        .and_then(|at| read_u32(data, at))
        .unwrap_or(0) as usize;
    (StringPool::parse(data, offset), size)
}

// Reads stay inside the chunk when its declared size is sane, else inside the buffer.
fn chunk_limit(data: &[u8], offset: usize) -> usize {
    match offset.checked_add(4).and_then(|at| read_u32(data, at)) {
        Some(size) if size as usize >= CHUNK_HEADER_SIZE => offset
            .checked_add(size as usize)
            .map_or(data.len(), |end| end.min(data.len())),
        _ => data.len(),
    }
}

// Span of the string bytes when both lengths may use the high-bit two byte form.
fn extended_utf8_span(data: &[u8], offset: usize, limit: usize) -> Option<(usize, usize)> {
    // The first length is the UTF-16 character count; only the byte length slices.
    let (_char_len, char_len_size) = read_utf8_length(data, offset, limit)?;
    let cursor = offset + char_len_size;
    let (byte_len, byte_len_size) = read_utf8_length(data, cursor, limit)?;
    let start = cursor + byte_len_size;
    let end = start.checked_add(byte_len)?;
    (end <= limit).then_some((start, end))
}

// Span of the string bytes when both lengths are single bytes.
fn single_byte_utf8_span(data: &[u8], offset: usize, limit: usize) -> Option<(usize, usize)> {
    let byte_len = read_u8(data, offset.checked_add(1)?)? as usize;
    let start = offset + 2;
    let end = start.checked_add(byte_len)?;
    (end <= limit).then_some((start, end))
}

fn read_utf8_string(data: &[u8], offset: usize, limit: usize) -> Option<String> {
    // Lengths of 128..=255 bytes are ambiguous between the two prefix layouts. The
    // layout whose string is followed by its NUL terminator is preferred.
    let spans = [
        extended_utf8_span(data, offset, limit),
        single_byte_utf8_span(data, offset, limit),
    ];
    let terminated = |&(_, end): &(usize, usize)| end < limit && data.get(end) == Some(&0);
    let (start, end) = spans
        .iter()
        .flatten()
        .copied()
        .find(terminated)
        .or_else(|| spans.iter().flatten().copied().next())?;
    let slice = &data[start..end];
    match std::str::from_utf8(slice) {
        Ok(text) => Some(text.to_string()),
        Err(_) => cesu8::from_java_cesu8(slice).ok().map(|text| text.into_owned()),
    }
}

fn read_utf16_string(data: &[u8], offset: usize, limit: usize) -> Option<String> {
    let (char_count, header_bytes) = read_utf16_length(data, offset, limit)?;
    let start = offset + header_bytes;
    let end = start.checked_add(char_count.checked_mul(2)?)?;
    if end > limit {
        return None;
    }
    let units = data[start..end]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    Some(
        char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
    )
}

fn read_utf8_length(data: &[u8], offset: usize, limit: usize) -> Option<(usize, usize)> {
    if offset >= limit {
        return None;
    }
    let first = read_u8(data, offset)?;
    if (first & 0x80) == 0 {
        Some((first as usize, 1))
    } else {
        if offset + 1 >= limit {
            return None;
        }
        let second = read_u8(data, offset + 1)?;
        Some(((((first & 0x7F) as usize) << 8) | second as usize, 2))
    }
}

fn read_utf16_length(data: &[u8], offset: usize, limit: usize) -> Option<(usize, usize)> {
    if offset.checked_add(2)? > limit {
        return None;
    }
    let first = read_u16(data, offset)?;
    if (first & 0x8000) == 0 {
        Some((first as usize, 2))
    } else {
        if offset + 4 > limit {
            return None;
        }
        let second = read_u16(data, offset + 2)?;
        Some(((((first & 0x7FFF) as usize) << 16) | second as usize, 4))
    }
}
