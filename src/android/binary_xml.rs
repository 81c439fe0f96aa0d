use crate::android::chunk::{read_u16, read_u32, ChunkHeader, Chunks, CHUNK_AXML_FILE, CHUNK_START_TAG, CHUNK_STRING_POOL};
use crate::android::string_pool::{StringPool, NO_ENTRY_INDEX};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TAG_NAME_OFFSET: usize = 20;
const ATTRIBUTE_COUNT_OFFSET: usize = 28;
const ATTRIBUTES_OFFSET: usize = 36;
const ATTRIBUTE_SIZE: usize = 20;
const ATTRIBUTE_NAME_OFFSET: usize = 4;
const ATTRIBUTE_VALUE_OFFSET: usize = 8;

/// Returns true when `data` starts with the binary XML file chunk type.
///
/// Textual manifests (`<?xml ...` or `<manifest ...`) never match.
pub fn is_binary_xml(data: &[u8]) -> bool {
    read_u32(data, 0) == Some(CHUNK_AXML_FILE)
}

/// Unresolved payload of a start tag chunk: string pool indices only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawNode {
    pub name: u32,
    /// `(name index, string value index)` per attribute record, in record order.
    pub attributes: Vec<(u32, u32)>,
}

impl RawNode {
    /// Reads the start tag payload of `header`.
    ///
    /// Returns `None` when the chunk is too short to hold a tag name. Attribute records
    /// that do not fit inside the chunk are dropped, along with every record after them.
    pub fn parse(data: &[u8], header: &ChunkHeader) -> Option<RawNode> {
        let chunk = header.bytes(data);
        let name = read_u32(chunk, TAG_NAME_OFFSET)?;
        let count = read_u16(chunk, ATTRIBUTE_COUNT_OFFSET).unwrap_or(0) as usize;

        let mut attributes = Vec::with_capacity(count.min(chunk.len() / ATTRIBUTE_SIZE));
        for i in 0..count {
            let record = ATTRIBUTES_OFFSET + i * ATTRIBUTE_SIZE;
            if record + ATTRIBUTE_SIZE > chunk.len() {
                break;
            }
            let (Some(name_idx), Some(value_idx)) = (
                read_u32(chunk, record + ATTRIBUTE_NAME_OFFSET),
                read_u32(chunk, record + ATTRIBUTE_VALUE_OFFSET),
            ) else {
                break;
            };
            attributes.push((name_idx, value_idx));
        }

        Some(RawNode { name, attributes })
    }

    /// Resolves every index against `pool`.
    ///
    /// An attribute is kept only when both its name and value resolve; the sentinel
    /// index and indices past the end of the pool drop the attribute. A repeated
    /// attribute name keeps the last value. An unresolved tag name becomes empty.
    pub fn resolve(&self, pool: &StringPool) -> ResolvedNode {
        let mut attributes = BTreeMap::new();
        for &(name_idx, value_idx) in &self.attributes {
            if name_idx == NO_ENTRY_INDEX || value_idx == NO_ENTRY_INDEX {
                continue;
            }
            if let (Some(name), Some(value)) = (pool.get(name_idx), pool.get(value_idx)) {
                attributes.insert(name.to_string(), value.to_string());
            }
        }
        let mut node = ResolvedNode::new(pool.get(self.name).unwrap_or_default());
        node.attributes = attributes;
        node
    }
}

/// A start tag with its name and string-valued attributes resolved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

impl ResolvedNode {
    pub fn new(name: impl Into<String>) -> Self {
        ResolvedNode {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|value| value.as_str())
    }
}

/// Flattens every start tag of a binary XML buffer, in document order.
///
/// Only the string pool and start tag chunks are interpreted; namespace, end tag,
/// text and resource id chunks are stepped over. When a later string pool chunk
/// appears it replaces the earlier one for the tags that follow it. Without any
/// string pool every index is unresolved. A truncated or corrupt chunk ends the walk
/// and the nodes gathered so far are returned.
pub fn parse_nodes(data: &[u8]) -> Vec<ResolvedNode> {
    let mut pool = StringPool::default();
    let mut nodes = Vec::new();

    for header in Chunks::new(data) {
        match header.chunk_type {
            CHUNK_STRING_POOL => {
                pool = StringPool::parse(data, header.offset);
            }
            CHUNK_START_TAG => {
                if let Some(raw) = RawNode::parse(data, &header) {
                    nodes.push(raw.resolve(&pool));
                }
            }
            _ => {}
        }
    }

    nodes
}
