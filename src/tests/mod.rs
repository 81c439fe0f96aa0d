
#[cfg(test)]
mod tests {
    use crate::android::binary_xml::is_binary_xml;
    use crate::android::chunk::{Chunks, CHUNK_STRING_POOL};
    use crate::tests::fixtures::{full_manifest_builder, AxmlBuilder};

    #[test]
    fn builder_emits_well_formed_document() {
        let document = full_manifest_builder().build();
        assert!(is_binary_xml(&document));
        let declared = u32::from_le_bytes([document[4], document[5], document[6], document[7]]);
        assert_eq!(declared as usize, document.len());
        let last = Chunks::new(&document).last().expect("chunks");
        assert_eq!(last.end(), document.len());
    }

    #[test]
    fn builder_without_pool_skips_pool_chunk() {
        let document = AxmlBuilder::new(&["a"]).without_pool().start_tag(0, &[]).build();
        assert!(Chunks::new(&document).all(|chunk| chunk.chunk_type != CHUNK_STRING_POOL));
    }
}
