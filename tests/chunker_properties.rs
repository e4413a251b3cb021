use docent::domain::models::{ChunkingConfig, Document, Page};
use docent::infrastructure::vector::Chunker;
use proptest::prelude::*;

fn page_text() -> impl Strategy<Value = String> {
    "[a-zA-Zé0-9 .\n]{1,400}"
}

fn chunker(chunk_size: usize, chunk_overlap: usize) -> Chunker {
    Chunker::new(ChunkingConfig {
        chunk_overlap,
        ..ChunkingConfig::without_overlap(chunk_size)
    })
    .expect("valid chunking config")
}

proptest! {
    /// Property: without overlap, chunks tile the page exactly
    #[test]
    fn prop_chunks_reassemble_page(text in page_text(), size in 1usize..80) {
        let page = Page::new(1, text.as_str());
        let chunks = chunker(size, 0).chunk_page("doc", &page, 0);

        let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
        prop_assert_eq!(joined, text);

        for chunk in &chunks {
            if !chunk.metadata.oversized {
                prop_assert!(chunk.char_count() <= size);
            }
        }
    }

    /// Property: every page with text yields at least one chunk
    #[test]
    fn prop_non_blank_pages_produce_chunks(
        pages in proptest::collection::vec(page_text(), 1..6),
        size in 1usize..80,
    ) {
        let document = Document::new(
            "doc",
            "doc.txt",
            pages
                .iter()
                .enumerate()
                .map(|(i, text)| Page::new(i + 1, text.as_str()))
                .collect(),
        );
        let result = chunker(size, 0).chunk(&document);

        for page in &document.pages {
            let produced = result.chunks.iter().any(|c| c.source_page == page.number);
            prop_assert_eq!(produced, !page.is_blank());
            prop_assert_eq!(result.skipped_pages.contains(&page.number), page.is_blank());
        }
    }

    /// Property: overlapped chunks are exact page slices with unique ids
    #[test]
    fn prop_overlap_keeps_offsets_consistent(
        text in page_text(),
        size in 2usize..80,
        overlap_ratio in 0.0f64..1.0,
    ) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let overlap = ((size - 1) as f64 * overlap_ratio) as usize;
        let page = Page::new(1, text.as_str());
        let chunks = chunker(size, overlap).chunk_page("doc", &page, 0);

        let mut previous_span_start = None;
        let mut ids = std::collections::HashSet::new();
        for chunk in &chunks {
            let m = chunk.metadata;
            prop_assert_eq!(&text[m.start_offset..m.end_offset], chunk.content.as_str());
            prop_assert!(m.start_offset <= m.span_start);
            if let Some(floor) = previous_span_start {
                prop_assert!(m.start_offset >= floor);
            }
            prop_assert!(ids.insert(chunk.id.clone()));
            previous_span_start = Some(m.span_start);
        }
    }
}
