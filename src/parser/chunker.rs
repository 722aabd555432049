// file: src/parser/chunker.rs
// description: recursive separator-based text chunking with character overlap
// reference: internal chunking rules

use crate::error::{PipelineError, Result};
use std::collections::VecDeque;

/// Separator preference: paragraph, line, word, then single characters.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// A chunk is always an exact slice `text[start..end]` of the chunked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    start: usize,
    end: usize,
    chars: usize,
}

#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(PipelineError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut segments = Vec::new();
        self.segment(text, 0, &SEPARATORS, &mut segments);
        self.merge(text, &segments)
    }

    /// Tiles `text` into segments of at most `chunk_size` characters.
    fn segment(&self, text: &str, offset: usize, separators: &[&str], out: &mut Vec<Segment>) {
        let chars = text.chars().count();
        if chars <= self.chunk_size {
            out.push(Segment {
                start: offset,
                end: offset + text.len(),
                chars,
            });
            return;
        }

        let position = separators.iter().position(|sep| text.contains(sep));
        let Some(position) = position else {
            self.segment_by_chars(text, offset, out);
            return;
        };

        let separator = separators[position];
        let remaining = &separators[position + 1..];
        let mut cursor = offset;

        for part in text.split_inclusive(separator) {
            let part_chars = part.chars().count();
            if part_chars <= self.chunk_size {
                out.push(Segment {
                    start: cursor,
                    end: cursor + part.len(),
                    chars: part_chars,
                });
            } else {
                self.segment(part, cursor, remaining, out);
            }
            cursor += part.len();
        }
    }

    fn segment_by_chars(&self, text: &str, offset: usize, out: &mut Vec<Segment>) {
        let mut start = 0;
        let mut count = 0;

        for (index, _) in text.char_indices() {
            if count == self.chunk_size {
                out.push(Segment {
                    start: offset + start,
                    end: offset + index,
                    chars: count,
                });
                start = index;
                count = 0;
            }
            count += 1;
        }

        if count > 0 {
            out.push(Segment {
                start: offset + start,
                end: offset + text.len(),
                chars: count,
            });
        }
    }

    /// Greedily packs segments; each chunk after the first re-opens with the
    /// trailing segments of its predecessor that fit within `chunk_overlap`.
    fn merge(&self, text: &str, segments: &[Segment]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<Segment> = VecDeque::new();
        let mut window_chars = 0usize;

        for segment in segments {
            if window_chars + segment.chars > self.chunk_size && !window.is_empty() {
                chunks.push(Self::emit(text, &window));

                while let Some(front) = window.front().copied() {
                    let over_overlap = window_chars > self.chunk_overlap;
                    let too_big = window_chars + segment.chars > self.chunk_size;
                    if !(over_overlap || too_big) {
                        break;
                    }
                    window.pop_front();
                    window_chars -= front.chars;
                }
            }

            window.push_back(*segment);
            window_chars += segment.chars;
        }

        if !window.is_empty() {
            chunks.push(Self::emit(text, &window));
        }

        chunks
    }

    fn emit(text: &str, window: &VecDeque<Segment>) -> Chunk {
        let start = window.front().map(|s| s.start).unwrap_or(0);
        let end = window.back().map(|s| s.end).unwrap_or(start);
        Chunk {
            text: text[start..end].to_string(),
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reconstruct(chunks: &[Chunk]) -> String {
        let mut out = String::new();
        let mut covered = 0usize;
        for chunk in chunks {
            let skip = covered.saturating_sub(chunk.start);
            out.push_str(&chunk.text[skip..]);
            covered = chunk.end;
        }
        out
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(100, 100).is_err());
        assert!(Chunker::new(100, 20).is_ok());
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = Chunker::new(50, 10).unwrap();
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = Chunker::new(800, 150).unwrap();
        let chunks = chunker.split("Revenue grew by 12% in 2023.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Revenue grew by 12% in 2023.");
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let chunker = Chunker::new(30, 0).unwrap();
        let text = "first paragraph here\n\nsecond paragraph here";
        let chunks = chunker.split(text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "first paragraph here\n\n");
        assert_eq!(chunks[1].text, "second paragraph here");
    }

    #[test]
    fn test_chunks_respect_size_and_share_overlap() {
        let chunker = Chunker::new(20, 8).unwrap();
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let chunks = chunker.split(text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 20);
            assert!(!chunk.text.is_empty());
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].start <= pair[0].end);
            assert!(pair[1].start > pair[0].start);
            let shared = &text[pair[1].start..pair[0].end];
            assert!(shared.chars().count() <= 8);
        }
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_devanagari_measured_in_characters() {
        let chunker = Chunker::new(10, 2).unwrap();
        let text = "अनुमोदनतिथिदसजनवरीहै";
        let chunks = chunker.split(text);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 10);
        }
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_deterministic_output() {
        let chunker = Chunker::new(25, 5).unwrap();
        let text = "line one\nline two is longer\nline three\n\nnew paragraph text";
        assert_eq!(chunker.split(text), chunker.split(text));
    }

    proptest! {
        #[test]
        fn prop_chunks_reconstruct_text(
            text in "[a-z \\n।अआ.]{0,300}",
            size in 5usize..60,
            overlap_seed in 0usize..60,
        ) {
            let overlap = overlap_seed % size;
            let chunker = Chunker::new(size, overlap).unwrap();
            let chunks = chunker.split(&text);

            prop_assert_eq!(reconstruct(&chunks), text.clone());
            for chunk in &chunks {
                prop_assert!(!chunk.text.is_empty());
                prop_assert!(chunk.text.chars().count() <= size);
                prop_assert_eq!(&text[chunk.start..chunk.end], chunk.text.as_str());
            }
        }
    }
}
