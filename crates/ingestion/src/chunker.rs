//! Deterministic chunking with overlap
//!
//! Splits normalized text into embedding-sized segments with a sliding
//! window. Where the raw window edge would cut mid-sentence, the chunk is
//! truncated at the last sentence boundary past the window midpoint, and
//! the next window overlaps the *realized* chunk end rather than the
//! nominal edge, so overlap survives boundary truncation.

use scribe_common::config::ChunkingConfig;
use scribe_common::errors::{AiError, Result};

/// A bounded, trimmed segment of the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Byte offset of the trimmed chunk start in the source text
    pub start: usize,
    /// Byte offset one past the trimmed chunk end
    pub end: usize,
    /// The trimmed chunk itself
    pub text: &'a str,
}

/// Validated chunking parameters
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// Requires `0 < overlap < size`.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.chunk_overlap == 0 || config.chunk_overlap >= config.chunk_size {
            return Err(AiError::InvalidChunking {
                size: config.chunk_size,
                overlap: config.chunk_overlap,
            });
        }
        Ok(Self {
            size: config.chunk_size,
            overlap: config.chunk_overlap,
        })
    }

    /// Lazy, restartable chunk sequence over `text`.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            start: 0,
            size: self.size,
            overlap: self.overlap,
        }
    }
}

/// Iterator over chunks; `Clone` restarts from its captured position
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    start: usize,
    size: usize,
    overlap: usize,
}

impl<'a> Chunks<'a> {
    /// Largest char boundary at or below `pos`
    fn floor_boundary(&self, mut pos: usize) -> usize {
        while pos > 0 && !self.text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    /// Smallest char boundary strictly above `pos`
    fn next_boundary(&self, mut pos: usize) -> usize {
        pos += 1;
        while pos < self.text.len() && !self.text.is_char_boundary(pos) {
            pos += 1;
        }
        pos
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        let len = self.text.len();

        while self.start < len {
            let nominal = self.start + self.size;
            let mut end;
            let advance_base;

            if nominal >= len {
                // Final partial window: the chunk ends with the text, and
                // the advance is taken from the nominal edge so the loop
                // terminates once the tail is consumed.
                end = len;
                advance_base = nominal;
            } else {
                // Window edge snapped onto a char boundary
                let snapped = self.floor_boundary(nominal);
                end = if snapped > self.start {
                    snapped
                } else {
                    self.next_boundary(self.start)
                };

                // Prefer ending on a sentence boundary found beyond the
                // window midpoint.
                let window = &self.text[self.start..end];
                if let Some(pos) = window.rfind(['.', '!', '?']) {
                    if pos > self.size / 2 {
                        end = self.start + pos + 1;
                    }
                }

                // Overlap is measured from the realized chunk end
                advance_base = end;
            }

            let raw = &self.text[self.start..end];
            let trimmed = raw.trim();
            let lead = raw.len() - raw.trim_start().len();
            let chunk_start = self.start + lead;

            // Guard against a truncated end sliding the window backwards
            let with_overlap = advance_base.saturating_sub(self.overlap);
            self.start = if with_overlap > self.start { with_overlap } else { end };

            if !trimmed.is_empty() {
                return Some(Chunk {
                    start: chunk_start,
                    end: chunk_start + trimmed.len(),
                    text: trimmed,
                });
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(Chunker::new(ChunkingConfig { chunk_size: 100, chunk_overlap: 0 }).is_err());
        assert!(Chunker::new(ChunkingConfig { chunk_size: 100, chunk_overlap: 100 }).is_err());
        assert!(Chunker::new(ChunkingConfig { chunk_size: 100, chunk_overlap: 150 }).is_err());
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let c = chunker(100, 20);
        assert_eq!(c.chunks("").count(), 0);
        assert_eq!(c.chunks("    ").count(), 0);
    }

    #[test]
    fn test_short_text_yields_single_chunk() {
        let c = chunker(100, 20);
        let chunks: Vec<_> = c.chunks("Just one short sentence.").collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Just one short sentence.");
        assert_eq!(chunks[0].start, 0);
    }

    #[test]
    fn test_chunks_are_bounded_and_non_empty() {
        let text = "Sentence one is here. Sentence two follows it. Sentence three continues. \
                    Sentence four goes on. Sentence five ends the text."
            .repeat(4);
        let c = chunker(80, 20);

        let chunks: Vec<_> = c.chunks(&text).collect();
        assert!(chunks.len() > 2);
        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
            assert!(chunk.text.len() <= 80, "chunk too long: {}", chunk.text.len());
        }
    }

    #[test]
    fn test_coverage_has_no_gaps() {
        let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota kappa. \
                    Lambda mu nu xi omicron. Pi rho sigma tau."
            .repeat(3);
        let c = chunker(60, 15);

        let chunks: Vec<_> = c.chunks(&text).collect();
        assert!(!chunks.is_empty());

        // First chunk starts at the first non-space byte, last chunk ends at
        // the last; anything between consecutive chunks is whitespace only.
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks.last().unwrap().end, text.trim_end().len());
        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start > prev.end {
                assert!(
                    text[prev.end..next.start].trim().is_empty(),
                    "gap between chunks carries text"
                );
            }
        }
    }

    #[test]
    fn test_truncates_at_sentence_boundary_past_midpoint() {
        // Window edge at 40 bytes lands mid-second-sentence; the period at
        // byte 27 sits past the midpoint (20), so the chunk ends there.
        let text = "This first sentence is done. The second one rambles on much longer.";
        let c = chunker(40, 10);

        let chunks: Vec<_> = c.chunks(text).collect();
        assert_eq!(chunks[0].text, "This first sentence is done.");
    }

    #[test]
    fn test_boundary_before_midpoint_is_ignored() {
        // Only sentence boundary is at byte 3, well before the midpoint of
        // a 40-byte window, so the raw edge wins.
        let text = "Hi. abcdefghijklmnopqrstuvwxyz abcdefghijklmnopqrstuvwxyz end";
        let c = chunker(40, 10);

        let chunks: Vec<_> = c.chunks(text).collect();
        assert_eq!(chunks[0].end - chunks[0].start, chunks[0].text.len());
        assert!(chunks[0].text.len() > 10);
    }

    #[test]
    fn test_overlap_measured_from_realized_end() {
        let text = "This first sentence is done. The second one rambles on much longer.";
        let c = chunker(40, 10);

        let mut iter = c.chunks(text);
        let first = iter.next().unwrap();
        assert_eq!(first.text, "This first sentence is done.");

        // Realized end is byte 28 (after the period); next window starts at
        // 28 - 10 = 18, inside the first chunk.
        let second = iter.next().unwrap();
        assert!(second.start < first.end);
        assert_eq!(second.start, first.end.saturating_sub(10).max(first.start));
    }

    #[test]
    fn test_final_partial_window_is_kept() {
        let text = "A full sized leading sentence lives here. Tail.";
        let c = chunker(41, 10);

        let chunks: Vec<_> = c.chunks(text).collect();
        assert!(chunks.last().unwrap().text.ends_with("Tail."));
    }

    #[test]
    fn test_iterator_is_restartable() {
        let text = "One sentence. Two sentence. Three sentence. Four sentence.".repeat(2);
        let c = chunker(30, 5);

        let first_pass: Vec<_> = c.chunks(&text).collect();
        let second_pass: Vec<_> = c.chunks(&text).collect();
        assert_eq!(first_pass, second_pass);

        let iter = c.chunks(&text);
        let cloned: Vec<_> = iter.clone().collect();
        assert_eq!(cloned, first_pass);
    }

    #[test]
    fn test_multibyte_text_never_splits_chars() {
        let text = "Étés häufig — καλημέρα köszönöm. Ännu en mening här på svenska.".repeat(3);
        let c = chunker(24, 6);

        for chunk in c.chunks(&text) {
            // Slicing would have panicked already; check offsets line up too
            assert_eq!(&text[chunk.start..chunk.end], chunk.text);
        }
    }

    #[test]
    fn test_always_makes_progress() {
        // Dense punctuation plus a large overlap tries to drag the window
        // backwards; the iterator must still terminate.
        let text = "a. b. c. d. e. f. g. h. i. j. k. l. m. n. o. p.".repeat(5);
        let c = chunker(10, 8);

        let chunks: Vec<_> = c.chunks(&text).collect();
        assert!(!chunks.is_empty());
        assert!(chunks.len() < text.len());
    }
}
