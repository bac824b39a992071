//! Positional matching of signatures against raw image bytes

use memchr::memchr_iter;

use super::SignaturePattern;

impl SignaturePattern {
    /// Check whether the pattern matches `buffer` starting at `offset`.
    ///
    /// Returns false when the pattern would run past the end of the buffer.
    pub fn matches_at(&self, buffer: &[u8], offset: usize) -> bool {
        let Some(end) = offset.checked_add(self.len()) else {
            return false;
        };
        if end > buffer.len() {
            return false;
        }

        self.bytes()
            .iter()
            .zip(&buffer[offset..end])
            .all(|(expected, actual)| expected.is_none_or(|value| value == *actual))
    }

    /// Lowest offset in `buffer` at which the pattern matches.
    ///
    /// Candidates are located with `memchr` on the first literal byte, so
    /// only offsets where that byte lines up are fully compared.
    pub fn find_first(&self, buffer: &[u8]) -> Option<usize> {
        let Some((anchor_index, anchor)) = self
            .bytes()
            .iter()
            .enumerate()
            .find_map(|(i, b)| b.map(|value| (i, value)))
        else {
            // Only wildcards
            return (0..buffer.len()).find(|&offset| self.matches_at(buffer, offset));
        };

        if buffer.len() <= anchor_index {
            return None;
        }

        memchr_iter(anchor, &buffer[anchor_index..])
            .find(|&offset| self.matches_at(buffer, offset))
    }

    /// Whether the pattern matches anywhere in `buffer`
    pub fn matches_any(&self, buffer: &[u8]) -> bool {
        self.find_first(buffer).is_some()
    }
}
