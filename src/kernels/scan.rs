//! Bounded key-end scan for the length-dependent layouts.
//!
//! A key still sitting in the source buffer has no length of its own: it ends at
//! the terminating delimiter. Keys of a known set are never shorter than the
//! shortest key or longer than the longest, so only that window is searched.

/// The `[min_len, max_len]` window a key end must fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthWindow {
    pub min_len: usize,
    pub max_len: usize,
    pub delimiter: u8,
}

impl LengthWindow {
    pub const fn new(min_len: usize, max_len: usize, delimiter: u8) -> Self {
        Self {
            min_len,
            max_len,
            delimiter,
        }
    }

    /// Recovers the key length from the start of `input`.
    ///
    /// Returns the offset of the first delimiter in `[min_len, max_len]`. If the
    /// input runs out inside the window without a delimiter, the input end counts
    /// as the key end. Any other input yields `None`. Never reads past `input`.
    #[inline]
    pub fn key_len(&self, input: &[u8]) -> Option<usize> {
        if input.len() < self.min_len {
            return None;
        }
        let end = input.len().min(self.max_len.saturating_add(1));
        match memchr::memchr(self.delimiter, &input[self.min_len..end]) {
            Some(pos) => Some(self.min_len + pos),
            None if input.len() <= self.max_len => Some(input.len()),
            None => None,
        }
    }
}
