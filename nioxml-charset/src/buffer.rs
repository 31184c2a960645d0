/// A byte buffer with a read cursor and a bounded write end.
///
/// Bytes in `[0, position)` have been consumed, bytes in `[position, len)` are waiting
/// to be decoded. Writes append to the end as long as the total length stays within
/// the capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Vec<u8>,
    position: usize,
    capacity: Option<usize>,
}

impl ByteBuffer {
    /// Create an empty buffer without a capacity bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer that accepts at most `capacity` bytes of writes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            position: 0,
            capacity: Some(capacity),
        }
    }

    /// The current read position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the read position.
    ///
    /// The position is clamped to the length of the buffer.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }

    /// Skip `count` bytes.
    pub fn advance(&mut self, count: usize) {
        self.set_position(self.position + count);
    }

    /// The number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// Read one byte and advance the cursor.
    pub fn get(&mut self) -> Option<u8> {
        let b = *self.data.get(self.position)?;
        self.position += 1;
        Some(b)
    }

    /// Read the byte `offset` bytes after the cursor without moving it.
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.position + offset).copied()
    }

    /// The bytes that have not been consumed yet.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.position..]
    }

    /// All bytes held by this buffer, including consumed ones.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of bytes that can still be written.
    pub fn writable(&self) -> usize {
        match self.capacity {
            Some(capacity) => capacity.saturating_sub(self.data.len()),
            None => usize::MAX,
        }
    }

    /// Append one byte if the capacity allows it.
    pub fn put(&mut self, b: u8) -> bool {
        if self.writable() == 0 {
            return false;
        }
        self.data.push(b);
        true
    }

    /// Append all of `bytes` or nothing.
    pub fn put_slice(&mut self, bytes: &[u8]) -> bool {
        if self.writable() < bytes.len() {
            return false;
        }
        self.data.extend_from_slice(bytes);
        true
    }

    /// Append `bytes` regardless of the capacity, raising it if necessary.
    ///
    /// This is the path used to feed freshly received input.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
        if let Some(capacity) = self.capacity.as_mut() {
            *capacity = (*capacity).max(self.data.len());
        }
    }

    /// Drop the consumed bytes and move the unread tail to the front.
    ///
    /// A partially received character at the end stays in the buffer.
    pub fn compact(&mut self) {
        self.data.drain(..self.position);
        self.position = 0;
    }

    /// Discard every byte and reset the cursor.
    pub fn clear(&mut self) {
        self.data.clear();
        self.position = 0;
    }

    /// Take the written bytes out of this buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data,
            position: 0,
            capacity: None,
        }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(data: &[u8]) -> Self {
        data.to_vec().into()
    }
}

impl<const N: usize> From<&[u8; N]> for ByteBuffer {
    fn from(data: &[u8; N]) -> Self {
        data.to_vec().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_keeps_unread_tail() {
        let mut buffer = ByteBuffer::from(b"abc\xE3\x81");
        assert_eq!(buffer.get(), Some(b'a'));
        assert_eq!(buffer.get(), Some(b'b'));
        assert_eq!(buffer.get(), Some(b'c'));
        buffer.compact();
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.unread(), b"\xE3\x81");
        buffer.extend_from_slice(b"\x82");
        assert_eq!(buffer.unread(), "あ".as_bytes());
    }

    #[test]
    fn bounded_writes() {
        let mut buffer = ByteBuffer::with_capacity(3);
        assert!(buffer.put(1));
        assert!(!buffer.put_slice(&[2, 3, 4]));
        assert!(buffer.put_slice(&[2, 3]));
        assert!(!buffer.put(4));
        assert_eq!(buffer.as_bytes(), &[1, 2, 3]);
    }
}
