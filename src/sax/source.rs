use crate::{
    charset::{ByteBuffer, Charset, DecodeError, UTF8, find_charset},
    error::XMLError,
};

/// Bytes waiting to be parsed, together with the codec used to decode them.
///
/// The caller owns the source and lends it to
/// [`XMLReader::parse`](crate::sax::parser::XMLReader::parse) whenever new bytes
/// have arrived. Bytes of a character that is not complete yet stay in the buffer
/// until the rest of the character is supplied.
pub struct InputSource {
    buffer: ByteBuffer,
    charset: Box<dyn Charset>,
}

impl InputSource {
    /// Create an empty source decoding UTF-8.
    pub fn new() -> Self {
        Self::with_charset(Box::new(UTF8))
    }

    pub fn with_charset(charset: Box<dyn Charset>) -> Self {
        Self {
            buffer: ByteBuffer::new(),
            charset,
        }
    }

    /// Create an empty source decoding the encoding called `name`.
    pub fn with_charset_name(name: &str) -> Result<Self, XMLError> {
        let charset = find_charset(name).ok_or(XMLError::ParserUnsupportedEncoding)?;
        Ok(Self::with_charset(charset))
    }

    /// Create a UTF-8 source holding `bytes`.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let mut source = Self::new();
        source.set_buffer(ByteBuffer::from(bytes.into()));
        source
    }

    /// Append newly received bytes.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Replace the whole buffer.
    ///
    /// Any unread bytes of the previous buffer are dropped.
    pub fn set_buffer(&mut self, buffer: ByteBuffer) -> ByteBuffer {
        std::mem::replace(&mut self.buffer, buffer)
    }

    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut ByteBuffer {
        &mut self.buffer
    }

    /// Drop the consumed bytes, keeping any partially received character.
    pub fn compact(&mut self) {
        self.buffer.compact();
    }

    /// The number of bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.buffer.remaining()
    }

    pub fn charset_name(&self) -> &'static str {
        self.charset.name()
    }

    /// Switch to another codec for the bytes that follow.
    pub fn set_charset(&mut self, charset: Box<dyn Charset>) -> Box<dyn Charset> {
        std::mem::replace(&mut self.charset, charset)
    }

    /// Switch to the encoding called `name` for the bytes that follow.
    pub fn set_charset_by_name(&mut self, name: &str) -> Result<(), XMLError> {
        let charset = find_charset(name).ok_or(XMLError::ParserUnsupportedEncoding)?;
        self.set_charset(charset);
        Ok(())
    }

    /// Decode the next character.
    pub fn decode(&mut self) -> Result<char, DecodeError> {
        self.charset.decode(&mut self.buffer)
    }

    pub fn peek(&mut self) -> Result<char, DecodeError> {
        self.charset.peek(&mut self.buffer)
    }

    pub fn has_character(&mut self) -> bool {
        self.charset.has_character(&mut self.buffer)
    }

    pub fn has_characters(&mut self, count: usize) -> bool {
        self.charset.has_characters(&mut self.buffer, count)
    }

    /// Decode `count` characters without consuming them.
    pub fn peek_str(&mut self, count: usize) -> Result<String, DecodeError> {
        self.charset.peek_str(&mut self.buffer, count)
    }

    /// Consume `expected` if the input continues with it.
    pub fn skip(&mut self, expected: &str) -> bool {
        self.charset.skip(&mut self.buffer, expected)
    }
}

impl Default for InputSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSource")
            .field("buffer", &self.buffer)
            .field("charset", &self.charset.name())
            .finish()
    }
}
