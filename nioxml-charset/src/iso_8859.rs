use crate::{ByteBuffer, Charset, DecodeError};

pub const ISO_8859_1_NAME: &str = "ISO-8859-1";

/// ISO-8859-1 (Latin-1).
///
/// Every byte maps to the code point of the same value. Characters above U+00FF
/// are written as a space.
#[derive(Debug, Clone, Copy, Default)]
pub struct ISO8859_1;

impl Charset for ISO8859_1 {
    fn name(&self) -> &'static str {
        ISO_8859_1_NAME
    }

    fn decode(&mut self, buffer: &mut ByteBuffer) -> Result<char, DecodeError> {
        let b = buffer.get().ok_or(DecodeError::NotEnoughData)?;
        Ok(b as char)
    }

    fn encode(&mut self, buffer: &mut ByteBuffer, c: char) -> bool {
        buffer.put(u8::try_from(c).unwrap_or(b' '))
    }

    fn size(&self, _: char) -> usize {
        1
    }

    fn is_valid(&self, c: char) -> bool {
        u8::try_from(c).is_ok()
    }
}
