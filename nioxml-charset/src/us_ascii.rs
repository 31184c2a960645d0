use crate::{ByteBuffer, Charset, DecodeError};

pub const US_ASCII_NAME: &str = "US-ASCII";

/// 7-bit ASCII.
///
/// Characters outside of ASCII are written as a space.
#[derive(Debug, Clone, Copy, Default)]
pub struct USASCII;

impl Charset for USASCII {
    fn name(&self) -> &'static str {
        US_ASCII_NAME
    }

    fn decode(&mut self, buffer: &mut ByteBuffer) -> Result<char, DecodeError> {
        match buffer.peek_at(0) {
            Some(b) if b.is_ascii() => {
                buffer.advance(1);
                Ok(b as char)
            }
            Some(_) => Err(DecodeError::InvalidChar),
            None => Err(DecodeError::NotEnoughData),
        }
    }

    fn encode(&mut self, buffer: &mut ByteBuffer, c: char) -> bool {
        buffer.put(if c.is_ascii() { c as u8 } else { b' ' })
    }

    fn size(&self, _: char) -> usize {
        1
    }

    fn is_valid(&self, c: char) -> bool {
        c.is_ascii()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_bit_tests() {
        let mut buffer = ByteBuffer::from(&[b'a', 0x80]);
        assert_eq!(USASCII.decode(&mut buffer), Ok('a'));
        assert_eq!(USASCII.decode(&mut buffer), Err(DecodeError::InvalidChar));
        assert_eq!(buffer.position(), 1);

        let mut buffer = ByteBuffer::new();
        assert!(USASCII.encode(&mut buffer, '\u{E9}'));
        assert_eq!(buffer.as_bytes(), b" ");
        assert!(!USASCII.is_valid('\u{E9}'));
    }
}
