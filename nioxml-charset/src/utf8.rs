use crate::{ByteBuffer, Charset, DecodeError};

pub const UTF8_NAME: &str = "UTF-8";

#[derive(Debug, Clone, Copy, Default)]
pub struct UTF8;

impl Charset for UTF8 {
    fn name(&self) -> &'static str {
        UTF8_NAME
    }

    fn decode(&mut self, buffer: &mut ByteBuffer) -> Result<char, DecodeError> {
        let bytes = buffer.unread();
        let Some(&lead) = bytes.first() else {
            return Err(DecodeError::NotEnoughData);
        };
        // (sequence length, payload bits of the lead byte, valid range of the second byte)
        let (len, code, second) = match lead {
            0x00..=0x7F => {
                buffer.advance(1);
                return Ok(lead as char);
            }
            0xC2..=0xDF => (2, lead & 0x1F, 0x80..=0xBF),
            // exclude overlong forms
            0xE0 => (3, lead & 0x0F, 0xA0..=0xBF),
            // exclude encoded surrogates
            0xED => (3, lead & 0x0F, 0x80..=0x9F),
            0xE1..=0xEC | 0xEE..=0xEF => (3, lead & 0x0F, 0x80..=0xBF),
            0xF0 => (4, lead & 0x07, 0x90..=0xBF),
            // exclude code points beyond U+10FFFF
            0xF4 => (4, lead & 0x07, 0x80..=0x8F),
            0xF1..=0xF3 => (4, lead & 0x07, 0x80..=0xBF),
            _ => return Err(DecodeError::InvalidChar),
        };
        let mut code = code as u32;

        // A broken sequence is reported as soon as it is visible,
        // even if the rest of the sequence has not arrived yet.
        for (i, &b) in bytes.iter().enumerate().take(len).skip(1) {
            let valid = if i == 1 {
                second.contains(&b)
            } else {
                (0x80..=0xBF).contains(&b)
            };
            if !valid {
                return Err(DecodeError::InvalidChar);
            }
            code = (code << 6) | (b & 0x3F) as u32;
        }
        if bytes.len() < len {
            return Err(DecodeError::NotEnoughData);
        }

        let c = char::from_u32(code).ok_or(DecodeError::InvalidChar)?;
        buffer.advance(len);
        Ok(c)
    }

    fn encode(&mut self, buffer: &mut ByteBuffer, c: char) -> bool {
        let mut bytes = [0; 4];
        buffer.put_slice(c.encode_utf8(&mut bytes).as_bytes())
    }

    fn size(&self, c: char) -> usize {
        c.len_utf8()
    }
}
