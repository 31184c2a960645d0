use crate::{ByteBuffer, Charset, DecodeError};

pub const UTF16_NAME: &str = "UTF-16";
pub const UTF16BE_NAME: &str = "UTF-16BE";
pub const UTF16LE_NAME: &str = "UTF-16LE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endian {
    Big,
    Little,
}

fn code_unit(bytes: &[u8], offset: usize, endian: Endian) -> Option<u16> {
    let pair = [*bytes.get(offset)?, *bytes.get(offset + 1)?];
    Some(match endian {
        Endian::Big => u16::from_be_bytes(pair),
        Endian::Little => u16::from_le_bytes(pair),
    })
}

/// Decode the first character of `bytes` and return it with its length in bytes.
fn decode_utf16(bytes: &[u8], endian: Endian) -> Result<(char, usize), DecodeError> {
    let high = code_unit(bytes, 0, endian).ok_or(DecodeError::NotEnoughData)?;
    match high {
        0xD800..=0xDBFF => {
            let low = code_unit(bytes, 2, endian).ok_or(DecodeError::NotEnoughData)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(DecodeError::InvalidChar);
            }
            let code = 0x10000 + (((high as u32 - 0xD800) << 10) | (low as u32 - 0xDC00));
            let c = char::from_u32(code).ok_or(DecodeError::InvalidChar)?;
            Ok((c, 4))
        }
        0xDC00..=0xDFFF => Err(DecodeError::InvalidChar),
        _ => {
            let c = char::from_u32(high as u32).ok_or(DecodeError::InvalidChar)?;
            Ok((c, 2))
        }
    }
}

fn encode_utf16(buffer: &mut ByteBuffer, c: char, endian: Endian) -> bool {
    let mut units = [0; 2];
    let units = c.encode_utf16(&mut units);
    let mut bytes = [0; 4];
    for (i, unit) in units.iter().enumerate() {
        let pair = match endian {
            Endian::Big => unit.to_be_bytes(),
            Endian::Little => unit.to_le_bytes(),
        };
        bytes[i * 2..i * 2 + 2].copy_from_slice(&pair);
    }
    buffer.put_slice(&bytes[..units.len() * 2])
}

/// UTF-16 that detects its byte order from a byte order mark.
///
/// The byte order is fixed by the first character decoded or encoded. When decoding,
/// a leading `FE FF` or `FF FE` selects big or little endian and is consumed together
/// with the character that follows it. Without a byte order mark big endian is assumed.
#[derive(Debug, Clone, Default)]
pub struct UTF16 {
    endian: Option<Endian>,
    requires_bom: bool,
}

impl UTF16 {
    /// Make the first [`Charset::encode`] emit a byte order mark.
    ///
    /// Returns `false` if this codec has already been used; the setting is unchanged then.
    pub fn set_requires_bom(&mut self, requires_bom: bool) -> bool {
        if self.endian.is_some() {
            return false;
        }
        self.requires_bom = requires_bom;
        true
    }

    pub fn requires_bom(&self) -> bool {
        self.requires_bom
    }

    /// Check if the byte order is already fixed, and whether it is big endian.
    pub fn is_big_endian(&self) -> Option<bool> {
        self.endian.map(|endian| endian == Endian::Big)
    }
}

impl Charset for UTF16 {
    fn name(&self) -> &'static str {
        UTF16_NAME
    }

    fn decode(&mut self, buffer: &mut ByteBuffer) -> Result<char, DecodeError> {
        if let Some(endian) = self.endian {
            let (c, len) = decode_utf16(buffer.unread(), endian)?;
            buffer.advance(len);
            return Ok(c);
        }

        let bytes = buffer.unread();
        let (endian, bom) = match bytes {
            [] | [_] => return Err(DecodeError::NotEnoughData),
            [0xFE, 0xFF, ..] => (Endian::Big, 2),
            [0xFF, 0xFE, ..] => (Endian::Little, 2),
            _ => (Endian::Big, 0),
        };
        // Nothing is locked until a real character follows the byte order mark.
        let (c, len) = decode_utf16(&bytes[bom..], endian)?;
        self.endian = Some(endian);
        buffer.advance(bom + len);
        Ok(c)
    }

    fn encode(&mut self, buffer: &mut ByteBuffer, c: char) -> bool {
        if let Some(endian) = self.endian {
            return encode_utf16(buffer, c, endian);
        }

        if self.requires_bom {
            if buffer.writable() < 2 + c.len_utf16() * 2 {
                return false;
            }
            buffer.put_slice(&[0xFE, 0xFF]);
            self.endian = Some(Endian::Big);
            return encode_utf16(buffer, c, Endian::Big);
        }

        // An explicit byte order mark written by the caller decides the byte order.
        let endian = if c == '\u{FFFE}' {
            Endian::Little
        } else {
            Endian::Big
        };
        if c == '\u{FFFE}' {
            if !buffer.put_slice(&[0xFF, 0xFE]) {
                return false;
            }
        } else if !encode_utf16(buffer, c, endian) {
            return false;
        }
        self.endian = Some(endian);
        true
    }

    fn size(&self, c: char) -> usize {
        c.len_utf16() * 2
    }

    fn save_state(&self) -> u8 {
        match self.endian {
            None => 0,
            Some(Endian::Big) => 1,
            Some(Endian::Little) => 2,
        }
    }

    fn restore_state(&mut self, state: u8) {
        self.endian = match state {
            1 => Some(Endian::Big),
            2 => Some(Endian::Little),
            _ => None,
        };
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UTF16BE;

impl Charset for UTF16BE {
    fn name(&self) -> &'static str {
        UTF16BE_NAME
    }

    fn decode(&mut self, buffer: &mut ByteBuffer) -> Result<char, DecodeError> {
        let (c, len) = decode_utf16(buffer.unread(), Endian::Big)?;
        buffer.advance(len);
        Ok(c)
    }

    fn encode(&mut self, buffer: &mut ByteBuffer, c: char) -> bool {
        encode_utf16(buffer, c, Endian::Big)
    }

    fn size(&self, c: char) -> usize {
        c.len_utf16() * 2
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UTF16LE;

impl Charset for UTF16LE {
    fn name(&self) -> &'static str {
        UTF16LE_NAME
    }

    fn decode(&mut self, buffer: &mut ByteBuffer) -> Result<char, DecodeError> {
        let (c, len) = decode_utf16(buffer.unread(), Endian::Little)?;
        buffer.advance(len);
        Ok(c)
    }

    fn encode(&mut self, buffer: &mut ByteBuffer, c: char) -> bool {
        encode_utf16(buffer, c, Endian::Little)
    }

    fn size(&self, c: char) -> usize {
        c.len_utf16() * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_order_mark_tests() {
        let mut codec = UTF16::default();
        let mut buffer = ByteBuffer::from(&[0xFF, 0xFE, 0x3C]);
        assert_eq!(codec.decode(&mut buffer), Err(DecodeError::NotEnoughData));
        assert_eq!(buffer.position(), 0);
        assert_eq!(codec.is_big_endian(), None);

        buffer.extend_from_slice(&[0x00, 0x61, 0x00]);
        assert_eq!(codec.peek(&mut buffer), Ok('<'));
        assert_eq!(codec.is_big_endian(), None);
        assert_eq!(codec.decode(&mut buffer), Ok('<'));
        assert_eq!(buffer.position(), 4);
        assert_eq!(codec.is_big_endian(), Some(false));
        assert_eq!(codec.decode(&mut buffer), Ok('a'));

        let mut codec = UTF16::default();
        let mut buffer = ByteBuffer::from(&[0x00, 0x3C]);
        assert_eq!(codec.decode(&mut buffer), Ok('<'));
        assert_eq!(codec.is_big_endian(), Some(true));
    }

    #[test]
    fn requires_bom_tests() {
        let mut codec = UTF16::default();
        assert!(codec.set_requires_bom(true));
        let mut buffer = ByteBuffer::new();
        assert_eq!(codec.write(&mut buffer, "<a/>"), 4);
        assert!(!codec.set_requires_bom(false));
        assert_eq!(
            buffer.as_bytes(),
            &[0xFE, 0xFF, 0x00, 0x3C, 0x00, 0x61, 0x00, 0x2F, 0x00, 0x3E]
        );

        let mut codec = UTF16::default();
        let mut buffer = ByteBuffer::new();
        assert!(codec.encode(&mut buffer, '\u{FFFE}'));
        assert!(codec.encode(&mut buffer, 'a'));
        assert_eq!(buffer.as_bytes(), &[0xFF, 0xFE, 0x61, 0x00]);
    }

    #[test]
    fn surrogate_tests() {
        let mut buffer = ByteBuffer::from(&[0xD8, 0x3D, 0xDE]);
        assert_eq!(UTF16BE.decode(&mut buffer), Err(DecodeError::NotEnoughData));
        buffer.extend_from_slice(&[0x00]);
        assert_eq!(UTF16BE.decode(&mut buffer), Ok('\u{1F600}'));

        let mut buffer = ByteBuffer::from(&[0x00, 0xDC, 0x41, 0x00]);
        assert_eq!(UTF16LE.decode(&mut buffer), Err(DecodeError::InvalidChar));
        let mut buffer = ByteBuffer::from(&[0x3D, 0xD8, 0x41, 0x00]);
        assert_eq!(UTF16LE.decode(&mut buffer), Err(DecodeError::InvalidChar));
        assert_eq!(buffer.position(), 0);
    }
}
