//! Character codecs that decode one character at a time from a [`ByteBuffer`].
//!
//! Unlike stream decoders, every codec in this crate distinguishes "the buffer ends in the
//! middle of a character" ([`DecodeError::NotEnoughData`]) from "the bytes are not a valid
//! character" ([`DecodeError::InvalidChar`]). On either failure the read cursor of the buffer
//! is left exactly where it was, so the caller can append more bytes and try again.
//!
//! Codecs are looked up by name with [`find_charset`]. Names are compared case-insensitively
//! and aliases can be registered with [`register_charset_alias`]. The default names and
//! aliases are based on
//! [IANA registrations](https://www.iana.org/assignments/character-sets/character-sets.xhtml).

mod buffer;
mod iso_8859;
mod us_ascii;
mod utf16;
mod utf8;

use std::{
    borrow::Cow,
    collections::BTreeMap,
    sync::{LazyLock, RwLock},
};

pub use buffer::*;
pub use iso_8859::*;
pub use us_ascii::*;
pub use utf8::*;
pub use utf16::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// The buffer ends before a whole character could be read.
    NotEnoughData,
    /// The bytes at the cursor do not form a character in this encoding.
    InvalidChar,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for DecodeError {}

/// A snapshot of a buffer cursor together with the stream state of a codec.
///
/// Created by [`Charset::mark`] and consumed by [`Charset::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    position: usize,
    state: u8,
}

pub trait Charset: Send {
    /// The canonical name of this encoding.
    fn name(&self) -> &'static str;

    /// Decode one character at the cursor of `buffer`.
    ///
    /// On success the cursor has advanced past exactly the bytes of that character.
    /// On failure the cursor is unchanged.
    fn decode(&mut self, buffer: &mut ByteBuffer) -> Result<char, DecodeError>;

    /// Append the encoding of `c` to `buffer`.
    ///
    /// Returns `false` and writes nothing if the buffer cannot hold the whole sequence.
    fn encode(&mut self, buffer: &mut ByteBuffer, c: char) -> bool;

    /// The number of bytes `c` occupies in this encoding.
    fn size(&self, c: char) -> usize;

    /// Check if `c` can be encoded without substitution.
    fn is_valid(&self, c: char) -> bool {
        let _ = c;
        true
    }

    /// Stream state that must survive a [`Charset::reset`].
    ///
    /// Stateless codecs keep the default.
    fn save_state(&self) -> u8 {
        0
    }
    fn restore_state(&mut self, state: u8) {
        let _ = state;
    }

    fn mark(&self, buffer: &ByteBuffer) -> Mark {
        Mark {
            position: buffer.position(),
            state: self.save_state(),
        }
    }

    fn reset(&mut self, buffer: &mut ByteBuffer, mark: Mark) {
        buffer.set_position(mark.position);
        self.restore_state(mark.state);
    }

    /// Decode the next character without consuming it.
    fn peek(&mut self, buffer: &mut ByteBuffer) -> Result<char, DecodeError> {
        let mark = self.mark(buffer);
        let ret = self.decode(buffer);
        self.reset(buffer, mark);
        ret
    }

    /// Check if a whole character is available at the cursor.
    fn has_character(&mut self, buffer: &mut ByteBuffer) -> bool {
        self.peek(buffer).is_ok()
    }

    /// Check if `count` whole characters are available at the cursor.
    fn has_characters(&mut self, buffer: &mut ByteBuffer, count: usize) -> bool {
        let mark = self.mark(buffer);
        let ret = (0..count).all(|_| self.decode(buffer).is_ok());
        self.reset(buffer, mark);
        ret
    }

    /// The number of bytes `s` occupies in this encoding.
    fn size_of(&self, s: &str) -> usize {
        s.chars().map(|c| self.size(c)).sum()
    }

    /// Read exactly `count` characters, or nothing at all.
    fn read(&mut self, buffer: &mut ByteBuffer, count: usize) -> Result<String, DecodeError> {
        let mark = self.mark(buffer);
        let mut ret = String::with_capacity(count);
        for _ in 0..count {
            match self.decode(buffer) {
                Ok(c) => ret.push(c),
                Err(err) => {
                    self.reset(buffer, mark);
                    return Err(err);
                }
            }
        }
        Ok(ret)
    }

    /// Decode `count` characters without consuming them.
    fn peek_str(&mut self, buffer: &mut ByteBuffer, count: usize) -> Result<String, DecodeError> {
        let mark = self.mark(buffer);
        let ret = self.read(buffer, count);
        self.reset(buffer, mark);
        ret
    }

    /// Consume `expected` if the buffer continues with exactly these characters.
    ///
    /// Returns `false` and leaves the cursor unchanged otherwise.
    fn skip(&mut self, buffer: &mut ByteBuffer, expected: &str) -> bool {
        let mark = self.mark(buffer);
        for e in expected.chars() {
            if self.decode(buffer) != Ok(e) {
                self.reset(buffer, mark);
                return false;
            }
        }
        true
    }

    /// Encode as many leading characters of `s` as fit into `buffer`.
    ///
    /// Returns the number of characters written.
    fn write(&mut self, buffer: &mut ByteBuffer, s: &str) -> usize {
        s.chars().take_while(|&c| self.encode(buffer, c)).count()
    }
}

/// Supported encodings.
///
/// Encoding names are listed in lexical order.
pub const SUPPORTED_CHARSETS: &[&str] = &[
    ISO_8859_1_NAME,
    US_ASCII_NAME,
    UTF16_NAME,
    UTF16BE_NAME,
    UTF16LE_NAME,
    UTF8_NAME,
];

/// Manage aliases for encoding names.
pub static CHARSET_ALIASES: LazyLock<RwLock<BTreeMap<Cow<'static, str>, &'static str>>> =
    LazyLock::new(|| {
        // To perform case-insensitive comparisons, capitalize all aliases.
        RwLock::new(BTreeMap::from([
            ("UTF_8".into(), UTF8_NAME),
            ("UTF8".into(), UTF8_NAME),
            ("UNICODE-1-1-UTF-8".into(), UTF8_NAME),
            ("UTF_16".into(), UTF16_NAME),
            ("UTF16".into(), UTF16_NAME),
            ("UNICODE".into(), UTF16_NAME),
            ("UNICODEBIG".into(), UTF16_NAME),
            ("UTF_16BE".into(), UTF16BE_NAME),
            ("UTF16BE".into(), UTF16BE_NAME),
            ("X-UTF-16BE".into(), UTF16BE_NAME),
            ("ISO-10646-UCS-2".into(), UTF16BE_NAME),
            ("UNICODEBIGUNMARKED".into(), UTF16BE_NAME),
            ("UTF_16LE".into(), UTF16LE_NAME),
            ("UTF16LE".into(), UTF16LE_NAME),
            ("X-UTF-16LE".into(), UTF16LE_NAME),
            ("UNICODELITTLEUNMARKED".into(), UTF16LE_NAME),
            ("ISO-IR-100".into(), ISO_8859_1_NAME),
            ("ISO_8859-1".into(), ISO_8859_1_NAME),
            ("ISO_8859-1:1987".into(), ISO_8859_1_NAME),
            ("ISO_8859_1".into(), ISO_8859_1_NAME),
            ("ISO8859_1".into(), ISO_8859_1_NAME),
            ("ISO8859-1".into(), ISO_8859_1_NAME),
            ("8859_1".into(), ISO_8859_1_NAME),
            ("LATIN1".into(), ISO_8859_1_NAME),
            ("L1".into(), ISO_8859_1_NAME),
            ("IBM819".into(), ISO_8859_1_NAME),
            ("IBM-819".into(), ISO_8859_1_NAME),
            ("CP819".into(), ISO_8859_1_NAME),
            ("819".into(), ISO_8859_1_NAME),
            ("CSISOLATIN1".into(), ISO_8859_1_NAME),
            ("US_ASCII".into(), US_ASCII_NAME),
            ("ISO-IR-6".into(), US_ASCII_NAME),
            ("ANSI_X3.4-1968".into(), US_ASCII_NAME),
            ("ANSI_X3.4-1986".into(), US_ASCII_NAME),
            ("ISO_646.IRV:1983".into(), US_ASCII_NAME),
            ("ISO_646.IRV:1991".into(), US_ASCII_NAME),
            ("ISO646-US".into(), US_ASCII_NAME),
            ("US".into(), US_ASCII_NAME),
            ("IBM367".into(), US_ASCII_NAME),
            ("CP367".into(), US_ASCII_NAME),
            ("CSASCII".into(), US_ASCII_NAME),
            ("ASCII".into(), US_ASCII_NAME),
            ("ASCII7".into(), US_ASCII_NAME),
            ("646".into(), US_ASCII_NAME),
            ("DEFAULT".into(), US_ASCII_NAME),
        ]))
    });

/// Register `alias` as an alias for the encoding name `real`.  \
/// If `alias` is already an alias for another encoding name, overwrite it and return
/// the encoding name before the overwrite.
///
/// Aliases do not redirect multiple times, so `real` must be a name registered with
/// [`register_charset`] or one of [`SUPPORTED_CHARSETS`].
pub fn register_charset_alias(alias: &'static str, real: &'static str) -> Option<&'static str> {
    let mut table = CHARSET_ALIASES
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if alias.chars().all(|c| !c.is_ascii_lowercase()) {
        table.insert(alias.into(), real)
    } else {
        table.insert(alias.to_ascii_uppercase().into(), real)
    }
}

/// Unregister `alias` if it is registerd as an alias for an encoding name.  \
/// If successfully removed, return the real name.
pub fn unregister_charset_alias(alias: &str) -> Option<&'static str> {
    CHARSET_ALIASES
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .remove(alias.to_ascii_uppercase().as_str())
}

/// Retrieve the encoding name from `alias`.  \
/// If retrieval fails, returns [`None`].
///
/// Alias comparisons are case-insensitive.
pub fn resolve_charset_alias(alias: &str) -> Option<&'static str> {
    let aliases = CHARSET_ALIASES
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    aliases
        .get(alias)
        .or_else(|| aliases.get(alias.to_ascii_uppercase().as_str()))
        .copied()
}

pub type CharsetFactory = fn() -> Box<dyn Charset>;
pub static CHARSET_TABLE: LazyLock<RwLock<BTreeMap<&'static str, CharsetFactory>>> =
    LazyLock::new(|| {
        let mut map = BTreeMap::<&'static str, CharsetFactory>::new();
        map.insert(UTF8_NAME, || Box::new(UTF8));
        map.insert(UTF16_NAME, || Box::new(UTF16::default()));
        map.insert(UTF16BE_NAME, || Box::new(UTF16BE));
        map.insert(UTF16LE_NAME, || Box::new(UTF16LE));
        map.insert(ISO_8859_1_NAME, || Box::new(ISO8859_1));
        map.insert(US_ASCII_NAME, || Box::new(USASCII));
        RwLock::new(map)
    });

/// Return the registered name of the encoding called `name`, following aliases.
pub fn canonical_name(name: &str) -> Option<&'static str> {
    let table = CHARSET_TABLE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some((&real, _)) = table.get_key_value(name) {
        return Some(real);
    }
    if let Some((&real, _)) = table.get_key_value(name.to_ascii_uppercase().as_str()) {
        return Some(real);
    }
    let alias = resolve_charset_alias(name)?;
    table.get_key_value(alias).map(|(&real, _)| real)
}

/// Create a fresh codec for the encoding called `name`.
///
/// Each call returns a new instance, so the stream state of stateful codecs
/// (for example the byte order of [`UTF16`]) is never shared.
pub fn find_charset(name: &str) -> Option<Box<dyn Charset>> {
    let real = canonical_name(name)?;
    let table = CHARSET_TABLE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    table.get(real).map(|factory| factory())
}

pub fn register_charset(name: &'static str, factory: CharsetFactory) -> Option<CharsetFactory> {
    CHARSET_TABLE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(name, factory)
}

pub fn unregister_charset(name: &str) -> Option<CharsetFactory> {
    CHARSET_TABLE
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .remove(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(name: &str, text: &str) {
        let mut codec = find_charset(name).unwrap();
        let mut buffer = ByteBuffer::new();
        assert_eq!(codec.write(&mut buffer, text), text.chars().count());
        assert_eq!(buffer.len(), codec.size_of(text));

        let mut codec = find_charset(name).unwrap();
        let mut decoded = String::new();
        while let Ok(c) = codec.decode(&mut buffer) {
            decoded.push(c);
        }
        assert_eq!(decoded, text);
        assert!(!buffer.has_remaining());
    }

    #[test]
    fn encode_then_decode_tests() {
        round_trip("US-ASCII", "<stream to='example.com'/>");
        round_trip("ISO-8859-1", "caf\u{E9} \u{A0}\u{FF}");
        round_trip("UTF-8", "x\u{E9}\u{3042}\u{1F600}");
        round_trip("UTF-16", "x\u{E9}\u{3042}\u{1F600}");
        round_trip("UTF-16BE", "x\u{E9}\u{3042}\u{1F600}");
        round_trip("UTF-16LE", "x\u{E9}\u{3042}\u{1F600}");
    }

    #[test]
    fn alias_lookup_tests() {
        assert_eq!(canonical_name("utf-8"), Some(UTF8_NAME));
        assert_eq!(canonical_name("unicode-1-1-utf-8"), Some(UTF8_NAME));
        assert_eq!(canonical_name("Latin1"), Some(ISO_8859_1_NAME));
        assert_eq!(canonical_name("646"), Some(US_ASCII_NAME));
        assert_eq!(canonical_name("UnicodeBig"), Some(UTF16_NAME));
        assert_eq!(canonical_name("UnicodeLittleUnmarked"), Some(UTF16LE_NAME));
        assert_eq!(canonical_name("EBCDIC-CP-US"), None);
        assert!(find_charset("x-unknown").is_none());

        assert_eq!(register_charset_alias("my-latin", ISO_8859_1_NAME), None);
        assert_eq!(find_charset("MY-LATIN").unwrap().name(), ISO_8859_1_NAME);
        assert_eq!(unregister_charset_alias("my-latin"), Some(ISO_8859_1_NAME));
        assert!(find_charset("my-latin").is_none());
    }

    #[test]
    fn bulk_operation_tests() {
        let mut codec = find_charset("UTF-8").unwrap();
        let mut buffer = ByteBuffer::from("<![CDATA[\u{3042}".as_bytes());
        assert!(codec.has_characters(&mut buffer, 10));
        assert!(!codec.has_characters(&mut buffer, 11));
        assert_eq!(codec.peek_str(&mut buffer, 3).unwrap(), "<![");
        assert_eq!(buffer.position(), 0);
        assert!(!codec.skip(&mut buffer, "<!--"));
        assert_eq!(buffer.position(), 0);
        assert!(codec.skip(&mut buffer, "<![CDATA["));
        assert_eq!(codec.read(&mut buffer, 2), Err(DecodeError::NotEnoughData));
        assert_eq!(buffer.position(), 9);
        assert_eq!(codec.read(&mut buffer, 1).unwrap(), "\u{3042}");

        let mut out = ByteBuffer::with_capacity(4);
        assert_eq!(codec.write(&mut out, "ab\u{3042}c"), 2);
        assert_eq!(out.as_bytes(), b"ab");
    }
}
