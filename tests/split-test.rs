use nioxml::{
    charset::{ByteBuffer, Charset, UTF16, find_charset},
    sax::{handler::DebugHandler, parser::XMLReaderBuilder, source::InputSource},
};
use pretty_assertions::assert_eq;

const DOCUMENT: &str = "<a b='\u{3042}&amp;'><c/>t\u{EB}xt\u{1F600}<![CDATA[]]]]><!--x--></a>";
const EXPECTED: &str = r#"startDocument()
startElement(None, a, a, b='あ&')
startElement(None, c, c)
endElement(None, c, c)
characters(tëxt😀)
startCDATA()
characters(]])
endCDATA()
comment(x)
endElement(None, a, a)
endDocument()
"#;

fn encode(charset: &mut dyn Charset, document: &str) -> Vec<u8> {
    let mut buffer = ByteBuffer::new();
    assert_eq!(
        charset.write(&mut buffer, document),
        document.chars().count()
    );
    buffer.into_inner()
}

/// Feed `chunks` one after another and return the recorded events.
fn parse_chunks<'a>(encoding: &str, chunks: impl IntoIterator<Item = &'a [u8]>) -> String {
    let mut reader = XMLReaderBuilder::new()
        .set_handler(DebugHandler::default())
        .build();
    let mut source = InputSource::with_charset_name(encoding).unwrap();
    reader.start_document().unwrap();
    for chunk in chunks {
        source.feed(chunk);
        reader.parse(&mut source).unwrap();
    }
    reader.end_document().unwrap();
    reader.handler.buffer
}

fn check_every_split(encoding: &str, bytes: &[u8], expected: &str) {
    assert_eq!(parse_chunks(encoding, [bytes]), expected);
    for i in 0..=bytes.len() {
        let (front, back) = bytes.split_at(i);
        assert_eq!(
            parse_chunks(encoding, [front, back]),
            expected,
            "{encoding}: split at {i}"
        );
    }
    assert_eq!(parse_chunks(encoding, bytes.chunks(1)), expected);
}

#[test]
fn utf8_split_tests() {
    check_every_split("UTF-8", DOCUMENT.as_bytes(), EXPECTED);
}

#[test]
fn utf16_split_tests() {
    for encoding in ["UTF-16BE", "UTF-16LE"] {
        let Some(mut charset) = find_charset(encoding) else {
            panic!("{encoding} is not registered");
        };
        let bytes = encode(charset.as_mut(), DOCUMENT);
        check_every_split(encoding, &bytes, EXPECTED);
    }

    let mut utf16 = UTF16::default();
    assert!(utf16.set_requires_bom(true));
    let bytes = encode(&mut utf16, DOCUMENT);
    assert_eq!(&bytes[..2], [0xFE, 0xFF]);
    check_every_split("UTF-16", &bytes, EXPECTED);

    // little endian is detected from the byte order mark
    let mut charset = find_charset("UTF-16LE").unwrap();
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(encode(charset.as_mut(), DOCUMENT));
    check_every_split("UTF-16", &bytes, EXPECTED);
}

#[test]
fn single_byte_split_tests() {
    let document = "<a b='&#x3042;&amp;'><c/>t\u{EB}xt&#x1F600;<![CDATA[]]]]><!--x--></a>";
    let mut charset = find_charset("ISO-8859-1").unwrap();
    let bytes = encode(charset.as_mut(), document);
    check_every_split("ISO-8859-1", &bytes, EXPECTED);

    let document = "<a b='&#x3042;&amp;'><c/>t&#235;xt&#x1F600;<![CDATA[]]]]><!--x--></a>";
    check_every_split("US-ASCII", document.as_bytes(), EXPECTED);
}

#[test]
fn line_ending_split_tests() {
    let bytes = b"<a>x\r\ny\rz\r\r\n</a>";
    let expected = "startDocument()\nstartElement(None, a, a)\ncharacters(x\ny\nz\n\n)\nendElement(None, a, a)\nendDocument()\n";
    check_every_split("UTF-8", bytes, expected);
}

#[test]
fn xmpp_stream_split_tests() {
    let document = "<?xml version='1.0'?>\
<stream:stream xmlns='jabber:client' xmlns:stream='http://etherx.jabber.org/streams' to='example.com'>\
<message to='juliet@example.com'><body>O Romeo, Romeo! wherefore art thou Romeo?</body></message>\
<presence/></stream:stream>";
    let whole = parse_chunks("UTF-8", [document.as_bytes()]);
    assert!(whole.contains("characters(O Romeo, Romeo! wherefore art thou Romeo?)\n"));
    assert!(whole.ends_with("endPrefixMapping(None)\nendPrefixMapping(Some(\"stream\"))\nendDocument()\n"));
    assert_eq!(parse_chunks("UTF-8", document.as_bytes().chunks(1)), whole);
    assert_eq!(parse_chunks("UTF-8", document.as_bytes().chunks(7)), whole);
}
