use nioxml::{
    XMLVersion,
    charset::{ByteBuffer, Charset, UTF16BE, UTF16LE},
    error::XMLError,
    sax::{handler::DebugHandler, parser::XMLReaderBuilder, source::InputSource},
};
use pretty_assertions::assert_eq;

fn parse_bytes(source: &mut InputSource, chunks: &[&[u8]]) -> (String, Result<(), XMLError>) {
    let mut reader = XMLReaderBuilder::new()
        .set_handler(DebugHandler::default())
        .build();
    reader.start_document().unwrap();
    let mut parsed = Ok(());
    for chunk in chunks {
        source.feed(chunk);
        parsed = reader.parse(source);
        if parsed.is_err() {
            break;
        }
    }
    let ended = reader.end_document();
    (reader.handler.buffer, parsed.and(ended))
}

fn parse(document: &str) -> (String, Result<(), XMLError>) {
    parse_bytes(&mut InputSource::new(), &[document.as_bytes()])
}

#[test]
fn declaration_tests() {
    let (buffer, ret) = parse("<?xml version=\"1.0\"?><a/>");
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
declaration(Some("1.0"), None, false)
startElement(None, a, a)
endElement(None, a, a)
endDocument()
"#
    );

    let (buffer, ret) =
        parse("<?xml version='1.0' encoding='utf-8' standalone='yes' ?>\n<!--c--><a/>");
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
declaration(Some("1.0"), Some("utf-8"), true)
comment(c)
startElement(None, a, a)
endElement(None, a, a)
endDocument()
"#
    );

    let (buffer, ret) = parse("  <?xml standalone = \"no\" version = '1.0'?><a/>");
    ret.unwrap();
    assert!(buffer.contains("declaration(Some(\"1.0\"), None, false)\n"));

    // version is optional
    let (buffer, ret) = parse("<?xml standalone='yes'?><a/>");
    ret.unwrap();
    assert!(buffer.contains("declaration(None, None, true)\n"));
    let (buffer, ret) = parse("<?xml encoding='ISO-8859-1'?><a/>");
    ret.unwrap();
    assert!(buffer.contains("declaration(None, Some(\"ISO-8859-1\"), false)\n"));

    let (buffer, ret) = parse("<?xml-stylesheet href='a.xsl'?><a/>");
    ret.unwrap();
    assert!(buffer.contains("processingInstruction(xml-stylesheet, Some(\"href='a.xsl'\"))\n"));
}

#[test]
fn invalid_declaration_tests() {
    for (document, error) in [
        (
            "<?xml version='1.0' standalone='maybe'?><a/>",
            XMLError::ParserInvalidSDDecl,
        ),
        (
            "<?xml version='1.0' encoding='x-unknown'?><a/>",
            XMLError::ParserUnsupportedEncoding,
        ),
        (
            "<?xml version='1.0' version='1.0'?><a/>",
            XMLError::ParserInvalidXMLDecl,
        ),
        ("<?xml foo='bar'?><a/>", XMLError::ParserInvalidXMLDecl),
        ("<?xml version='1.0'<a/>", XMLError::ParserInvalidXMLDecl),
        ("<?xml version=1.0?><a/>", XMLError::ParserInvalidXMLDecl),
        ("<?xml version='abc'?><a/>", XMLError::ParserInvalidXMLVersion),
        ("<?xml version='1.'?><a/>", XMLError::ParserInvalidXMLVersion),
        ("<?xml version='2.0'?><a/>", XMLError::ParserInvalidXMLVersion),
        ("<!--c--><?xml version='1.0'?><a/>", XMLError::ParserInvalidXMLDecl),
        ("<a/><?xml version='1.0'?>", XMLError::ParserInvalidXMLDecl),
        ("<a><?xml version='1.0'?></a>", XMLError::ParserInvalidXMLDecl),
        (
            "<?xml version='1.0'?><?xml version='1.0'?><a/>",
            XMLError::ParserInvalidXMLDecl,
        ),
    ] {
        assert_eq!(parse(document).1, Err(error), "{document}");
    }
}

#[test]
fn version_tests() {
    let mut reader = XMLReaderBuilder::new().build();
    let mut source = InputSource::new();
    reader.start_document().unwrap();
    source.feed(b"<?xml version='1.1'?><a/>");
    reader.parse(&mut source).unwrap();
    assert_eq!(reader.version(), XMLVersion::XML11);
    reader.end_document().unwrap();

    reader.start_document().unwrap();
    assert_eq!(reader.version(), XMLVersion::XML10);
    reader.end_document().unwrap_err();

    // later 1.x versions are accepted
    reader.start_document().unwrap();
    let mut source = InputSource::new();
    source.feed(b"<?xml version='1.10'?><a/>");
    reader.parse(&mut source).unwrap();
    assert_eq!(reader.version(), XMLVersion::Unknown);
    reader.end_document().unwrap();
}

#[test]
fn encoding_switch_tests() {
    let bytes = b"<?xml version='1.0' encoding='ISO-8859-1'?><a>\xE9</a>";
    let expected = r#"startDocument()
declaration(Some("1.0"), Some("ISO-8859-1"), false)
startElement(None, a, a)
characters(é)
endElement(None, a, a)
endDocument()
"#;
    for i in 0..=bytes.len() {
        let (front, back) = bytes.split_at(i);
        let mut source = InputSource::new();
        let (buffer, ret) = parse_bytes(&mut source, &[front, back]);
        ret.unwrap();
        assert_eq!(buffer, expected, "split at {i}");
        assert_eq!(source.charset_name(), "ISO-8859-1");
    }

    // Without the declaration the same byte is not UTF-8.
    let (_, ret) = parse_bytes(&mut InputSource::new(), &[&b"<a>\xE9</a>"[..]]);
    assert!(matches!(ret, Err(XMLError::DecodeError(_))));
}

#[test]
fn utf16_declaration_tests() {
    let document = "<?xml version='1.0' encoding='UTF-16LE'?><a>\u{3042}</a>";
    let mut charset = UTF16LE;
    let mut buffer = ByteBuffer::from(vec![0xFF, 0xFE]);
    charset.write(&mut buffer, document);
    let bytes = buffer.into_inner();

    let mut source = InputSource::with_charset_name("UTF-16").unwrap();
    let (buffer, ret) = parse_bytes(&mut source, &[bytes.as_slice()]);
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
declaration(Some("1.0"), Some("UTF-16LE"), false)
startElement(None, a, a)
characters(あ)
endElement(None, a, a)
endDocument()
"#
    );
    assert_eq!(source.charset_name(), "UTF-16LE");

    // A declaration naming the active codec keeps it.
    let mut source = InputSource::new();
    let (_, ret) = parse_bytes(
        &mut source,
        &[&b"<?xml version='1.0' encoding='utf8'?><a/>"[..]],
    );
    ret.unwrap();
    assert_eq!(source.charset_name(), "UTF-8");
}

#[test]
fn switch_to_utf16_tests() {
    let mut bytes = b"<?xml version='1.1' encoding='UTF-16'?>".to_vec();
    let mut buffer = ByteBuffer::new();
    UTF16BE.write(&mut buffer, "<a>\u{1F600}</a>");
    bytes.extend(buffer.into_inner());

    let expected = r#"startDocument()
declaration(Some("1.1"), Some("UTF-16"), false)
startElement(None, a, a)
characters(😀)
endElement(None, a, a)
endDocument()
"#;
    for i in 0..=bytes.len() {
        let (front, back) = bytes.split_at(i);
        let mut source = InputSource::new();
        let (buffer, ret) = parse_bytes(&mut source, &[front, back]);
        ret.unwrap();
        assert_eq!(buffer, expected, "split at {i}");
        assert_eq!(source.charset_name(), "UTF-16");
    }
}
