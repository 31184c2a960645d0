use nioxml::{
    CHARDATA_CHUNK_LENGTH,
    error::XMLError,
    sax::{
        error::SAXParseError,
        handler::{DebugHandler, SAXHandler},
        parser::{ParserConfig, ParserOption, ParserState, XMLReaderBuilder},
        source::InputSource,
    },
};
use pretty_assertions::assert_eq;

fn parse_with_config(document: &[u8], config: ParserConfig) -> (String, Result<(), XMLError>) {
    let mut reader = XMLReaderBuilder::new()
        .set_handler(DebugHandler::default())
        .set_config(config)
        .build();
    let mut source = InputSource::new();
    reader.start_document().unwrap();
    source.feed(document);
    let parsed = reader.parse(&mut source);
    let ended = reader.end_document();
    (reader.handler.buffer, parsed.and(ended))
}

fn parse(document: &str) -> (String, Result<(), XMLError>) {
    parse_with_config(document.as_bytes(), ParserConfig::default())
}

fn parse_error(document: &str) -> XMLError {
    parse(document).1.unwrap_err()
}

#[test]
fn empty_element_tests() {
    let (buffer, ret) = parse("<stream/>");
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
startElement(None, stream, stream)
endElement(None, stream, stream)
endDocument()
"#
    );
}

#[test]
fn content_tests() {
    let (buffer, ret) = parse(
        "<a x='1' y=\"2\"><b>hi</b> &lt;ok&gt; &#x41;&#66;&amp;&apos;&quot;<c\n/></a >",
    );
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
startElement(None, a, a, x='1', y='2')
startElement(None, b, b)
characters(hi)
endElement(None, b, b)
characters( <ok> AB&'")
startElement(None, c, c)
endElement(None, c, c)
endElement(None, a, a)
endDocument()
"#
    );
}

#[test]
fn attribute_tests() {
    let (buffer, ret) = parse("<a b = 'x&amp;y' c=\"1\n2\t3\"d='&#60;'/>");
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
startElement(None, a, a, b='x&y', c='1 2 3', d='<')
endElement(None, a, a)
endDocument()
"#
    );

    assert_eq!(parse_error("<a b='<'/>"), XMLError::ParserInvalidCharacter);
    assert_eq!(parse_error("<a b=1/>"), XMLError::ParserInvalidCharacter);
    assert_eq!(parse_error("<a b/>"), XMLError::ParserInvalidCharacter);
    assert_eq!(
        parse_error("<a b='1' b='2'/>"),
        XMLError::ParserDuplicateAttributes
    );
}

#[test]
fn comment_tests() {
    let (buffer, ret) = parse("<!-- head -> --><a><!-- c - d --><!-- e ---><!----></a><!--tail-->");
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
comment( head -> )
startElement(None, a, a)
comment( c - d )
comment( e -)
comment()
endElement(None, a, a)
comment(tail)
endDocument()
"#
    );

    assert_eq!(
        parse_error("<a><!-- a -- b --></a>"),
        XMLError::ParserInvalidComment
    );
    assert_eq!(parse_error("<a><!-x--></a>"), XMLError::ParserInvalidComment);
}

#[test]
fn cdata_tests() {
    let (buffer, ret) = parse("<a>t<![CDATA[x]y]]z]]]>u<![CDATA[]]><![CDATA[<&>]]></a>");
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
startElement(None, a, a)
characters(t)
startCDATA()
characters(x]y]]z])
endCDATA()
characters(u)
startCDATA()
endCDATA()
startCDATA()
characters(<&>)
endCDATA()
endElement(None, a, a)
endDocument()
"#
    );

    assert_eq!(
        parse_error("<![CDATA[x]]><a/>"),
        XMLError::ParserUnexpectedDocumentContent
    );
    assert_eq!(
        parse_error("<a><![CDATX[x]]></a>"),
        XMLError::ParserInvalidCharacter
    );
}

#[test]
fn processing_instruction_tests() {
    let (buffer, ret) = parse("<?target data here?><a><?p?><?q  x?y ??></a>");
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
processingInstruction(target, Some("data here"))
startElement(None, a, a)
processingInstruction(p, None)
processingInstruction(q, Some("x?y ?"))
endElement(None, a, a)
endDocument()
"#
    );

    assert_eq!(parse_error("<a><?p-x></a>"), XMLError::ParserInvalidCharacter);
    assert_eq!(parse_error("<?DOCTYPE a?><a/>"), XMLError::ParserUnsupportedDoctype);
}

#[test]
fn reference_tests() {
    assert_eq!(
        parse_error("<a>&foo;</a>"),
        XMLError::ParserUndeclaredEntityReference
    );
    assert_eq!(
        parse_error("<a>&#0;</a>"),
        XMLError::ParserInvalidCharacterReference
    );
    assert_eq!(
        parse_error("<a>&#xZ;</a>"),
        XMLError::ParserInvalidCharacterReference
    );
    assert_eq!(
        parse_error("<a>&#;</a>"),
        XMLError::ParserInvalidCharacterReference
    );
    assert_eq!(parse_error("<a>& </a>"), XMLError::ParserInvalidCharacter);
    assert_eq!(parse_error("<a>&;</a>"), XMLError::ParserInvalidCharacter);
}

#[test]
fn structure_tests() {
    let (buffer, ret) = parse("<a></b>");
    assert_eq!(ret, Err(XMLError::ParserMismatchElementType));
    assert_eq!(
        buffer,
        r#"startDocument()
startElement(None, a, a)
fatalError(ParserMismatchElementType)
endDocument()
"#
    );

    assert_eq!(
        parse_error("<a/><b/>"),
        XMLError::ParserUnexpectedDocumentContent
    );
    assert_eq!(parse_error("<a/>x"), XMLError::ParserInvalidCharacter);
    assert_eq!(parse_error("x<a/>"), XMLError::ParserInvalidCharacter);
    assert_eq!(parse_error("<!DOCTYPE a><a/>"), XMLError::ParserUnsupportedDoctype);
    assert_eq!(parse_error("< a/>"), XMLError::ParserInvalidCharacter);
    assert_eq!(parse_error("<a>\u{1}</a>"), XMLError::ParserInvalidCharacter);

    let (buffer, ret) = parse_with_config(
        b"<a/> <b>x</b>",
        ParserConfig::default() | ParserOption::MultipleRoots,
    );
    ret.unwrap();
    assert_eq!(
        buffer,
        r#"startDocument()
startElement(None, a, a)
endElement(None, a, a)
startElement(None, b, b)
characters(x)
endElement(None, b, b)
endDocument()
"#
    );
}

#[test]
fn unexpected_eof_tests() {
    let (buffer, ret) = parse("<a><b>text");
    assert_eq!(ret, Err(XMLError::ParserUnexpectedEOF));
    assert_eq!(
        buffer,
        r#"startDocument()
startElement(None, a, a)
startElement(None, b, b)
fatalError(ParserUnexpectedEOF)
endDocument()
"#
    );

    assert_eq!(parse_error(""), XMLError::ParserUnexpectedEOF);
    assert_eq!(parse_error("<!-- c -->"), XMLError::ParserUnexpectedEOF);
    assert_eq!(parse_error("<a/><!-- c"), XMLError::ParserUnexpectedEOF);
    parse("\u{FEFF}<a/>\n").1.unwrap();
}

#[test]
fn sticky_error_tests() {
    let mut reader = XMLReaderBuilder::new()
        .set_handler(DebugHandler::default())
        .build();
    let mut source = InputSource::new();
    reader.start_document().unwrap();
    source.feed(b"<a></b>");
    assert_eq!(
        reader.parse(&mut source),
        Err(XMLError::ParserMismatchElementType)
    );
    assert_eq!(reader.state(), ParserState::FatalErrorOccurred);
    source.feed(b"<c/>");
    assert_eq!(
        reader.parse(&mut source),
        Err(XMLError::ParserMismatchElementType)
    );
    assert_eq!(
        reader.start_document(),
        Err(XMLError::ParserDocumentAlreadyStarted)
    );
    reader.end_document().unwrap();

    reader.handler.buffer.clear();
    let mut source = InputSource::new();
    reader.start_document().unwrap();
    source.feed(b"<c/>");
    reader.parse(&mut source).unwrap();
    reader.end_document().unwrap();
    assert_eq!(
        reader.handler.buffer,
        r#"startDocument()
startElement(None, c, c)
endElement(None, c, c)
endDocument()
"#
    );
}

#[test]
fn decode_error_tests() {
    let (buffer, ret) = parse_with_config(b"<a>\xFF</a>", ParserConfig::default());
    assert!(matches!(ret, Err(XMLError::DecodeError(_))));
    assert!(buffer.contains("fatalError(DecodeError(InvalidChar))"));
}

#[test]
fn chunked_characters_tests() {
    let text = "x".repeat(CHARDATA_CHUNK_LENGTH + 100);
    let (buffer, ret) = parse(&format!("<a>{text}</a>"));
    ret.unwrap();
    assert_eq!(
        buffer,
        format!(
            "startDocument()\nstartElement(None, a, a)\ncharacters({})\ncharacters({})\nendElement(None, a, a)\nendDocument()\n",
            "x".repeat(CHARDATA_CHUNK_LENGTH),
            "x".repeat(100)
        )
    );
}

#[derive(Default)]
struct ErrorCollector {
    errors: Vec<SAXParseError>,
}

impl SAXHandler for ErrorCollector {
    fn fatal_error(&mut self, error: SAXParseError) {
        self.errors.push(error);
    }
}

#[test]
fn locator_tests() {
    let mut reader = XMLReaderBuilder::new()
        .set_handler(ErrorCollector::default())
        .build();
    let mut source = InputSource::new();
    reader.start_document().unwrap();
    source.feed(b"<a>\r\n<b>\r</c>");
    assert_eq!(
        reader.parse(&mut source),
        Err(XMLError::ParserMismatchElementType)
    );
    let error = &reader.handler.errors[0];
    assert_eq!(error.error, XMLError::ParserMismatchElementType);
    assert_eq!((error.line, error.column), (3, 4));
    assert_eq!(reader.locator().line(), 3);
}
