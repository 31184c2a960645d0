use crate::{
    error::XMLError,
    parse::{Accumulator, Context, Transition},
    sax::{error::fatal_error, handler::SAXHandler, namespace::NamespaceResolver},
};

const CDATA_START: &str = "CDATA[";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkupState {
    /// After `<!`.
    Start,
    /// After `<!-`.
    CommentStart,
    /// After `<![` and the first `n` characters of `CDATA[`.
    CDataStart(usize),
    Comment,
    CommentDash,
    CommentDashDash,
    CData,
    CDataBracket,
    CDataBracketBracket,
}

/// Comments and CDATA sections, that is, everything starting with `<!`.
#[derive(Debug)]
pub(crate) struct MarkupFrame {
    state: MarkupState,
    in_element: bool,
}

impl MarkupFrame {
    pub(crate) fn new(in_element: bool) -> Self {
        Self {
            state: MarkupState::Start,
            in_element,
        }
    }

    /// ```text
    /// [15] Comment ::= '<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'
    /// [18] CDSect  ::= CDStart CData CDEnd
    /// [19] CDStart ::= '<![CDATA['
    /// [20] CData   ::= (Char* - (Char* ']]>' Char*))
    /// [21] CDEnd   ::= ']]>'
    /// ```
    pub(crate) fn step<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        acc: &mut Accumulator,
        ctx: &mut Context<'_, H, N>,
        c: char,
    ) -> Result<Transition, XMLError> {
        match self.state {
            MarkupState::Start => match c {
                '-' => self.state = MarkupState::CommentStart,
                '[' if self.in_element => self.state = MarkupState::CDataStart(0),
                '[' => {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserUnexpectedDocumentContent,
                        ctx.locator,
                        "CDATA sections are not allowed outside of the root element"
                    ));
                }
                'D' => {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserUnsupportedDoctype,
                        ctx.locator,
                        "document type declarations are not supported"
                    ));
                }
                c => {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidCharacter,
                        ctx.locator,
                        "character '{}' cannot follow '<!'",
                        c
                    ));
                }
            },
            MarkupState::CommentStart => {
                if c != '-' {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidComment,
                        ctx.locator,
                        "a comment must start with '<!--'"
                    ));
                }
                self.state = MarkupState::Comment;
            }
            MarkupState::CDataStart(read) => {
                if CDATA_START[read..].chars().next() != Some(c) {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidCharacter,
                        ctx.locator,
                        "a CDATA section must start with '<![CDATA['"
                    ));
                }
                if read + 1 == CDATA_START.len() {
                    ctx.handler.start_cdata();
                    self.state = MarkupState::CData;
                } else {
                    self.state = MarkupState::CDataStart(read + 1);
                }
            }
            MarkupState::Comment => {
                if c == '-' {
                    self.state = MarkupState::CommentDash;
                } else {
                    acc.push(c);
                }
            }
            MarkupState::CommentDash => {
                if c == '-' {
                    self.state = MarkupState::CommentDashDash;
                } else {
                    acc.push('-');
                    acc.push(c);
                    self.state = MarkupState::Comment;
                }
            }
            MarkupState::CommentDashDash => match c {
                '>' => {
                    ctx.handler.comment(acc.as_str());
                    acc.take();
                    return Ok(Transition::Finish);
                }
                // `--->` still closes the comment with a trailing '-' in its content.
                '-' => acc.push('-'),
                _ => {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidComment,
                        ctx.locator,
                        "'--' is not allowed in a comment"
                    ));
                }
            },
            MarkupState::CData => {
                if c == ']' {
                    self.state = MarkupState::CDataBracket;
                } else {
                    acc.push(c);
                }
            }
            MarkupState::CDataBracket => {
                if c == ']' {
                    self.state = MarkupState::CDataBracketBracket;
                } else {
                    acc.push(']');
                    acc.push(c);
                    self.state = MarkupState::CData;
                }
            }
            MarkupState::CDataBracketBracket => match c {
                '>' => {
                    if !acc.is_empty() {
                        ctx.handler.characters(acc.as_str());
                        acc.take();
                    }
                    ctx.handler.end_cdata();
                    return Ok(Transition::Finish);
                }
                ']' => acc.push(']'),
                c => {
                    acc.push_str("]]");
                    acc.push(c);
                    self.state = MarkupState::CData;
                }
            },
        }
        Ok(Transition::Continue)
    }
}
