use crate::{
    error::XMLError,
    parse::{Accumulator, Context, Frame, Transition, XMLDeclFrame},
    sax::{error::fatal_error, handler::SAXHandler, namespace::NamespaceResolver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PIState {
    Target,
    TargetCont,
    /// After `?` that directly follows the target.
    TargetQuery,
    /// Between the target and the data.
    Whitespace,
    Data,
    DataQuery,
}

#[derive(Debug)]
pub(crate) struct PIFrame {
    state: PIState,
    target: String,
    xml_decl_allowed: bool,
}

impl PIFrame {
    pub(crate) fn new(xml_decl_allowed: bool) -> Self {
        Self {
            state: PIState::Target,
            target: String::new(),
            xml_decl_allowed,
        }
    }

    /// ```text
    /// [16] PI       ::= '<?' PITarget (S (Char* - (Char* '?>' Char*)))? '?>'
    /// [17] PITarget ::= Name - (('X' | 'x') ('M' | 'm') ('L' | 'l'))
    /// ```
    pub(crate) fn step<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        acc: &mut Accumulator,
        ctx: &mut Context<'_, H, N>,
        c: char,
    ) -> Result<Transition, XMLError> {
        match self.state {
            PIState::Target => {
                if !ctx.is_name_start_char(c) {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidCharacter,
                        ctx.locator,
                        "character '{}' is not allowed at the start of a PI target",
                        c
                    ));
                }
                acc.push(c);
                self.state = PIState::TargetCont;
            }
            PIState::TargetCont => {
                if ctx.is_name_char(c) {
                    acc.push(c);
                    return Ok(Transition::Continue);
                }
                let query = c == '?';
                if !query && !ctx.is_whitespace(c) {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidCharacter,
                        ctx.locator,
                        "character '{}' is not allowed in a PI target",
                        c
                    ));
                }
                self.target = acc.take();
                if self.target.eq_ignore_ascii_case("xml") {
                    if !self.xml_decl_allowed {
                        return Err(fatal_error!(
                            ctx.handler,
                            ParserInvalidXMLDecl,
                            ctx.locator,
                            "an XML declaration is only allowed at the start of the document"
                        ));
                    }
                    return Ok(Transition::Replace(Frame::xml_declaration(
                        XMLDeclFrame::new(query),
                    )));
                }
                if self.target == "DOCTYPE" {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserUnsupportedDoctype,
                        ctx.locator,
                        "document type declarations are not supported"
                    ));
                }
                self.state = if query {
                    PIState::TargetQuery
                } else {
                    PIState::Whitespace
                };
            }
            PIState::TargetQuery => {
                if c != '>' {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidCharacter,
                        ctx.locator,
                        "a PI target must be followed by whitespace or '?>'"
                    ));
                }
                ctx.handler.processing_instruction(&self.target, None);
                return Ok(Transition::Finish);
            }
            PIState::Whitespace => {
                if c == '?' {
                    self.state = PIState::DataQuery;
                } else if !ctx.is_whitespace(c) {
                    acc.push(c);
                    self.state = PIState::Data;
                }
            }
            PIState::Data => {
                if c == '?' {
                    self.state = PIState::DataQuery;
                } else {
                    acc.push(c);
                }
            }
            PIState::DataQuery => match c {
                '>' => {
                    let data = acc.take();
                    let data = (!data.is_empty()).then_some(data.as_str());
                    ctx.handler.processing_instruction(&self.target, data);
                    return Ok(Transition::Finish);
                }
                '?' => acc.push('?'),
                c => {
                    acc.push('?');
                    acc.push(c);
                    self.state = PIState::Data;
                }
            },
        }
        Ok(Transition::Continue)
    }
}
