use crate::{
    XMLVersion,
    charset::{canonical_name, find_charset},
    error::XMLError,
    parse::{Accumulator, Context, Transition},
    sax::{error::fatal_error, handler::SAXHandler, namespace::NamespaceResolver},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XMLDeclState {
    /// Before a pseudo-attribute or `?>`.
    Start,
    Name,
    NameEnd,
    Equals,
    Value(char),
    /// After `?`.
    Query,
}

/// The XML declaration, taken over from a processing instruction whose target is `xml`.
#[derive(Debug)]
pub(crate) struct XMLDeclFrame {
    state: XMLDeclState,
    name: String,
    version: Option<String>,
    encoding: Option<String>,
    standalone: Option<bool>,
}

impl XMLDeclFrame {
    /// `query` is set if the target was directly followed by `?`.
    pub(crate) fn new(query: bool) -> Self {
        Self {
            state: if query {
                XMLDeclState::Query
            } else {
                XMLDeclState::Start
            },
            name: String::new(),
            version: None,
            encoding: None,
            standalone: None,
        }
    }

    /// ```text
    /// [23] XMLDecl      ::= '<?xml' VersionInfo EncodingDecl? SDDecl? S? '?>'
    /// [24] VersionInfo  ::= S 'version' Eq ("'" VersionNum "'" | '"' VersionNum '"')
    /// [25] Eq           ::= S? '=' S?
    /// [80] EncodingDecl ::= S 'encoding' Eq ('"' EncName '"' | "'" EncName "'" )
    /// [32] SDDecl       ::= S 'standalone' Eq (("'" ('yes' | 'no') "'") | ('"' ('yes' | 'no') '"'))
    /// ```
    pub(crate) fn step<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        acc: &mut Accumulator,
        ctx: &mut Context<'_, H, N>,
        c: char,
    ) -> Result<Transition, XMLError> {
        match self.state {
            XMLDeclState::Start => {
                if c == '?' {
                    self.state = XMLDeclState::Query;
                } else if ctx.is_name_start_char(c) {
                    acc.push(c);
                    self.state = XMLDeclState::Name;
                } else if !ctx.is_whitespace(c) {
                    return Err(invalid_decl(ctx, c));
                }
            }
            XMLDeclState::Name => {
                if ctx.is_name_char(c) {
                    acc.push(c);
                } else if c == '=' {
                    self.name = acc.take();
                    self.state = XMLDeclState::Equals;
                } else if ctx.is_whitespace(c) {
                    self.name = acc.take();
                    self.state = XMLDeclState::NameEnd;
                } else {
                    return Err(invalid_decl(ctx, c));
                }
            }
            XMLDeclState::NameEnd => {
                if c == '=' {
                    self.state = XMLDeclState::Equals;
                } else if !ctx.is_whitespace(c) {
                    return Err(invalid_decl(ctx, c));
                }
            }
            XMLDeclState::Equals => {
                if c == '\'' || c == '"' {
                    self.state = XMLDeclState::Value(c);
                } else if !ctx.is_whitespace(c) {
                    return Err(invalid_decl(ctx, c));
                }
            }
            XMLDeclState::Value(quote) => {
                if c == quote {
                    let value = acc.take();
                    self.assign(ctx, value)?;
                    self.state = XMLDeclState::Start;
                } else {
                    acc.push(c);
                }
            }
            XMLDeclState::Query => {
                if c != '>' {
                    return Err(invalid_decl(ctx, c));
                }
                self.finish(ctx)?;
                return Ok(Transition::Finish);
            }
        }
        Ok(Transition::Continue)
    }

    fn assign<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        ctx: &mut Context<'_, H, N>,
        value: String,
    ) -> Result<(), XMLError> {
        let duplicate = match self.name.as_str() {
            "version" => {
                if !is_version_num(&value) {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidXMLVersion,
                        ctx.locator,
                        "'{}' is not a valid version number",
                        value
                    ));
                }
                self.version.replace(value).is_some()
            }
            "encoding" => self.encoding.replace(value).is_some(),
            "standalone" => {
                let standalone = match value.as_str() {
                    "yes" => true,
                    "no" => false,
                    _ => {
                        return Err(fatal_error!(
                            ctx.handler,
                            ParserInvalidSDDecl,
                            ctx.locator,
                            "standalone must be 'yes' or 'no', but found '{}'",
                            value
                        ));
                    }
                };
                self.standalone.replace(standalone).is_some()
            }
            name => {
                return Err(fatal_error!(
                    ctx.handler,
                    ParserInvalidXMLDecl,
                    ctx.locator,
                    "'{}' is not allowed in an XML declaration",
                    name
                ));
            }
        };
        if duplicate {
            return Err(fatal_error!(
                ctx.handler,
                ParserInvalidXMLDecl,
                ctx.locator,
                "'{}' is specified more than once",
                self.name
            ));
        }
        Ok(())
    }

    fn finish<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        ctx: &mut Context<'_, H, N>,
    ) -> Result<(), XMLError> {
        if let Some(encoding) = self.encoding.as_deref() {
            let Some(name) = canonical_name(encoding) else {
                return Err(unsupported_encoding(ctx, encoding));
            };
            if name != ctx.source.charset_name() {
                let Some(charset) = find_charset(name) else {
                    return Err(unsupported_encoding(ctx, encoding));
                };
                log::debug!(
                    "switch encoding from {} to {}",
                    ctx.source.charset_name(),
                    charset.name()
                );
                ctx.source.set_charset(charset);
            }
        }
        if let Some(version) = self.version.as_deref() {
            *ctx.version = version.parse().unwrap_or(XMLVersion::Unknown);
        }
        ctx.handler.declaration(
            self.version.as_deref(),
            self.encoding.as_deref(),
            self.standalone.unwrap_or(false),
        );
        Ok(())
    }
}

/// ```text
/// [26] VersionNum ::= '1.' [0-9]+
/// ```
fn is_version_num(value: &str) -> bool {
    value
        .strip_prefix("1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

fn invalid_decl<H: SAXHandler, N: NamespaceResolver>(
    ctx: &mut Context<'_, H, N>,
    c: char,
) -> XMLError {
    fatal_error!(
        ctx.handler,
        ParserInvalidXMLDecl,
        ctx.locator,
        "character '{}' is not allowed in an XML declaration",
        c
    )
}

fn unsupported_encoding<H: SAXHandler, N: NamespaceResolver>(
    ctx: &mut Context<'_, H, N>,
    encoding: &str,
) -> XMLError {
    fatal_error!(
        ctx.handler,
        ParserUnsupportedEncoding,
        ctx.locator,
        "the encoding '{}' is not supported",
        encoding
    )
}
