use std::{mem::take, sync::Arc};

use crate::{
    CHARDATA_CHUNK_LENGTH,
    error::XMLError,
    parse::{Accumulator, Context, Frame, Transition, reference::reference_step},
    sax::{
        attributes::{Attribute, Attributes},
        error::fatal_error,
        handler::SAXHandler,
        namespace::{NamespaceResolver, QName},
        parser::ParserOption,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ElementState {
    /// The first character of the element type.
    #[default]
    Name,
    NameCont,
    /// After the element type or an attribute value.
    AttrWhitespace,
    AttrName,
    /// Whitespace between an attribute name and `=`.
    AttrNameEnd,
    AttrEquals,
    AttrValue(char),
    AttrReference(char),
    /// After `/` in a start tag.
    EmptyClose,
    Content,
    ContentReference,
    /// After `<` in content.
    Child,
    CloseName,
    CloseNameCont,
    CloseWhitespace,
}

/// Scratch space of an element from its start tag to its end tag.
#[derive(Debug, Default)]
pub(crate) struct ElementFrame {
    state: ElementState,
    qname: String,
    attr_name: String,
    // raw (qname, value) pairs in document order
    attributes: Vec<(String, String)>,
    // the processed name, set when the start tag is reported
    name: Option<QName>,
    pushed_scope: bool,
    // prefixes declared on this element, `None` for the default namespace
    declared: Vec<Option<Arc<str>>>,
}

impl ElementFrame {
    /// ```text
    /// [39] element      ::= EmptyElemTag | STag content ETag
    /// [40] STag         ::= '<' Name (S Attribute)* S? '>'
    /// [41] Attribute    ::= Name Eq AttValue
    /// [42] ETag         ::= '</' Name S? '>'
    /// [43] content      ::= CharData? ((element | Reference | CDSect | PI | Comment) CharData?)*
    /// [44] EmptyElemTag ::= '<' Name (S Attribute)* S? '/>'
    /// ```
    pub(crate) fn step<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        acc: &mut Accumulator,
        ctx: &mut Context<'_, H, N>,
        c: char,
    ) -> Result<Transition, XMLError> {
        match self.state {
            ElementState::Name => {
                if !ctx.is_name_start_char(c) {
                    return Err(invalid_character(ctx, c, "an element type"));
                }
                acc.push(c);
                self.state = ElementState::NameCont;
            }
            ElementState::NameCont => {
                if ctx.is_name_char(c) {
                    acc.push(c);
                } else {
                    self.qname = acc.take();
                    return self.after_name(ctx, c);
                }
            }
            ElementState::AttrWhitespace => {
                if ctx.is_name_start_char(c) {
                    // Attributes directly after a closing quote are tolerated.
                    acc.push(c);
                    self.state = ElementState::AttrName;
                } else {
                    return self.after_name(ctx, c);
                }
            }
            ElementState::AttrName => {
                if ctx.is_name_char(c) {
                    acc.push(c);
                } else if c == '=' {
                    self.attr_name = acc.take();
                    self.state = ElementState::AttrEquals;
                } else if ctx.is_whitespace(c) {
                    self.attr_name = acc.take();
                    self.state = ElementState::AttrNameEnd;
                } else {
                    return Err(invalid_character(ctx, c, "an attribute name"));
                }
            }
            ElementState::AttrNameEnd => {
                if c == '=' {
                    self.state = ElementState::AttrEquals;
                } else if !ctx.is_whitespace(c) {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidCharacter,
                        ctx.locator,
                        "the attribute '{}' must be followed by '='",
                        self.attr_name
                    ));
                }
            }
            ElementState::AttrEquals => {
                if c == '\'' || c == '"' {
                    self.state = ElementState::AttrValue(c);
                } else if !ctx.is_whitespace(c) {
                    return Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidCharacter,
                        ctx.locator,
                        "the value of the attribute '{}' must be quoted",
                        self.attr_name
                    ));
                }
            }
            ElementState::AttrValue(quote) => match c {
                c if c == quote => {
                    self.attributes.push((take(&mut self.attr_name), acc.take()));
                    self.state = ElementState::AttrWhitespace;
                }
                '&' => {
                    acc.replace();
                    self.state = ElementState::AttrReference(quote);
                }
                '<' => return Err(invalid_character(ctx, c, "an attribute value")),
                // 3.3.3 Attribute-Value Normalization
                c if ctx.is_whitespace(c) => acc.push(' '),
                c => acc.push(c),
            },
            ElementState::AttrReference(quote) => {
                if let Some(c) = reference_step(acc, ctx, c)? {
                    acc.push(c);
                    self.state = ElementState::AttrValue(quote);
                }
            }
            ElementState::EmptyClose => {
                if c != '>' {
                    return Err(invalid_character(ctx, c, "an empty-element tag after '/'"));
                }
                self.report_start(ctx)?;
                self.report_end(ctx);
                return Ok(Transition::Finish);
            }
            ElementState::Content => match c {
                '<' => {
                    flush_characters(acc, ctx);
                    self.state = ElementState::Child;
                }
                '&' => {
                    acc.replace();
                    self.state = ElementState::ContentReference;
                }
                c => {
                    acc.push(c);
                    if acc.len() >= CHARDATA_CHUNK_LENGTH {
                        flush_characters(acc, ctx);
                    }
                }
            },
            ElementState::ContentReference => {
                if let Some(c) = reference_step(acc, ctx, c)? {
                    acc.push(c);
                    self.state = ElementState::Content;
                }
            }
            ElementState::Child => {
                let (frame, replay) = match c {
                    '/' => {
                        self.state = ElementState::CloseName;
                        return Ok(Transition::Continue);
                    }
                    '!' => (Frame::markup(true), false),
                    '?' => (Frame::processing_instruction(false), false),
                    c if ctx.is_name_start_char(c) => (Frame::element(), true),
                    c => return Err(invalid_character(ctx, c, "content after '<'")),
                };
                self.state = ElementState::Content;
                return Ok(Transition::Delegate { frame, replay });
            }
            ElementState::CloseName => {
                if !ctx.is_name_start_char(c) {
                    return Err(invalid_character(ctx, c, "an end tag"));
                }
                acc.push(c);
                self.state = ElementState::CloseNameCont;
            }
            ElementState::CloseNameCont => {
                if ctx.is_name_char(c) {
                    acc.push(c);
                } else if ctx.is_whitespace(c) {
                    self.state = ElementState::CloseWhitespace;
                } else if c == '>' {
                    return self.close(acc, ctx);
                } else {
                    return Err(invalid_character(ctx, c, "an end tag"));
                }
            }
            ElementState::CloseWhitespace => {
                if c == '>' {
                    return self.close(acc, ctx);
                } else if !ctx.is_whitespace(c) {
                    return Err(invalid_character(ctx, c, "an end tag"));
                }
            }
        }
        Ok(Transition::Continue)
    }

    /// Handle a character that follows the element type or an attribute.
    fn after_name<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        ctx: &mut Context<'_, H, N>,
        c: char,
    ) -> Result<Transition, XMLError> {
        if ctx.is_whitespace(c) {
            self.state = ElementState::AttrWhitespace;
        } else if c == '>' {
            self.report_start(ctx)?;
            self.state = ElementState::Content;
        } else if c == '/' {
            self.state = ElementState::EmptyClose;
        } else {
            return Err(invalid_character(ctx, c, "a start tag"));
        }
        Ok(Transition::Continue)
    }

    fn close<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        acc: &mut Accumulator,
        ctx: &mut Context<'_, H, N>,
    ) -> Result<Transition, XMLError> {
        let qname = acc.take();
        // The bindings of the start tag are still in scope, so equal QNames
        // resolve to equal expanded names.
        if qname != self.qname {
            return Err(fatal_error!(
                ctx.handler,
                ParserMismatchElementType,
                ctx.locator,
                "the end tag '{}' does not match the start tag '{}'",
                qname,
                self.qname
            ));
        }
        self.report_end(ctx);
        Ok(Transition::Finish)
    }

    /// Process namespace declarations and names, then report the start tag.
    ///
    /// All `xmlns` attributes are declared before any name is resolved, so a
    /// declaration applies to the element carrying it and to all of its attributes.
    fn report_start<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        ctx: &mut Context<'_, H, N>,
    ) -> Result<(), XMLError> {
        let raw = take(&mut self.attributes);
        let mut atts = Attributes::new();

        let name = if ctx.namespaces_enabled() {
            for (qname, value) in &raw {
                let prefix = match qname.strip_prefix("xmlns") {
                    Some("") => "",
                    Some(rest) => match rest.strip_prefix(':') {
                        Some(prefix) => prefix,
                        None => continue,
                    },
                    None => continue,
                };
                check_qname(ctx, qname)?;
                self.declare(ctx, prefix, value)?;
            }

            for (qname, value) in raw {
                let nsdecl = qname == "xmlns" || qname.starts_with("xmlns:");
                let name = resolve(ctx, &qname, true)?;
                let attribute = Attribute {
                    uri: name.uri,
                    local_name: name.local_name,
                    qname: name.qname,
                    value: value.into(),
                    nsdecl,
                };
                push_attribute(ctx, &mut atts, attribute)?;
            }
            if !ctx.config.is_enable(ParserOption::NamespaceDeclarations) {
                atts.remove_nsdecls();
            }
            resolve(ctx, &self.qname, false)?
        } else {
            for (qname, value) in raw {
                let qname: Arc<str> = qname.into();
                let attribute = Attribute {
                    uri: None,
                    local_name: qname.clone(),
                    qname,
                    value: value.into(),
                    nsdecl: false,
                };
                push_attribute(ctx, &mut atts, attribute)?;
            }
            let qname: Arc<str> = self.qname.as_str().into();
            QName {
                uri: None,
                local_name: qname.clone(),
                qname,
            }
        };

        ctx.handler
            .start_element(name.uri.as_deref(), &name.local_name, &name.qname, &atts);
        self.name = Some(name);
        Ok(())
    }

    fn declare<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        ctx: &mut Context<'_, H, N>,
        prefix: &str,
        uri: &str,
    ) -> Result<(), XMLError> {
        if !self.pushed_scope {
            ctx.namespaces.push_scope();
            self.pushed_scope = true;
        }
        if !ctx.namespaces.declare_prefix(prefix, uri) {
            return Err(fatal_error!(
                ctx.handler,
                ParserUnacceptableNamespaceName,
                ctx.locator,
                "the prefix '{}' cannot be bound to '{}'",
                prefix,
                uri
            ));
        }
        let prefix = (!prefix.is_empty()).then(|| Arc::<str>::from(prefix));
        ctx.handler.start_prefix_mapping(prefix.as_deref(), uri);
        self.declared.push(prefix);
        Ok(())
    }

    fn report_end<H: SAXHandler, N: NamespaceResolver>(&self, ctx: &mut Context<'_, H, N>) {
        if let Some(name) = self.name.as_ref() {
            ctx.handler
                .end_element(name.uri.as_deref(), &name.local_name, &name.qname);
        }
    }

    pub(crate) fn cleanup<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        handler: &mut H,
        namespaces: &mut N,
        report: bool,
    ) {
        if report {
            for prefix in &self.declared {
                handler.end_prefix_mapping(prefix.as_deref());
            }
        }
        if self.pushed_scope {
            namespaces.pop_scope();
            self.pushed_scope = false;
        }
    }
}

fn flush_characters<H: SAXHandler, N: NamespaceResolver>(
    acc: &mut Accumulator,
    ctx: &mut Context<'_, H, N>,
) {
    if !acc.is_empty() {
        ctx.handler.characters(acc.as_str());
        acc.take();
    }
}

fn check_qname<H: SAXHandler, N: NamespaceResolver>(
    ctx: &mut Context<'_, H, N>,
    raw: &str,
) -> Result<(), XMLError> {
    if ctx.version.validate_qname(raw) {
        return Ok(());
    }
    Err(fatal_error!(
        ctx.handler,
        ParserInvalidCharacter,
        ctx.locator,
        "'{}' is not a valid QName",
        raw
    ))
}

fn resolve<H: SAXHandler, N: NamespaceResolver>(
    ctx: &mut Context<'_, H, N>,
    raw: &str,
    is_attribute: bool,
) -> Result<QName, XMLError> {
    if let Some(name) = ctx.namespaces.resolve_qname(raw, is_attribute) {
        return Ok(name);
    }
    check_qname(ctx, raw)?;
    Err(fatal_error!(
        ctx.handler,
        ParserUndefinedNamespace,
        ctx.locator,
        "the namespace prefix of '{}' is not declared",
        raw
    ))
}

fn push_attribute<H: SAXHandler, N: NamespaceResolver>(
    ctx: &mut Context<'_, H, N>,
    atts: &mut Attributes,
    attribute: Attribute,
) -> Result<(), XMLError> {
    match atts.push(attribute) {
        Ok(_) => Ok(()),
        Err((attribute, _)) => Err(fatal_error!(
            ctx.handler,
            ParserDuplicateAttributes,
            ctx.locator,
            "the attribute '{}' is specified more than once",
            attribute.qname
        )),
    }
}

fn invalid_character<H: SAXHandler, N: NamespaceResolver>(
    ctx: &mut Context<'_, H, N>,
    c: char,
    place: &str,
) -> XMLError {
    fatal_error!(
        ctx.handler,
        ParserInvalidCharacter,
        ctx.locator,
        "character '{}' is not allowed in {}",
        c,
        place
    )
}
