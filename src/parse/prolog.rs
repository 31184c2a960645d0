use crate::{
    error::XMLError,
    parse::{Context, Frame, Transition},
    sax::{
        error::fatal_error, handler::SAXHandler, namespace::NamespaceResolver,
        parser::ParserOption,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PrologState {
    /// Between top-level constructs.
    #[default]
    Prolog,
    /// After a top-level `<`.
    ElementStart,
}

/// The bottom frame of every document.
///
/// It stays on the stack for the whole document and also covers the `Misc*` after
/// the root element.
#[derive(Debug, Default)]
pub(crate) struct PrologFrame {
    state: PrologState,
    // any character has been seen
    started: bool,
    // any markup has been seen, so an XML declaration is no longer allowed
    seen_markup: bool,
    root_started: bool,
}

impl PrologFrame {
    /// Check if the document seen so far is complete.
    pub(crate) fn is_complete(&self) -> bool {
        self.root_started && self.state == PrologState::Prolog
    }

    /// ```text
    /// [1]  document ::= prolog element Misc*
    /// [22] prolog   ::= XMLDecl? Misc* (doctypedecl Misc*)?
    /// [27] Misc     ::= Comment | PI | S
    /// ```
    pub(crate) fn step<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        ctx: &mut Context<'_, H, N>,
        c: char,
    ) -> Result<Transition, XMLError> {
        match self.state {
            PrologState::Prolog => {
                let first = !self.started;
                self.started = true;
                if ctx.is_whitespace(c) || (first && c == '\u{FEFF}') {
                    Ok(Transition::Continue)
                } else if c == '<' {
                    self.state = PrologState::ElementStart;
                    Ok(Transition::Continue)
                } else {
                    Err(fatal_error!(
                        ctx.handler,
                        ParserInvalidCharacter,
                        ctx.locator,
                        "character '{}' is not allowed outside of the root element",
                        c
                    ))
                }
            }
            PrologState::ElementStart => {
                self.state = PrologState::Prolog;
                let frame = match c {
                    '!' => Frame::markup(false),
                    '?' => Frame::processing_instruction(!self.seen_markup),
                    c if ctx.is_name_start_char(c) => {
                        if self.root_started && !ctx.config.is_enable(ParserOption::MultipleRoots)
                        {
                            return Err(fatal_error!(
                                ctx.handler,
                                ParserUnexpectedDocumentContent,
                                ctx.locator,
                                "only one root element is allowed"
                            ));
                        }
                        self.root_started = true;
                        self.seen_markup = true;
                        return Ok(Transition::Delegate {
                            frame: Frame::element(),
                            replay: true,
                        });
                    }
                    c => {
                        return Err(fatal_error!(
                            ctx.handler,
                            ParserInvalidCharacter,
                            ctx.locator,
                            "character '{}' cannot follow '<'",
                            c
                        ));
                    }
                };
                self.seen_markup = true;
                Ok(Transition::Delegate {
                    frame,
                    replay: false,
                })
            }
        }
    }
}
