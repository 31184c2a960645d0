//! Character-driven state machines.
//!
//! Every construct being parsed owns one [`Frame`] on the reader's frame stack. The
//! reader decodes one character at a time and hands it to the frame on top of the
//! stack, which answers with a [`Transition`].

mod accumulator;
mod element;
mod markup;
mod pi;
mod prolog;
mod reference;
mod xmldecl;

pub(crate) use accumulator::Accumulator;
pub(crate) use element::ElementFrame;
pub(crate) use markup::MarkupFrame;
pub(crate) use pi::PIFrame;
pub(crate) use prolog::PrologFrame;
pub(crate) use xmldecl::XMLDeclFrame;

use crate::{
    XMLVersion,
    error::XMLError,
    sax::{
        Locator,
        handler::SAXHandler,
        namespace::NamespaceResolver,
        parser::{ParserConfig, ParserOption},
        source::InputSource,
    },
};

/// What the reader does after a frame consumed a character.
pub(crate) enum Transition {
    /// Keep feeding characters to the current frame.
    Continue,
    /// Push `frame` and make it current.
    ///
    /// If `replay` is set, the character just consumed also belongs to the new frame
    /// and is fed to it immediately.
    Delegate { frame: Frame, replay: bool },
    /// Swap the current frame for `frame`.
    Replace(Frame),
    /// The construct of the current frame is complete. Pop it and resume its parent.
    Finish,
}

/// Everything outside of the frame stack that a state machine may touch.
pub(crate) struct Context<'a, H: SAXHandler, N: NamespaceResolver> {
    pub(crate) handler: &'a mut H,
    pub(crate) namespaces: &'a mut N,
    pub(crate) config: &'a ParserConfig,
    pub(crate) source: &'a mut InputSource,
    pub(crate) locator: Locator,
    pub(crate) version: &'a mut XMLVersion,
}

impl<H: SAXHandler, N: NamespaceResolver> Context<'_, H, N> {
    pub(crate) fn is_whitespace(&self, c: char) -> bool {
        self.version.is_whitespace(c)
    }

    pub(crate) fn is_name_start_char(&self, c: char) -> bool {
        self.version.is_name_start_char(c)
    }

    pub(crate) fn is_name_char(&self, c: char) -> bool {
        self.version.is_name_char(c)
    }

    pub(crate) fn namespaces_enabled(&self) -> bool {
        self.config.is_enable(ParserOption::Namespaces)
    }
}

pub(crate) enum FrameKind {
    Prolog(PrologFrame),
    Element(Box<ElementFrame>),
    Markup(MarkupFrame),
    ProcessingInstruction(PIFrame),
    XMLDeclaration(XMLDeclFrame),
}

pub(crate) struct Frame {
    pub(crate) kind: FrameKind,
    acc: Accumulator,
}

impl Frame {
    pub(crate) fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            acc: Accumulator::default(),
        }
    }

    pub(crate) fn prolog() -> Self {
        Self::new(FrameKind::Prolog(PrologFrame::default()))
    }

    pub(crate) fn element() -> Self {
        Self::new(FrameKind::Element(Box::default()))
    }

    pub(crate) fn markup(in_element: bool) -> Self {
        Self::new(FrameKind::Markup(MarkupFrame::new(in_element)))
    }

    pub(crate) fn processing_instruction(xml_decl_allowed: bool) -> Self {
        Self::new(FrameKind::ProcessingInstruction(PIFrame::new(
            xml_decl_allowed,
        )))
    }

    pub(crate) fn xml_declaration(frame: XMLDeclFrame) -> Self {
        Self::new(FrameKind::XMLDeclaration(frame))
    }

    pub(crate) fn name(&self) -> &'static str {
        match self.kind {
            FrameKind::Prolog(_) => "prolog",
            FrameKind::Element(_) => "element",
            FrameKind::Markup(_) => "markup",
            FrameKind::ProcessingInstruction(_) => "processing instruction",
            FrameKind::XMLDeclaration(_) => "XML declaration",
        }
    }

    /// Feed one character to the state machine of this frame.
    pub(crate) fn step<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        ctx: &mut Context<'_, H, N>,
        c: char,
    ) -> Result<Transition, XMLError> {
        let acc = &mut self.acc;
        match &mut self.kind {
            FrameKind::Prolog(frame) => frame.step(ctx, c),
            FrameKind::Element(frame) => frame.step(acc, ctx, c),
            FrameKind::Markup(frame) => frame.step(acc, ctx, c),
            FrameKind::ProcessingInstruction(frame) => frame.step(acc, ctx, c),
            FrameKind::XMLDeclaration(frame) => frame.step(acc, ctx, c),
        }
    }

    /// Release what this frame holds outside of itself.
    ///
    /// `report` is unset when the frame is discarded without being completed, in which
    /// case no events are sent.
    pub(crate) fn cleanup<H: SAXHandler, N: NamespaceResolver>(
        &mut self,
        handler: &mut H,
        namespaces: &mut N,
        report: bool,
    ) {
        if let FrameKind::Element(frame) = &mut self.kind {
            frame.cleanup(handler, namespaces, report);
        }
    }
}
