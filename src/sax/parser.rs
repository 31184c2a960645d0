use crate::{
    XMLVersion,
    charset::DecodeError,
    error::{XMLError, XMLErrorLevel},
    parse::{Context, Frame, FrameKind, Transition},
    sax::{
        Locator,
        error::{fatal_error, generic_error},
        handler::{DefaultSAXHandler, SAXHandler},
        namespace::{NamespaceResolver, NamespaceSupport},
        source::InputSource,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParserOption {
    /// Resolve element and attribute names against namespace declarations.
    Namespaces = 0,
    /// Report `xmlns` attributes in the attribute list of `start_element`.
    NamespaceDeclarations = 1,
    /// Accept more than one top-level element.
    MultipleRoots = 2,
}

impl std::ops::BitOr<Self> for ParserOption {
    type Output = ParserConfig;

    fn bitor(self, rhs: Self) -> Self::Output {
        ParserConfig {
            flags: (1 << self as i32) | (1 << rhs as i32),
        }
    }
}

impl std::ops::BitOr<ParserConfig> for ParserOption {
    type Output = ParserConfig;

    fn bitor(self, rhs: ParserConfig) -> Self::Output {
        ParserConfig {
            flags: rhs.flags | (1 << self as i32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    flags: u64,
}

impl ParserConfig {
    pub fn is_enable(&self, option: ParserOption) -> bool {
        self.flags & (1 << option as i32) != 0
    }

    pub fn set_option(&mut self, option: ParserOption, flag: bool) {
        if flag {
            self.flags |= 1 << (option as i32);
        } else {
            self.flags &= !(1 << (option as i32));
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserOption::Namespaces | ParserOption::NamespaceDeclarations
    }
}

impl From<ParserOption> for ParserConfig {
    fn from(value: ParserOption) -> Self {
        ParserConfig {
            flags: 1 << value as i32,
        }
    }
}

impl std::ops::BitOr<Self> for ParserConfig {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        ParserConfig {
            flags: self.flags | rhs.flags,
        }
    }
}

impl std::ops::BitOr<ParserOption> for ParserConfig {
    type Output = Self;

    fn bitor(self, rhs: ParserOption) -> Self::Output {
        ParserConfig {
            flags: self.flags | (1 << rhs as i32),
        }
    }
}

impl std::ops::BitOrAssign<ParserOption> for ParserConfig {
    fn bitor_assign(&mut self, rhs: ParserOption) {
        self.flags |= 1 << rhs as i32;
    }
}

impl std::ops::BitOrAssign<Self> for ParserConfig {
    fn bitor_assign(&mut self, rhs: Self) {
        self.flags |= rhs.flags;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    BeforeStart,
    Parsing,
    FatalErrorOccurred,
    Finished,
}

/// An incremental XML reader.
///
/// The reader never waits for input. [`XMLReader::parse`] consumes every complete
/// character currently held by an [`InputSource`] and returns, keeping all state
/// needed to continue when more bytes arrive.
///
/// # Example
/// ```
/// use nioxml::sax::{handler::DebugHandler, parser::XMLReaderBuilder, source::InputSource};
///
/// let mut reader = XMLReaderBuilder::new()
///     .set_handler(DebugHandler::default())
///     .build();
/// let mut source = InputSource::new();
/// reader.start_document().unwrap();
/// for chunk in ["<greeting>Hel", "lo</gree", "ting>"] {
///     source.feed(chunk.as_bytes());
///     reader.parse(&mut source).unwrap();
/// }
/// reader.end_document().unwrap();
/// assert_eq!(
///     reader.handler.buffer,
///     r#"startDocument()
/// startElement(None, greeting, greeting)
/// characters(Hello)
/// endElement(None, greeting, greeting)
/// endDocument()
/// "#
/// );
/// ```
pub struct XMLReader<H: SAXHandler = DefaultSAXHandler, N: NamespaceResolver = NamespaceSupport>
{
    pub handler: H,
    pub(crate) namespaces: N,
    pub(crate) config: ParserConfig,

    // Parser Context
    frames: Vec<Frame>,
    state: ParserState,
    locator: Locator,
    version: XMLVersion,
    // the last character was '\r', so a directly following '\n' is dropped
    pending_cr: bool,
    error: Option<XMLError>,
}

impl<H: SAXHandler, N: NamespaceResolver> XMLReader<H, N> {
    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn namespaces(&self) -> &N {
        &self.namespaces
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// The position of the last consumed character.
    pub fn locator(&self) -> Locator {
        self.locator
    }

    /// The version given by the XML declaration, or 1.0.
    pub fn version(&self) -> XMLVersion {
        self.version
    }

    /// The number of currently open elements.
    pub fn depth(&self) -> usize {
        self.frames
            .iter()
            .filter(|frame| matches!(frame.kind, FrameKind::Element(_)))
            .count()
    }

    /// Begin a new document.
    ///
    /// A reader can be reused after [`XMLReader::end_document`].
    pub fn start_document(&mut self) -> Result<(), XMLError> {
        if !matches!(self.state, ParserState::BeforeStart | ParserState::Finished) {
            return Err(XMLError::ParserDocumentAlreadyStarted);
        }
        self.unwind();
        self.namespaces.reset();
        self.namespaces.push_scope();
        self.locator = Locator::new();
        self.version = XMLVersion::default();
        self.pending_cr = false;
        self.error = None;
        self.frames.push(Frame::prolog());
        log::debug!("start document");
        self.handler.start_document();
        self.state = ParserState::Parsing;
        Ok(())
    }

    /// Consume all complete characters in `source`.
    ///
    /// Returns `Ok(())` when `source` runs out of data. Consumed bytes are
    /// compacted away, so the caller only has to append new bytes before the next
    /// call. After a fatal error, every call returns the same error.
    pub fn parse(&mut self, source: &mut InputSource) -> Result<(), XMLError> {
        match self.state {
            ParserState::Parsing => {}
            ParserState::FatalErrorOccurred => {
                return Err(self
                    .error
                    .clone()
                    .unwrap_or(XMLError::ParserDocumentNotStarted));
            }
            ParserState::BeforeStart | ParserState::Finished => {
                return Err(XMLError::ParserDocumentNotStarted);
            }
        }

        let ret = self.run(source);
        source.compact();
        if let Err(err) = ret.as_ref() {
            log::debug!("parse failed: {err}");
            self.state = ParserState::FatalErrorOccurred;
            self.error = Some(err.clone());
        }
        ret
    }

    /// Finish the current document.
    ///
    /// Any frames still open are discarded without reporting events for them. If the
    /// document ended early, [`XMLError::ParserUnexpectedEOF`] is returned, unless a
    /// fatal error has already been reported.
    pub fn end_document(&mut self) -> Result<(), XMLError> {
        let state = self.state;
        if matches!(state, ParserState::BeforeStart | ParserState::Finished) {
            return Err(XMLError::ParserDocumentNotStarted);
        }

        let complete = self.frames.len() == 1
            && self.frames.first().is_some_and(|frame| match &frame.kind {
                FrameKind::Prolog(prolog) => prolog.is_complete(),
                _ => false,
            });
        let ret = if state == ParserState::Parsing && !complete {
            Err(fatal_error!(
                self.handler,
                ParserUnexpectedEOF,
                self.locator,
                "the document ended before the root element was closed"
            ))
        } else {
            Ok(())
        };
        self.handler.end_document();
        self.unwind();
        self.namespaces.reset();
        self.state = ParserState::Finished;
        log::debug!("end document");
        ret
    }

    /// Discard all frames without reporting events.
    fn unwind(&mut self) {
        while let Some(mut frame) = self.frames.pop() {
            log::trace!("discard {} frame", frame.name());
            frame.cleanup(&mut self.handler, &mut self.namespaces, false);
        }
    }

    fn run(&mut self, source: &mut InputSource) -> Result<(), XMLError> {
        while let Some(c) = self.next_char(source)? {
            self.feed(source, c)?;
        }
        Ok(())
    }

    /// Decode the next character with end-of-line handling applied.
    ///
    /// Returns `Ok(None)` if `source` does not hold a complete character.
    ///
    /// ```text
    /// 2.11 End-of-Line Handling
    /// ... by translating both the two-character sequence #xD #xA and any #xD that is
    /// not followed by #xA to a single #xA character.
    /// ```
    fn next_char(&mut self, source: &mut InputSource) -> Result<Option<char>, XMLError> {
        loop {
            let c = match source.decode() {
                Ok(c) => c,
                Err(DecodeError::NotEnoughData) => return Ok(None),
                Err(err @ DecodeError::InvalidChar) => {
                    generic_error!(
                        fatal_error,
                        self.handler,
                        XMLError::DecodeError(err),
                        XMLErrorLevel::FatalError,
                        self.locator,
                        "the input is not valid {}",
                        source.charset_name()
                    );
                    return Err(XMLError::DecodeError(err));
                }
            };

            if std::mem::take(&mut self.pending_cr) && c == '\n' {
                continue;
            }
            let c = if c == '\r' {
                self.pending_cr = true;
                '\n'
            } else {
                c
            };
            self.locator.advance(c);
            if !self.version.is_char(c) {
                return Err(fatal_error!(
                    self.handler,
                    ParserInvalidCharacter,
                    self.locator,
                    "U+{:04X} is not a legal XML character",
                    c as u32
                ));
            }
            return Ok(Some(c));
        }
    }

    /// Feed `c` to the frame on top of the stack and apply its transition.
    fn feed(&mut self, source: &mut InputSource, c: char) -> Result<(), XMLError> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(());
            };
            let mut ctx = Context {
                handler: &mut self.handler,
                namespaces: &mut self.namespaces,
                config: &self.config,
                source: &mut *source,
                locator: self.locator,
                version: &mut self.version,
            };
            match frame.step(&mut ctx, c)? {
                Transition::Continue => return Ok(()),
                Transition::Delegate { frame, replay } => {
                    log::trace!("enter {} frame", frame.name());
                    self.frames.push(frame);
                    if !replay {
                        return Ok(());
                    }
                }
                Transition::Replace(frame) => {
                    log::trace!("switch to {} frame", frame.name());
                    if let Some(top) = self.frames.last_mut() {
                        *top = frame;
                    }
                    return Ok(());
                }
                Transition::Finish => {
                    if let Some(mut frame) = self.frames.pop() {
                        log::trace!("leave {} frame", frame.name());
                        frame.cleanup(&mut self.handler, &mut self.namespaces, true);
                    }
                    return Ok(());
                }
            }
        }
    }
}

pub struct XMLReaderBuilder<H: SAXHandler = DefaultSAXHandler, N: NamespaceResolver = NamespaceSupport>
{
    handler: H,
    namespaces: N,
    config: ParserConfig,
}

impl XMLReaderBuilder {
    pub fn new() -> Self {
        Self {
            handler: DefaultSAXHandler,
            namespaces: NamespaceSupport::new(),
            config: ParserConfig::default(),
        }
    }
}

impl Default for XMLReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: SAXHandler, N: NamespaceResolver> XMLReaderBuilder<H, N> {
    pub fn set_handler<NH: SAXHandler>(self, handler: NH) -> XMLReaderBuilder<NH, N> {
        XMLReaderBuilder {
            handler,
            namespaces: self.namespaces,
            config: self.config,
        }
    }

    pub fn set_namespace_resolver<NN: NamespaceResolver>(
        self,
        namespaces: NN,
    ) -> XMLReaderBuilder<H, NN> {
        XMLReaderBuilder {
            handler: self.handler,
            namespaces,
            config: self.config,
        }
    }

    pub fn set_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_option(mut self, option: ParserOption, flag: bool) -> Self {
        self.config.set_option(option, flag);
        self
    }

    pub fn build(self) -> XMLReader<H, N> {
        XMLReader {
            handler: self.handler,
            namespaces: self.namespaces,
            config: self.config,
            frames: vec![],
            state: ParserState::BeforeStart,
            locator: Locator::new(),
            version: XMLVersion::default(),
            pending_cr: false,
            error: None,
        }
    }
}
