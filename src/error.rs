use crate::charset::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XMLErrorLevel {
    FatalError,
}

impl std::fmt::Display for XMLErrorLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::FatalError => write!(f, "fatal error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XMLErrorDomain {
    Parser,
    Namespace,
    Encoding,
}

impl std::fmt::Display for XMLErrorDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Parser => write!(f, "parser"),
            Self::Namespace => write!(f, "namespace"),
            Self::Encoding => write!(f, "encoding"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XMLError {
    // document lifecycle errors
    ParserDocumentAlreadyStarted,
    ParserDocumentNotStarted,
    // parser errors
    ParserInvalidCharacter,
    ParserInvalidComment,
    ParserInvalidXMLDecl,
    ParserInvalidXMLVersion,
    ParserInvalidSDDecl,
    ParserUnsupportedEncoding,
    ParserUnsupportedDoctype,
    ParserMismatchElementType,
    ParserDuplicateAttributes,
    ParserInvalidCharacterReference,
    ParserUndeclaredEntityReference,
    ParserUnexpectedDocumentContent,
    ParserUnexpectedEOF,
    // namespace errors
    ParserUnacceptableNamespaceName,
    ParserUndefinedNamespace,
    // encoding errors
    DecodeError(DecodeError),
}

impl XMLError {
    pub fn domain(&self) -> XMLErrorDomain {
        match self {
            Self::ParserUnacceptableNamespaceName | Self::ParserUndefinedNamespace => {
                XMLErrorDomain::Namespace
            }
            Self::ParserUnsupportedEncoding | Self::DecodeError(_) => XMLErrorDomain::Encoding,
            _ => XMLErrorDomain::Parser,
        }
    }
}

impl std::fmt::Display for XMLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for XMLError {}

impl From<DecodeError> for XMLError {
    fn from(value: DecodeError) -> Self {
        Self::DecodeError(value)
    }
}
