use std::borrow::Cow;

use crate::error::{XMLError, XMLErrorLevel};

#[derive(Debug, Clone)]
pub struct SAXParseError {
    pub error: XMLError,
    pub level: XMLErrorLevel,
    pub line: usize,
    pub column: usize,
    pub message: Cow<'static, str>,
}

impl std::fmt::Display for SAXParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[line:{},column:{}]:{}:{}",
            self.line, self.column, self.level, self.message,
        )
    }
}

impl std::error::Error for SAXParseError {}

macro_rules! generic_error {
    ($method:ident, $handler:expr, $code:expr, $level:expr, $locator:expr, $message:literal, $( $args:expr ),+) => {
        $handler.$method($crate::sax::error::SAXParseError {
            error: $code,
            level: $level,
            line: $locator.line(),
            column: $locator.column(),
            message: ::std::borrow::Cow::Owned(format!($message, $( $args ),+)),
        })
    };
    ($method:ident, $handler:expr, $code:expr, $level:expr, $locator:expr, $message:literal) => {
        $handler.$method($crate::sax::error::SAXParseError {
            error: $code,
            level: $level,
            line: $locator.line(),
            column: $locator.column(),
            message: ::std::borrow::Cow::Borrowed($message),
        })
    };
    ($method:ident, $handler:expr, $code:expr, $level:expr, $locator:expr) => {
        $handler.$method($crate::sax::error::SAXParseError {
            error: $code,
            level: $level,
            line: $locator.line(),
            column: $locator.column(),
            message: ::std::borrow::Cow::Borrowed("No messages"),
        })
    };
}

/// Report a fatal error to the handler and evaluate to the error code, so that
/// the caller can write `return Err(fatal_error!(...))`.
macro_rules! fatal_error {
    ($handler:expr, $code:ident, $locator:expr, $message:literal, $( $args:expr ),+) => {{
        $crate::sax::error::generic_error!(fatal_error, $handler, $crate::error::XMLError::$code, $crate::error::XMLErrorLevel::FatalError, $locator, $message, $( $args ),+);
        $crate::error::XMLError::$code
    }};
    ($handler:expr, $code:ident, $locator:expr, $message:literal) => {{
        $crate::sax::error::generic_error!(fatal_error, $handler, $crate::error::XMLError::$code, $crate::error::XMLErrorLevel::FatalError, $locator, $message);
        $crate::error::XMLError::$code
    }};
    ($handler:expr, $code:ident, $locator:expr) => {{
        $crate::sax::error::generic_error!(fatal_error, $handler, $crate::error::XMLError::$code, $crate::error::XMLErrorLevel::FatalError, $locator);
        $crate::error::XMLError::$code
    }};
}

pub(crate) use {fatal_error, generic_error};
