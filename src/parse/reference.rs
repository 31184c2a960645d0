use crate::{
    error::XMLError,
    parse::{Accumulator, Context},
    sax::{error::fatal_error, handler::SAXHandler, namespace::NamespaceResolver},
};

/// Consume one character of a reference whose text after `&` is collected in `acc`.
///
/// Returns the replacement character once `;` has been read. The caller is expected
/// to have called [`Accumulator::replace`] when it saw `&`; on completion the text of
/// the reference is dropped with [`Accumulator::restore`].
///
/// ```text
/// [66] CharRef   ::= '&#' [0-9]+ ';' | '&#x' [0-9a-fA-F]+ ';'
/// [68] EntityRef ::= '&' Name ';'
/// ```
pub(crate) fn reference_step<H: SAXHandler, N: NamespaceResolver>(
    acc: &mut Accumulator,
    ctx: &mut Context<'_, H, N>,
    c: char,
) -> Result<Option<char>, XMLError> {
    let text = acc.as_str();
    if c == ';' && !matches!(text, "" | "#" | "#x") {
        let name = acc.restore();
        return resolve_reference(&name, ctx).map(Some);
    }

    let valid = match text {
        "" => c == '#' || ctx.is_name_start_char(c),
        "#" => c == 'x' || c.is_ascii_digit(),
        text if text.starts_with("#x") => c.is_ascii_hexdigit(),
        text if text.starts_with('#') => c.is_ascii_digit(),
        _ => ctx.is_name_char(c),
    };
    if !valid {
        return Err(if text.starts_with('#') {
            fatal_error!(
                ctx.handler,
                ParserInvalidCharacterReference,
                ctx.locator,
                "character '{}' is not allowed in a character reference",
                c
            )
        } else {
            fatal_error!(
                ctx.handler,
                ParserInvalidCharacter,
                ctx.locator,
                "character '{}' is not allowed in an entity reference",
                c
            )
        });
    }
    acc.push(c);
    Ok(None)
}

fn resolve_reference<H: SAXHandler, N: NamespaceResolver>(
    name: &str,
    ctx: &mut Context<'_, H, N>,
) -> Result<char, XMLError> {
    let code = if let Some(hex) = name.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        return match name {
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "amp" => Ok('&'),
            "apos" => Ok('\''),
            "quot" => Ok('"'),
            name => Err(fatal_error!(
                ctx.handler,
                ParserUndeclaredEntityReference,
                ctx.locator,
                "the entity '{}' is not declared",
                name
            )),
        };
    };

    match code.and_then(char::from_u32) {
        Some(c) if ctx.version.is_char(c) => Ok(c),
        _ => Err(fatal_error!(
            ctx.handler,
            ParserInvalidCharacterReference,
            ctx.locator,
            "'&{};' does not refer to a legal character",
            name
        )),
    }
}
