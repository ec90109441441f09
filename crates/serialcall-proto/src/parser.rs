use std::sync::OnceLock;

use serialcall_wire::format::aliases_longest_first;
use serialcall_wire::{CommandDescriptor, FormatCode, Value};

use crate::error::{ProtoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Number(&'a str),
    Star,
    LParen,
    RParen,
    Comma,
    Equals,
    Semicolon,
    Minus,
}

impl Token<'_> {
    fn text(&self) -> &str {
        match self {
            Token::Word(s) | Token::Number(s) => s,
            Token::Star => "*",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Equals => "=",
            Token::Semicolon => ";",
            Token::Minus => "-",
        }
    }
}

/// Parse a C prototype into a descriptor with command id `id`.
///
/// Grammar, with insignificant whitespace:
/// ```text
/// prototype := word* type name '(' args ')' ';'?
/// args      := ε | 'void' | arg (',' arg)*
/// arg       := 'const'? type name? ('=' default)?
/// default   := '-'? number | 'true' | 'false'
/// ```
/// Types are matched against the type table longest alias first, so
/// `unsigned long long int` is never read as `unsigned long`. Leading words
/// before the return type (`static`, `extern`, ...) are ignored. Parameter
/// names and defaults are accepted but not kept.
pub fn parse_prototype(prototype: &str, id: u8) -> Result<CommandDescriptor> {
    let fail = |reason: &str| ProtoError::ParseFailure {
        prototype: prototype.to_string(),
        reason: reason.to_string(),
    };
    let unknown = |type_name: String| ProtoError::UnknownType {
        prototype: prototype.to_string(),
        type_name,
    };

    let tokens = tokenize(prototype).map_err(|reason| fail(&reason))?;

    let open = tokens
        .iter()
        .position(|t| *t == Token::LParen)
        .ok_or_else(|| fail("missing '('"))?;
    let close = tokens[open + 1..]
        .iter()
        .position(|t| matches!(t, Token::LParen | Token::RParen))
        .map(|offset| open + 1 + offset)
        .filter(|&i| tokens[i] == Token::RParen)
        .ok_or_else(|| fail("argument list is not closed by a single ')'"))?;

    match &tokens[close + 1..] {
        [] | [Token::Semicolon] => {}
        _ => return Err(fail("unexpected tokens after ')'")),
    }

    let (name, head) = match tokens[..open].split_last() {
        Some((Token::Word(name), head)) => (*name, head),
        _ => return Err(fail("missing function name before '('")),
    };
    if head.is_empty() {
        return Err(fail("missing return type"));
    }

    let return_format = match parse_return_type(head) {
        ReturnType::Matched(format, prefix) => {
            if !prefix.iter().all(|t| matches!(t, Token::Word(_))) {
                return Err(fail("unexpected tokens before return type"));
            }
            format
        }
        ReturnType::Unknown => return Err(unknown(joined(head))),
    };

    let arg_tokens = &tokens[open + 1..close];
    let arg_formats = match arg_tokens {
        [] | [Token::Word("void")] => Vec::new(),
        _ => arg_tokens
            .split(|t| *t == Token::Comma)
            .map(|arg| parse_arg(arg).map_err(|err| err.into_proto_error(prototype)))
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(CommandDescriptor::new(id, name, return_format, arg_formats))
}

enum ReturnType<'t, 'a> {
    /// The resolved format (`None` for `void`) and the words before it.
    Matched(Option<FormatCode>, &'t [Token<'a>]),
    Unknown,
}

fn parse_return_type<'t, 'a>(head: &'t [Token<'a>]) -> ReturnType<'t, 'a> {
    for (alias, format) in alias_tokens() {
        if ends_with_alias(head, alias) {
            return ReturnType::Matched(Some(*format), &head[..head.len() - alias.len()]);
        }
    }
    if let Some((Token::Word("void"), prefix)) = head.split_last() {
        return ReturnType::Matched(None, prefix);
    }
    ReturnType::Unknown
}

enum ArgError {
    Parse(String),
    UnknownType(String),
}

impl ArgError {
    fn into_proto_error(self, prototype: &str) -> ProtoError {
        match self {
            ArgError::Parse(reason) => ProtoError::ParseFailure {
                prototype: prototype.to_string(),
                reason,
            },
            ArgError::UnknownType(type_name) => ProtoError::UnknownType {
                prototype: prototype.to_string(),
                type_name,
            },
        }
    }
}

fn parse_arg(arg: &[Token<'_>]) -> std::result::Result<FormatCode, ArgError> {
    let arg = match arg {
        [Token::Word("const"), rest @ ..] => rest,
        _ => arg,
    };
    if arg.is_empty() {
        return Err(ArgError::Parse("empty argument".to_string()));
    }

    let Some((format, len)) = alias_tokens()
        .iter()
        .find(|(alias, _)| starts_with_alias(arg, alias))
        .map(|(alias, format)| (*format, alias.len()))
    else {
        return Err(ArgError::UnknownType(joined(&arg[..unknown_type_len(arg)])));
    };

    let rest = &arg[len..];
    if rest.first() == Some(&Token::Star) {
        // A pointer to a table type, e.g. `char*`, has no wire format.
        let stars = rest.iter().take_while(|t| **t == Token::Star).count();
        return Err(ArgError::UnknownType(joined(&arg[..len + stars])));
    }

    let rest = match rest {
        [Token::Word(_), tail @ ..] => tail,
        _ => rest,
    };

    match rest {
        [] => Ok(format),
        [Token::Equals, default @ ..] if is_default_value(default) => Ok(format),
        [Token::Equals, ..] => Err(ArgError::Parse("invalid default value".to_string())),
        [other, ..] => Err(ArgError::Parse(format!(
            "unexpected {:?} in argument",
            other.text()
        ))),
    }
}

const TYPE_KEYWORDS: [&str; 12] = [
    "unsigned", "signed", "short", "long", "int", "char", "float", "double", "void", "bool",
    "_Bool", "volatile",
];

/// Length of the leading type tokens of an argument with no table match.
///
/// The first word always belongs to the type. After it, C type keywords,
/// `*` and the tag following `struct`/`enum`/`union` extend the type; the
/// first other token ends it.
fn unknown_type_len(arg: &[Token<'_>]) -> usize {
    let mut len = 1;
    let mut tagged = matches!(arg.first(), Some(Token::Word("struct" | "enum" | "union")));
    for token in &arg[1..] {
        match token {
            Token::Star => {}
            Token::Word(_) if tagged => tagged = false,
            Token::Word(word) if TYPE_KEYWORDS.contains(word) || word.ends_with("_t") => {}
            _ => break,
        }
        len += 1;
    }
    len
}

fn is_default_value(tokens: &[Token<'_>]) -> bool {
    match tokens {
        [Token::Word("true" | "false")] => true,
        [Token::Number(n)] => n.parse::<Value>().is_ok(),
        [Token::Minus, Token::Number(n)] => format!("-{n}").parse::<Value>().is_ok(),
        _ => false,
    }
}

fn starts_with_alias(tokens: &[Token<'_>], alias: &[&str]) -> bool {
    tokens.len() >= alias.len()
        && tokens
            .iter()
            .zip(alias)
            .all(|(token, part)| token_matches(token, part))
}

fn ends_with_alias(tokens: &[Token<'_>], alias: &[&str]) -> bool {
    tokens.len() >= alias.len()
        && tokens[tokens.len() - alias.len()..]
            .iter()
            .zip(alias)
            .all(|(token, part)| token_matches(token, part))
}

fn token_matches(token: &Token<'_>, part: &str) -> bool {
    match token {
        Token::Word(word) => *word == part,
        Token::Star => part == "*",
        _ => false,
    }
}

/// Type table aliases split into word/`*` tokens, longest first.
fn alias_tokens() -> &'static [(Vec<&'static str>, FormatCode)] {
    static TOKENS: OnceLock<Vec<(Vec<&'static str>, FormatCode)>> = OnceLock::new();
    TOKENS.get_or_init(|| {
        aliases_longest_first()
            .iter()
            .map(|(alias, format)| (split_alias(alias), *format))
            .collect()
    })
}

fn split_alias(alias: &'static str) -> Vec<&'static str> {
    let mut parts = Vec::new();
    for word in alias.split_whitespace() {
        let base = word.trim_end_matches('*');
        if !base.is_empty() {
            parts.push(base);
        }
        parts.extend(std::iter::repeat("*").take(word.len() - base.len()));
    }
    parts
}

fn joined(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    for token in tokens {
        if matches!(token, Token::Word(_) | Token::Number(_)) && !out.is_empty() && !out.ends_with('*') {
            out.push(' ');
        }
        out.push_str(token.text());
    }
    out
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token<'_>>, String> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token::Word(&input[start..i]));
            continue;
        }
        let starts_number = c.is_ascii_digit()
            || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit));
        if starts_number {
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
            {
                i += 1;
            }
            tokens.push(Token::Number(&input[start..i]));
            continue;
        }
        let token = match c {
            b'*' => Token::Star,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b',' => Token::Comma,
            b'=' => Token::Equals,
            b';' => Token::Semicolon,
            b'-' => Token::Minus,
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(format!("unexpected character {ch:?}"));
            }
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}
