use std::borrow::Cow;
use std::fmt::Write;

use dynlist_types::Primitive;

use super::tokens::Token;

/// A SQL chunk represents a part of an SQL statement.
///
/// - `Token` - SQL keywords and operators (SELECT, FROM, =, etc.)
/// - `Ident` - Quoted identifiers ("root", "customerName")
/// - `Raw` - System-controlled SQL text, written as-is
/// - `Param` - A bound value, rendered as `$n`
/// - `Cast` - A `::type` suffix on the preceding chunk
/// - `Number` - An unsigned integer literal (LIMIT)
#[derive(Debug, Clone, PartialEq)]
pub enum SQLChunk {
    /// SQL keywords and operators: SELECT, FROM, WHERE, =, AND, etc.
    Token(Token),

    /// Quoted identifier
    /// Renders as: "name" (embedded quotes are doubled)
    Ident(Cow<'static, str>),

    /// Raw SQL text (unquoted)
    /// Only ever built from metadata or system constants, never from caller input.
    Raw(Cow<'static, str>),

    /// Parameter value
    /// Renders as: $1, $2, ... numbered in render order
    Param(Primitive),

    /// Type cast written against the previous chunk
    /// Renders as: ::name
    Cast(&'static str),

    /// Unsigned integer literal
    Number(u64),
}

impl SQLChunk {
    #[inline]
    pub const fn token(t: Token) -> Self {
        Self::Token(t)
    }

    #[inline]
    pub fn ident(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Ident(name.into())
    }

    #[inline]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self::Raw(text.into())
    }

    #[inline]
    pub fn param(value: impl Into<Primitive>) -> Self {
        Self::Param(value.into())
    }

    /// Write chunk content to buffer. Parameters are written by the caller,
    /// which owns the placeholder counter.
    pub(crate) fn write(&self, buf: &mut impl Write) {
        match self {
            SQLChunk::Token(token) => {
                let _ = buf.write_str(token.as_str());
            }
            SQLChunk::Ident(name) => {
                let _ = buf.write_char('"');
                if name.contains('"') {
                    let _ = buf.write_str(&name.replace('"', "\"\""));
                } else {
                    let _ = buf.write_str(name);
                }
                let _ = buf.write_char('"');
            }
            SQLChunk::Raw(text) => {
                let _ = buf.write_str(text);
            }
            SQLChunk::Param(_) => {
                let _ = buf.write_char('?');
            }
            SQLChunk::Cast(ty) => {
                let _ = buf.write_str("::");
                let _ = buf.write_str(ty);
            }
            SQLChunk::Number(n) => {
                let _ = write!(buf, "{n}");
            }
        }
    }

    /// Check if this chunk is "word-like" (needs space separation from other word-like chunks)
    #[inline]
    pub(crate) const fn is_word_like(&self) -> bool {
        match self {
            SQLChunk::Token(t) => !t.is_punctuation(),
            SQLChunk::Ident(_)
            | SQLChunk::Raw(_)
            | SQLChunk::Param(_)
            | SQLChunk::Cast(_)
            | SQLChunk::Number(_) => true,
        }
    }
}

// ==================== From implementations ====================

impl From<Token> for SQLChunk {
    #[inline]
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

impl From<Primitive> for SQLChunk {
    #[inline]
    fn from(value: Primitive) -> Self {
        Self::Param(value)
    }
}
