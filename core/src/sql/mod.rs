mod chunk;
mod tokens;

use std::borrow::Cow;
use std::fmt::Write;

use dynlist_types::Primitive;
pub use chunk::*;
use smallvec::SmallVec;
pub use tokens::*;

/// SQL fragment builder with flat chunk storage.
///
/// Uses `SmallVec<[SQLChunk; 8]>` for inline storage of typical SQL fragments
/// without heap allocation. Bound values live inside the fragment as
/// [`SQLChunk::Param`], so fragments can be moved, dropped or reordered
/// without any separate parameter list falling out of step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SQL {
    pub chunks: SmallVec<[SQLChunk; 8]>,
}

impl SQL {
    // ==================== constructors ====================

    /// Creates an empty SQL fragment
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    /// Creates SQL with a single token
    #[inline]
    pub fn token(t: Token) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Token(t)],
        }
    }

    /// Creates SQL with a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Ident(name.into())],
        }
    }

    /// Creates SQL with raw text (unquoted)
    #[inline]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Raw(text.into())],
        }
    }

    /// Creates SQL with a single unsigned integer literal.
    #[inline]
    pub fn number(value: u64) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Number(value)],
        }
    }

    /// Creates SQL with a single parameter value
    #[inline]
    pub fn param(value: impl Into<Primitive>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Param(value.into())],
        }
    }

    /// Creates a parameter followed by an optional cast: `$1::date`
    #[inline]
    pub fn param_cast(value: impl Into<Primitive>, cast: Option<&'static str>) -> Self {
        let sql = Self::param(value);
        match cast {
            Some(ty) => sql.push(SQLChunk::Cast(ty)),
            None => sql,
        }
    }

    /// Creates a qualified column reference: "alias"."column"
    #[inline]
    pub fn column(table_alias: &str, column: &str) -> Self {
        Self {
            chunks: smallvec::smallvec![
                SQLChunk::Ident(Cow::Owned(table_alias.to_owned())),
                SQLChunk::Token(Token::DOT),
                SQLChunk::Ident(Cow::Owned(column.to_owned())),
            ],
        }
    }

    /// Creates a qualified table reference: "schema"."table"
    #[inline]
    pub fn table(schema: &str, table: &str) -> Self {
        Self::column(schema, table)
    }

    /// Splits a system clause on `?` into raw text and parameters.
    ///
    /// Extra `?` beyond the supplied values are kept as literal text; surplus
    /// values are ignored. Callers validate the count beforehand.
    pub fn with_placeholders(clause: &str, params: &[Primitive]) -> Self {
        let mut sql = SQL::empty();
        let mut values = params.iter();
        let mut pieces = clause.split('?').peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                sql.push_mut(SQLChunk::Raw(Cow::Owned(piece.to_owned())));
            }
            if pieces.peek().is_some() {
                match values.next() {
                    Some(value) => sql.push_mut(SQLChunk::Param(value.clone())),
                    None => sql.push_mut(SQLChunk::Raw(Cow::Borrowed("?"))),
                }
            }
        }
        sql
    }

    /// Creates SQL for a function call: NAME(args)
    #[inline]
    pub fn func(name: Token, args: SQL) -> Self {
        SQL::token(name)
            .push(Token::LPAREN)
            .append(args)
            .push(Token::RPAREN)
    }

    // ==================== builder methods ====================

    /// Append another SQL fragment (flat extend)
    #[inline]
    pub fn append(mut self, other: impl Into<SQL>) -> Self {
        self.append_mut(other);
        self
    }

    #[inline]
    pub fn append_mut(&mut self, other: impl Into<SQL>) {
        let other = other.into();

        if self.chunks.is_empty() {
            self.chunks = other.chunks;
            return;
        }
        if other.chunks.is_empty() {
            return;
        }

        self.chunks.extend(other.chunks);
    }

    /// Push a single chunk
    #[inline]
    pub fn push(mut self, chunk: impl Into<SQLChunk>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    #[inline]
    pub fn push_mut(&mut self, chunk: impl Into<SQLChunk>) {
        self.chunks.push(chunk.into());
    }

    // ==================== combinators ====================

    /// Joins multiple SQL fragments with a separator
    pub fn join<T>(sqls: T, separator: Token) -> SQL
    where
        T: IntoIterator<Item = SQL>,
    {
        let mut iter = sqls.into_iter();
        let Some(mut result) = iter.next() else {
            return SQL::empty();
        };

        for item in iter {
            result.chunks.push(SQLChunk::Token(separator));
            result.chunks.extend(item.chunks);
        }
        result
    }

    /// Wrap in parentheses: (self)
    #[inline]
    pub fn parens(self) -> Self {
        SQL::token(Token::LPAREN).append(self).push(Token::RPAREN)
    }

    /// Creates an aliased version: self AS "name"
    pub fn alias(self, name: impl Into<Cow<'static, str>>) -> SQL {
        self.push(Token::AS).push(SQLChunk::Ident(name.into()))
    }

    /// Appends a cast to the end of the fragment: self::ty
    #[inline]
    pub fn cast(self, ty: &'static str) -> Self {
        self.push(SQLChunk::Cast(ty))
    }

    /// Creates a comma-separated list of parameters, each with the same cast.
    pub fn param_list<I>(values: I, cast: Option<&'static str>) -> Self
    where
        I: IntoIterator<Item = Primitive>,
    {
        let iter = values.into_iter();
        let (lower, _) = iter.size_hint();
        let mut chunks = SmallVec::with_capacity(lower.saturating_mul(3));
        for (i, v) in iter.enumerate() {
            if i > 0 {
                chunks.push(SQLChunk::Token(Token::COMMA));
            }
            chunks.push(SQLChunk::Param(v));
            if let Some(ty) = cast {
                chunks.push(SQLChunk::Cast(ty));
            }
        }
        SQL { chunks }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    // ==================== output methods ====================

    /// Returns the SQL string with `$n` placeholders.
    pub fn sql(&self) -> String {
        self.build().0
    }

    /// Generates the SQL string and collects parameter values in a single pass.
    ///
    /// Placeholders are numbered from `$1` in the order they are written, and
    /// the returned values are in that same order.
    pub fn build(&self) -> (String, Vec<Primitive>) {
        let sql_cap = self.chunks.len().saturating_mul(8).max(128);
        let mut buf = String::with_capacity(sql_cap);
        let mut params = Vec::new();

        for (i, chunk) in self.chunks.iter().enumerate() {
            match chunk {
                SQLChunk::Param(value) => {
                    params.push(value.clone());
                    let _ = write!(buf, "${}", params.len());
                }
                _ => chunk.write(&mut buf),
            }

            if self.needs_space(i) {
                let _ = buf.write_char(' ');
            }
        }

        (buf, params)
    }

    /// Simplified spacing logic
    fn needs_space(&self, index: usize) -> bool {
        let Some(next) = self.chunks.get(index + 1) else {
            return false;
        };

        let current = &self.chunks[index];
        chunk_needs_space(current, next)
    }

    /// Returns an iterator over the bound values in render order
    pub fn params(&self) -> impl Iterator<Item = &Primitive> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            SQLChunk::Param(value) => Some(value),
            _ => None,
        })
    }
}

/// Canonical spacing logic for SQL chunk rendering.
pub(crate) fn chunk_needs_space(current: &SQLChunk, next: &SQLChunk) -> bool {
    // No space if current raw text ends with space or an opening paren
    if let SQLChunk::Raw(text) = current
        && (text.ends_with(' ') || text.ends_with('('))
    {
        return false;
    }

    // No space if next raw text starts with space, a closing paren or a comma
    if let SQLChunk::Raw(text) = next
        && (text.starts_with(' ') || text.starts_with(')') || text.starts_with(','))
    {
        return false;
    }

    match (current, next) {
        // Casts attach to the previous chunk
        (_, SQLChunk::Cast(_)) => false,
        // No space before closing/separator punctuation
        (_, SQLChunk::Token(Token::RPAREN | Token::RBRACKET | Token::COMMA | Token::DOT)) => false,
        // No space after opening punctuation
        (SQLChunk::Token(Token::LPAREN | Token::LBRACKET | Token::DOT), _) => false,
        // Space after comma
        (SQLChunk::Token(Token::COMMA), _) => true,
        // Function names hug their argument list: ANY(...)
        (SQLChunk::Token(t), SQLChunk::Token(Token::LPAREN)) if t.is_function() => false,
        // Array constructor: ARRAY[...]
        (SQLChunk::Token(Token::ARRAY), SQLChunk::Token(Token::LBRACKET)) => false,
        // Space after closing paren if next is word-like (e.g., ") AND")
        (SQLChunk::Token(Token::RPAREN | Token::RBRACKET), next) => next.is_word_like(),
        // Space before opening paren if preceded by word-like (e.g., "NOT (")
        (current, SQLChunk::Token(Token::LPAREN)) => current.is_word_like(),
        // Space around comparison operators
        (SQLChunk::Token(t), _) if t.is_operator() => true,
        (_, SQLChunk::Token(t)) if t.is_operator() => true,
        // Space between all word-like chunks
        _ => current.is_word_like() && next.is_word_like(),
    }
}

// ==================== trait implementations ====================

impl From<Token> for SQL {
    fn from(value: Token) -> Self {
        SQL::token(value)
    }
}

impl From<SQLChunk> for SQL {
    fn from(value: SQLChunk) -> Self {
        Self {
            chunks: smallvec::smallvec![value],
        }
    }
}

impl core::fmt::Display for SQL {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.sql())
    }
}

impl FromIterator<SQLChunk> for SQL {
    fn from_iter<I: IntoIterator<Item = SQLChunk>>(iter: I) -> Self {
        Self {
            chunks: SmallVec::from_iter(iter),
        }
    }
}

impl IntoIterator for SQL {
    type Item = SQLChunk;
    type IntoIter = smallvec::IntoIter<[SQLChunk; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_equals_param() {
        let sql = SQL::column("root", "name")
            .push(Token::EQ)
            .append(SQL::param("Acme"));
        let (text, params) = sql.build();
        assert_eq!(text, r#""root"."name" = $1"#);
        assert_eq!(params, vec![Primitive::from("Acme")]);
    }

    #[test]
    fn test_placeholders_follow_render_order() {
        let sql = SQL::join(
            [
                SQL::column("root", "a").push(Token::GT).append(SQL::param(1)),
                SQL::column("root", "b").push(Token::LT).append(SQL::param(2)),
            ],
            Token::AND,
        );
        let (text, params) = sql.build();
        assert_eq!(text, r#""root"."a" > $1 AND "root"."b" < $2"#);
        assert_eq!(params, vec![Primitive::Int(1), Primitive::Int(2)]);
    }

    #[test]
    fn test_any_array_with_casts() {
        let sql = SQL::column("root", "due")
            .push(Token::EQ)
            .append(SQL::func(
                Token::ANY,
                SQL::token(Token::ARRAY)
                    .push(Token::LBRACKET)
                    .append(SQL::param_list(
                        ["2024-01-01".into(), "2024-02-01".into()],
                        Some("date"),
                    ))
                    .push(Token::RBRACKET),
            ));
        assert_eq!(
            sql.sql(),
            r#""root"."due" = ANY(ARRAY[$1::date, $2::date])"#
        );
    }

    #[test]
    fn test_not_parens_spacing() {
        let sql = SQL::token(Token::NOT).append(
            SQL::column("root", "x")
                .push(Token::IS)
                .push(Token::NULL)
                .parens(),
        );
        assert_eq!(sql.sql(), r#"NOT ("root"."x" IS NULL)"#);
    }

    #[test]
    fn test_with_placeholders_splits_clause() {
        let sql = SQL::with_placeholders(
            "root.\"tenantId\" = ? AND root.\"region\" IN (?)",
            &["t-1".into(), "eu".into()],
        );
        let (text, params) = sql.build();
        assert_eq!(text, "root.\"tenantId\" = $1 AND root.\"region\" IN ($2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_ident_escapes_quotes() {
        assert_eq!(SQL::ident("we\"ird").sql(), r#""we""ird""#);
    }
}
