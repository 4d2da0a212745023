/// SQL keywords, operators and punctuation emitted by the query builder.
///
/// Everything a caller can influence travels as a parameter, so this set is
/// closed: only the renderer decides which keywords reach the statement text.
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Clauses
    SELECT,
    FROM,
    WHERE,
    ORDER,
    BY,
    LIMIT,
    AS,
    ON,
    INNER,
    LEFT,
    JOIN,

    // Ordering
    ASC,
    DESC,
    NULLS,
    FIRST,
    LAST,

    // Logic and predicates
    AND,
    OR,
    NOT,
    IS,
    NULL,
    DISTINCT,
    ILIKE,
    BETWEEN,
    TRUE,
    FALSE,

    // Functions and constructors
    ANY,
    ALL,
    ARRAY,
    COALESCE,
    ARRAY_TO_STRING,

    // Punctuation
    LPAREN,
    RPAREN,
    LBRACKET,
    RBRACKET,
    COMMA,
    DOT,
    STAR,

    // Comparison
    EQ,
    NE,
    LT,
    GT,
    LE,
    GE,
}

impl Token {
    /// Text written to the statement.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "SELECT",
            Token::FROM => "FROM",
            Token::WHERE => "WHERE",
            Token::ORDER => "ORDER",
            Token::BY => "BY",
            Token::LIMIT => "LIMIT",
            Token::AS => "AS",
            Token::ON => "ON",
            Token::INNER => "INNER",
            Token::LEFT => "LEFT",
            Token::JOIN => "JOIN",
            Token::ASC => "ASC",
            Token::DESC => "DESC",
            Token::NULLS => "NULLS",
            Token::FIRST => "FIRST",
            Token::LAST => "LAST",
            Token::AND => "AND",
            Token::OR => "OR",
            Token::NOT => "NOT",
            Token::IS => "IS",
            Token::NULL => "NULL",
            Token::DISTINCT => "DISTINCT",
            Token::ILIKE => "ILIKE",
            Token::BETWEEN => "BETWEEN",
            Token::TRUE => "TRUE",
            Token::FALSE => "FALSE",
            Token::ANY => "ANY",
            Token::ALL => "ALL",
            Token::ARRAY => "ARRAY",
            Token::COALESCE => "COALESCE",
            Token::ARRAY_TO_STRING => "array_to_string",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
            Token::LBRACKET => "[",
            Token::RBRACKET => "]",
            Token::COMMA => ",",
            Token::DOT => ".",
            Token::STAR => "*",
            Token::EQ => "=",
            Token::NE => "<>",
            Token::LT => "<",
            Token::GT => ">",
            Token::LE => "<=",
            Token::GE => ">=",
        }
    }

    /// Comparison operators, always surrounded by spaces.
    #[must_use]
    pub const fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::EQ | Token::NE | Token::LT | Token::GT | Token::LE | Token::GE
        )
    }

    /// Tokens written directly against their opening parenthesis: `ANY(`.
    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(
            self,
            Token::ANY | Token::ALL | Token::COALESCE | Token::ARRAY_TO_STRING
        )
    }

    /// Punctuation and operators; everything else needs a separating space.
    #[must_use]
    pub const fn is_punctuation(&self) -> bool {
        matches!(
            self,
            Token::LPAREN
                | Token::RPAREN
                | Token::LBRACKET
                | Token::RBRACKET
                | Token::COMMA
                | Token::DOT
        ) || self.is_operator()
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
