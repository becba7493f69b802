//! SQL keywords and operator symbols.

/// SQL keyword or operator rendered verbatim.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Statements
    SELECT,
    INSERT,
    UPDATE,
    DELETE,
    CREATE,
    DROP,

    // Clauses
    FROM,
    INTO,
    VALUES,
    DEFAULT_VALUES,
    SET,
    WHERE,
    GROUP_BY,
    HAVING,
    ORDER_BY,
    LIMIT,
    OFFSET,
    FOR_UPDATE,
    RETURNING,
    ON,
    JOIN,
    INNER_JOIN,
    LEFT_JOIN,
    RIGHT_JOIN,
    TABLE,
    IF_EXISTS,
    IF_NOT_EXISTS,
    CASCADE,
    RESTRICT,

    // Expressions
    AS,
    DISTINCT,
    AND,
    OR,
    NOT,
    BETWEEN,
    NOT_BETWEEN,
    IN,
    NOT_IN,
    ANY,
    EXISTS,
    NOT_EXISTS,
    LIKE,
    NOT_LIKE,
    IS,
    IS_NOT,
    NULL,
    ASC,
    DESC,
    STAR,

    // DDL
    CONSTRAINT,
    PRIMARY_KEY,
    UNIQUE,
    FOREIGN_KEY,
    REFERENCES,
    CHECK,
    NOT_NULL,
    DEFAULT,
    ON_DELETE,
    ON_UPDATE,

    // Operators
    EQ,
    NE,
    LT,
    LE,
    GT,
    GE,
    PLUS,
    MINUS,
    STAR_OP,
    SLASH,
}

impl Token {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "SELECT",
            Token::INSERT => "INSERT",
            Token::UPDATE => "UPDATE",
            Token::DELETE => "DELETE",
            Token::CREATE => "CREATE",
            Token::DROP => "DROP",
            Token::FROM => "FROM",
            Token::INTO => "INTO",
            Token::VALUES => "VALUES",
            Token::DEFAULT_VALUES => "DEFAULT VALUES",
            Token::SET => "SET",
            Token::WHERE => "WHERE",
            Token::GROUP_BY => "GROUP BY",
            Token::HAVING => "HAVING",
            Token::ORDER_BY => "ORDER BY",
            Token::LIMIT => "LIMIT",
            Token::OFFSET => "OFFSET",
            Token::FOR_UPDATE => "FOR UPDATE",
            Token::RETURNING => "RETURNING",
            Token::ON => "ON",
            Token::JOIN => "JOIN",
            Token::INNER_JOIN => "INNER JOIN",
            Token::LEFT_JOIN => "LEFT JOIN",
            Token::RIGHT_JOIN => "RIGHT JOIN",
            Token::TABLE => "TABLE",
            Token::IF_EXISTS => "IF EXISTS",
            Token::IF_NOT_EXISTS => "IF NOT EXISTS",
            Token::CASCADE => "CASCADE",
            Token::RESTRICT => "RESTRICT",
            Token::AS => "AS",
            Token::DISTINCT => "DISTINCT",
            Token::AND => "AND",
            Token::OR => "OR",
            Token::NOT => "NOT",
            Token::BETWEEN => "BETWEEN",
            Token::NOT_BETWEEN => "NOT BETWEEN",
            Token::IN => "IN",
            Token::NOT_IN => "NOT IN",
            Token::ANY => "ANY",
            Token::EXISTS => "EXISTS",
            Token::NOT_EXISTS => "NOT EXISTS",
            Token::LIKE => "LIKE",
            Token::NOT_LIKE => "NOT LIKE",
            Token::IS => "IS",
            Token::IS_NOT => "IS NOT",
            Token::NULL => "NULL",
            Token::ASC => "ASC",
            Token::DESC => "DESC",
            Token::STAR => "*",
            Token::CONSTRAINT => "CONSTRAINT",
            Token::PRIMARY_KEY => "PRIMARY KEY",
            Token::UNIQUE => "UNIQUE",
            Token::FOREIGN_KEY => "FOREIGN KEY",
            Token::REFERENCES => "REFERENCES",
            Token::CHECK => "CHECK",
            Token::NOT_NULL => "NOT NULL",
            Token::DEFAULT => "DEFAULT",
            Token::ON_DELETE => "ON DELETE",
            Token::ON_UPDATE => "ON UPDATE",
            Token::EQ => "=",
            Token::NE => "<>",
            Token::LT => "<",
            Token::LE => "<=",
            Token::GT => ">",
            Token::GE => ">=",
            Token::PLUS => "+",
            Token::MINUS => "-",
            Token::STAR_OP => "*",
            Token::SLASH => "/",
        }
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
