#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(i64),
    String(std::string::String),

    // Identifier
    Ident(std::string::String),

    // Keywords
    Do,
    Else,
    End,
    False,
    For,
    Function,
    If,
    Local,
    Return,
    Then,
    True,

    // Symbols
    Colon,  // :
    Comma,  // ,
    Dot,    // .
    Assign, // =
    NotEq,  // ~=

    // Delimiters
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }

    // Special
    Comment(std::string::String),
    Newline,
    Eof,
}

impl Token {
    /// Source spelling used in parser diagnostics.
    pub fn describe(&self) -> std::string::String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Do => "'do'".into(),
            Token::Else => "'else'".into(),
            Token::End => "'end'".into(),
            Token::False => "'false'".into(),
            Token::For => "'for'".into(),
            Token::Function => "'function'".into(),
            Token::If => "'if'".into(),
            Token::Local => "'local'".into(),
            Token::Return => "'return'".into(),
            Token::Then => "'then'".into(),
            Token::True => "'true'".into(),
            Token::Colon => "':'".into(),
            Token::Comma => "','".into(),
            Token::Dot => "'.'".into(),
            Token::Assign => "'='".into(),
            Token::NotEq => "'~='".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::LBracket => "'['".into(),
            Token::RBracket => "']'".into(),
            Token::LBrace => "'{'".into(),
            Token::RBrace => "'}'".into(),
            Token::Comment(_) => "comment".into(),
            Token::Newline => "newline".into(),
            Token::Eof => "end of input".into(),
        }
    }
}
