use crate::frontend::lexer::{Span, Spanned};
use crate::frontend::parser_error::ParserError;
use crate::frontend::token::Token;
use crate::lang::node::{BinOp, Literal, Node};

/// Recursive-descent parser for Moonlet.
///
/// The parser consumes a stream of lexed `Spanned` tokens and produces the
/// ordered list of top-level statements. It looks at most one token ahead.
///
/// Notes:
/// - Comments and newlines are filtered out in `Parser::new`.
/// - There is no error recovery: the first structural problem aborts the
///   whole parse.
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Span of the most recently consumed token.
    ///
    /// Used to provide stable source locations for errors that occur after
    /// advancing past the last token or at end-of-file.
    last_span: Option<Span>,
}

impl Parser {
    /// Creates a new parser from lexer output.
    pub fn new(tokens: Vec<Spanned>) -> Self {
        let tokens: Vec<Spanned> = tokens
            .into_iter()
            .filter(|t| !matches!(t.token, Token::Comment(_) | Token::Newline))
            .collect();
        Parser {
            tokens,
            pos: 0,
            last_span: None,
        }
    }

    /// Returns the current token without consuming it.
    fn current(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    /// Advances the token stream by one and returns the consumed token.
    fn advance(&mut self) -> Option<&Spanned> {
        let token = self.tokens.get(self.pos);
        if let Some(s) = token {
            self.last_span = Some(s.span.clone());
        }
        self.pos += 1;
        token
    }

    /// Peeks the current token kind without consuming it.
    ///
    /// A missing token reads as `Eof` so callers only match one end marker.
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .map(|s| &s.token)
            .unwrap_or(&Token::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    /// Constructs a `ParserError` at the most relevant location.
    ///
    /// Priority:
    /// 1. If `current()` exists, use its span.
    /// 2. Else, use `last_span`.
    /// 3. Else, default to (1,1) for truly empty input.
    fn error(&self, message: &str) -> ParserError {
        let (line, col) = match (self.current(), &self.last_span) {
            (Some(spanned), _) => (spanned.span.line, spanned.span.col),
            (None, Some(span)) => (span.line, span.col),
            (None, None) => (1, 1),
        };
        ParserError {
            message: message.to_string(),
            line,
            col,
        }
    }

    fn unexpected(&self, expected: &str) -> ParserError {
        self.error(&format!(
            "expected {}, found {}",
            expected,
            self.peek().describe()
        ))
    }

    /// Consumes `token` or fails with `expected <what>`.
    fn expect(&mut self, token: Token, what: &str) -> Result<(), ParserError> {
        if *self.peek() == token {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParserError> {
        match self.peek() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Parses a complete program: statements until `Eof`.
    pub fn parse(&mut self) -> Result<Vec<Node>, ParserError> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        log::debug!("parsed {} top-level statements", statements.len());
        Ok(statements)
    }

    /// Parses statements up to and including the closing `end`.
    fn parse_block(&mut self, construct: &str) -> Result<Vec<Node>, ParserError> {
        let mut body = Vec::new();
        loop {
            match self.peek() {
                Token::End => {
                    self.advance();
                    return Ok(body);
                }
                Token::Eof => {
                    return Err(self.error(&format!(
                        "unexpected EOF, expected 'end' to close '{}'",
                        construct
                    )));
                }
                _ => body.push(self.parse_statement()?),
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Node, ParserError> {
        match self.peek() {
            Token::Local => self.parse_local(),
            Token::For => self.parse_for(),
            Token::Function => self.parse_function(),
            Token::Return => {
                self.advance();
                let value = self.parse_expression()?;
                Ok(Node::Return(Box::new(value)))
            }
            Token::If => self.parse_if(),
            Token::Eof => Err(self.error("unexpected EOF, expected statement")),
            _ => {
                let expr = self.parse_expression()?;
                if matches!(self.peek(), Token::Assign) {
                    self.parse_assignment(false, expr)
                } else {
                    Ok(expr)
                }
            }
        }
    }

    /// ```text
    /// local <name> = <expr>
    /// ```
    fn parse_local(&mut self) -> Result<Node, ParserError> {
        self.advance(); // consume 'local'
        let name = self.expect_ident("variable name after 'local'")?;
        if !matches!(self.peek(), Token::Assign) {
            return Err(self.unexpected("'=' after local variable name"));
        }
        self.parse_assignment(true, Node::var(name))
    }

    /// Parses `= <expr>` for an already parsed target.
    ///
    /// Only a variable reference or an index expression can be assigned to.
    fn parse_assignment(&mut self, local: bool, target: Node) -> Result<Node, ParserError> {
        if !matches!(
            target,
            Node::Value(Literal::VariableRef(_)) | Node::Index { .. }
        ) {
            return Err(self.error(&format!("cannot assign to {}", target.kind_name())));
        }
        self.expect(Token::Assign, "'='")?;
        let value = self.parse_expression()?;
        Ok(Node::Assignment {
            local,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// ```text
    /// for <name> = <start>, <bound> do <body...> end
    /// ```
    fn parse_for(&mut self) -> Result<Node, ParserError> {
        self.advance(); // consume 'for'
        let name = self.expect_ident("loop variable after 'for'")?;
        let initializer = self.parse_assignment(true, Node::var(name))?;
        self.expect(Token::Comma, "',' after loop start value")?;
        let range = self.parse_expression()?;
        self.expect(Token::Do, "'do' after loop bound")?;
        let body = self.parse_block("for")?;
        Ok(Node::ForLoop {
            initializer: Box::new(initializer),
            range: Box::new(range),
            body,
        })
    }

    /// ```text
    /// function <name>(<param>, ...) <body...> end
    /// ```
    fn parse_function(&mut self) -> Result<Node, ParserError> {
        self.advance(); // consume 'function'
        let name = self.expect_ident("function name after 'function'")?;
        self.expect(Token::LParen, "'(' after function name")?;

        let mut params = Vec::new();
        if !matches!(self.peek(), Token::RParen) {
            loop {
                params.push(self.expect_ident("parameter name")?);
                if matches!(self.peek(), Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')' after parameter list")?;

        let body = self.parse_block("function")?;
        Ok(Node::Function { name, params, body })
    }

    /// ```text
    /// if <cond> then <body...> end
    /// ```
    fn parse_if(&mut self) -> Result<Node, ParserError> {
        self.advance(); // consume 'if'
        let condition = self.parse_expression()?;
        self.expect(Token::Then, "'then' after if condition")?;
        let body = self.parse_block("if")?;
        Ok(Node::IfThen {
            condition: Box::new(condition),
            body,
        })
    }

    /// ```text
    /// expression := postfix ( '~=' postfix )?
    /// ```
    ///
    /// A second `~=` is rejected: comparisons do not chain.
    fn parse_expression(&mut self) -> Result<Node, ParserError> {
        let lhs = self.parse_postfix()?;
        if !matches!(self.peek(), Token::NotEq) {
            return Ok(lhs);
        }
        self.advance(); // consume '~='
        let rhs = self.parse_postfix()?;
        if matches!(self.peek(), Token::NotEq) {
            return Err(self.error("comparison operators cannot be chained"));
        }
        Ok(Node::BinaryOperation {
            op: BinOp::NotEq,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// A primary value plus, for bare identifiers, at most one suffix:
    /// `( args )`, `. name ( args )`, `: name ( args )` or `[ index ]`.
    fn parse_postfix(&mut self) -> Result<Node, ParserError> {
        let primary = self.parse_primary()?;
        let name = match &primary {
            Node::Value(Literal::VariableRef(name)) => name.clone(),
            _ => return Ok(primary),
        };

        match self.peek() {
            Token::LParen => {
                let args = self.parse_args()?;
                Ok(Node::Call {
                    receiver: None,
                    function: name,
                    args,
                })
            }
            Token::Dot | Token::Colon => {
                self.advance(); // consume '.' / ':'
                let function = self.expect_ident("method name")?;
                if !matches!(self.peek(), Token::LParen) {
                    return Err(self.unexpected("'(' after method name"));
                }
                let args = self.parse_args()?;
                Ok(Node::Call {
                    receiver: Some(name),
                    function,
                    args,
                })
            }
            Token::LBracket => {
                self.advance(); // consume '['
                let index = self.parse_expression()?;
                self.expect(Token::RBracket, "']' after index")?;
                Ok(Node::Index {
                    base: name,
                    index: Box::new(index),
                })
            }
            _ => Ok(primary),
        }
    }

    /// ```text
    /// ( <expr>, <expr>, ... )
    /// ```
    fn parse_args(&mut self) -> Result<Vec<Node>, ParserError> {
        self.advance(); // consume '('
        let mut args = Vec::new();
        if !matches!(self.peek(), Token::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if matches!(self.peek(), Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')' after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Node, ParserError> {
        let literal = match self.peek() {
            Token::Number(n) => Literal::Number(*n),
            Token::String(s) => Literal::String(s.clone()),
            Token::Ident(name) => Literal::VariableRef(name.clone()),
            Token::True => Literal::Boolean(true),
            Token::False => Literal::Boolean(false),
            Token::LBrace => {
                self.advance(); // consume '{'
                if !matches!(self.peek(), Token::RBrace) {
                    return Err(self.error("table constructors must be empty: expected '}'"));
                }
                Literal::Table
            }
            Token::Eof => return Err(self.error("unexpected EOF, expected expression")),
            other => {
                return Err(self.error(&format!(
                    "unexpected token: {}, expected expression",
                    other.describe()
                )));
            }
        };
        self.advance();
        Ok(Node::Value(literal))
    }
}
