use crate::frontend::lexer::Spanned;
use crate::frontend::token::Token;

/// Prints a lexed token stream, one token per line, for `--tokens`.
pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints source spelling instead of Debug
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Spanned]) {
        print!("{}", self.render(tokens));
    }

    pub fn render(&self, tokens: &[Spanned]) -> String {
        tokens.iter().map(|s| self.line(s) + "\n").collect()
    }

    fn line(&self, s: &Spanned) -> String {
        let kind = Self::kind(&s.token);
        let colr = if self.color { Self::color(&s.token) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        let text = if self.show_debug_repr {
            format!("{:?}", s.token)
        } else {
            match &s.token {
                Token::Comment(c) => format!("-- {}", c),
                other => other.describe(),
            }
        };

        format!(
            "[{:02}:{:02}] {}{:<8} {}{}",
            s.span.line, s.span.col, colr, kind, text, reset
        )
    }

    fn kind(t: &Token) -> &'static str {
        use Token::*;
        match t {
            Newline => "NEWLINE",
            Comment(_) => "COMMENT",
            Eof => "EOF",

            Number(_) => "NUMBER",
            String(_) => "STRING",
            True | False => "BOOL",

            Ident(_) => "IDENT",

            LParen | RParen => "PAREN",
            LBracket | RBracket => "BRACKET",
            LBrace | RBrace => "BRACE",

            Colon | Comma | Dot | Assign => "PUNCT",
            NotEq => "CMP",

            _ => "KEYWORD",
        }
    }

    fn color(t: &Token) -> &'static str {
        use Token::*;
        match t {
            Newline | Comment(_) | Eof => Self::DIM,
            String(_) => Self::GRN,
            Number(_) | True | False => Self::CYN,
            Ident(_) => Self::YEL,
            NotEq | Assign => Self::MAG,
            _ => Self::RESET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    #[test]
    fn test_plain_debug_lines() {
        let tokens = Lexer::new("x = 1").tokenize().unwrap();
        let out = TokenDumper::new().no_color().render(&tokens);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "[01:01] IDENT    Ident(\"x\")");
        assert_eq!(lines[1], "[01:03] PUNCT    Assign");
        assert_eq!(lines[2], "[01:05] NUMBER   Number(1)");
        assert!(lines[3].contains("EOF"));
    }

    #[test]
    fn test_pretty_uses_source_spelling() {
        let tokens = Lexer::new("if a ~= b then end -- done").tokenize().unwrap();
        let out = TokenDumper::new().no_color().pretty().render(&tokens);
        assert!(out.contains("KEYWORD  'if'"));
        assert!(out.contains("CMP      '~='"));
        assert!(out.contains("COMMENT  -- done"));
    }

    #[test]
    fn test_color_wraps_lines() {
        let tokens = Lexer::new("\"s\"").tokenize().unwrap();
        let out = TokenDumper::new().render(&tokens);
        assert!(out.starts_with("[01:01] \x1b[32mSTRING"));
        assert!(out.lines().all(|l| l.ends_with("\x1b[0m")));
    }
}
