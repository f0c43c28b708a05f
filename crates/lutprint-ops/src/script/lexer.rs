//! Tokenizer for filter scripts.

use super::ScriptError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Bang,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Question,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Eof,
}

impl Tok {
    pub(crate) fn describe(&self) -> String {
        match self {
            Tok::Number(n) => format!("number {n}"),
            Tok::Ident(name) => format!("'{name}'"),
            Tok::Eof => "end of script".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Tok::Plus => "+",
            Tok::Minus => "-",
            Tok::Star => "*",
            Tok::StarStar => "**",
            Tok::Slash => "/",
            Tok::Percent => "%",
            Tok::Bang => "!",
            Tok::Assign => "=",
            Tok::PlusAssign => "+=",
            Tok::MinusAssign => "-=",
            Tok::StarAssign => "*=",
            Tok::SlashAssign => "/=",
            Tok::EqEq => "==",
            Tok::NotEq => "!=",
            Tok::Lt => "<",
            Tok::Le => "<=",
            Tok::Gt => ">",
            Tok::Ge => ">=",
            Tok::AndAnd => "&&",
            Tok::OrOr => "||",
            Tok::Question => "?",
            Tok::Colon => ":",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::Comma => ",",
            Tok::Semi => ";",
            Tok::Number(_) | Tok::Ident(_) | Tok::Eof => "",
        }
    }
}

/// A token with its 1-based source position.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub tok: Tok,
    pub line: usize,
    pub column: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            src,
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next().map(|(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.src.len(), |&(i, _)| i)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> ScriptError {
        ScriptError::Compile {
            line,
            column,
            message: message.into(),
        }
    }

    /// Skips whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) -> Result<(), ScriptError> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error(line, column, "unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_number(&mut self, line: usize, column: usize) -> Result<Tok, ScriptError> {
        let start = self.offset();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        // Exponent only when followed by digits, so `2E` stays `2` then `E`.
        if matches!(self.peek(), Some('e' | 'E')) {
            let after = self.peek_second();
            let signed_digit = {
                let mut it = self.chars.clone();
                it.next();
                it.next();
                it.next().is_some_and(|(_, c)| c.is_ascii_digit())
            };
            if after.is_some_and(|c| c.is_ascii_digit())
                || (matches!(after, Some('+' | '-')) && signed_digit)
            {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        let end = self.offset();
        let text = &self.src[start..end];
        text.parse::<f64>()
            .map(Tok::Number)
            .map_err(|_| self.error(line, column, format!("invalid number '{text}'")))
    }

    fn read_ident(&mut self) -> Tok {
        let start = self.offset();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        let end = self.offset();
        Tok::Ident(self.src[start..end].to_string())
    }

    /// Consumes `next` if it follows, returning `yes`, else `no`.
    fn pick(&mut self, next: char, yes: Tok, no: Tok) -> Tok {
        if self.peek() == Some(next) {
            self.bump();
            yes
        } else {
            no
        }
    }

    fn next_token(&mut self) -> Result<Token, ScriptError> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            return Ok(Token { tok: Tok::Eof, line, column });
        };

        let tok = match c {
            '0'..='9' | '.' => self.read_number(line, column)?,
            'a'..='z' | 'A'..='Z' | '_' => self.read_ident(),
            _ => {
                self.bump();
                match c {
                    '+' => self.pick('=', Tok::PlusAssign, Tok::Plus),
                    '-' => self.pick('=', Tok::MinusAssign, Tok::Minus),
                    '*' => {
                        if self.peek() == Some('*') {
                            self.bump();
                            Tok::StarStar
                        } else {
                            self.pick('=', Tok::StarAssign, Tok::Star)
                        }
                    }
                    '/' => self.pick('=', Tok::SlashAssign, Tok::Slash),
                    '%' => Tok::Percent,
                    '!' => self.pick('=', Tok::NotEq, Tok::Bang),
                    '=' => self.pick('=', Tok::EqEq, Tok::Assign),
                    '<' => self.pick('=', Tok::Le, Tok::Lt),
                    '>' => self.pick('=', Tok::Ge, Tok::Gt),
                    '&' if self.peek() == Some('&') => {
                        self.bump();
                        Tok::AndAnd
                    }
                    '|' if self.peek() == Some('|') => {
                        self.bump();
                        Tok::OrOr
                    }
                    '?' => Tok::Question,
                    ':' => Tok::Colon,
                    '(' => Tok::LParen,
                    ')' => Tok::RParen,
                    '{' => Tok::LBrace,
                    '}' => Tok::RBrace,
                    ',' => Tok::Comma,
                    ';' => Tok::Semi,
                    other => {
                        return Err(self.error(line, column, format!("unexpected character '{other}'")));
                    }
                }
            }
        };
        Ok(Token { tok, line, column })
    }
}

/// Splits `src` into tokens, ending with [`Tok::Eof`].
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, ScriptError> {
    let mut lexer = Lexer::new(src);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.tok == Tok::Eof;
        out.push(token);
        if done {
            return Ok(out);
        }
    }
}
