//! Parser and name resolver for filter scripts.
//!
//! Produces a tree in which every variable reference is already a slot
//! index and every call already points at its [`Builtin`].

use super::builtins::{self, Builtin};
use super::lexer::{Tok, Token};
use super::ScriptError;
use std::collections::HashMap;

/// Slots 0..3 hold `R`, `G`, `B`; 3..7 hold `X`, `Y`, `W`, `H`.
pub(crate) const BINDINGS: [&str; 7] = ["R", "G", "B", "X", "Y", "W", "H"];
/// First slot index used by `let` variables.
pub(crate) const FIRST_LOCAL: usize = BINDINGS.len();
const WRITABLE_BINDINGS: usize = 3;

/// Deepest expression or block nesting accepted.
const MAX_DEPTH: usize = 200;

const KEYWORDS: [&str; 4] = ["let", "if", "else", "return"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    fn from_tok(tok: &Tok) -> Option<Self> {
        Some(match tok {
            Tok::Plus => BinOp::Add,
            Tok::Minus => BinOp::Sub,
            Tok::Star => BinOp::Mul,
            Tok::Slash => BinOp::Div,
            Tok::Percent => BinOp::Rem,
            Tok::EqEq => BinOp::Eq,
            Tok::NotEq => BinOp::Ne,
            Tok::Lt => BinOp::Lt,
            Tok::Le => BinOp::Le,
            Tok::Gt => BinOp::Gt,
            Tok::Ge => BinOp::Ge,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Num(f64),
    Slot(usize),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Cond(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Builtin, Vec<Expr>),
}

#[derive(Debug, Clone)]
pub(crate) enum Stmt {
    /// `slot = value`, or `slot op= value` when `op` is set.
    Assign { slot: usize, op: Option<BinOp>, value: Expr },
    /// `let` introduces a fresh slot, unassigned unless `value` is set.
    Declare { slot: usize, value: Option<Expr> },
    If { cond: Expr, then: Vec<Stmt>, otherwise: Vec<Stmt> },
    Return,
    Expr(Expr),
}

/// A resolved script.
#[derive(Debug, Clone)]
pub(crate) struct Program {
    pub body: Vec<Stmt>,
    /// Names of `let` slots, indexed by `slot - FIRST_LOCAL`.
    pub locals: Vec<String>,
}

impl Program {
    pub fn slot_count(&self) -> usize {
        FIRST_LOCAL + self.locals.len()
    }

    pub fn slot_name(&self, slot: usize) -> &str {
        match slot.checked_sub(FIRST_LOCAL) {
            Some(i) => &self.locals[i],
            None => BINDINGS[slot],
        }
    }
}

pub(crate) fn parse(tokens: &[Token]) -> Result<Program, ScriptError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        scopes: vec![HashMap::new()],
        locals: Vec::new(),
    };
    let mut body = Vec::new();
    while parser.peek() != &Tok::Eof {
        if let Some(stmt) = parser.statement()? {
            body.push(stmt);
        }
    }
    Ok(Program {
        body,
        locals: parser.locals,
    })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    scopes: Vec<HashMap<String, usize>>,
    locals: Vec<String>,
}

impl Parser<'_> {
    fn token(&self) -> &Token {
        // The token list always ends with Eof and the parser never steps past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Tok {
        &self.token().tok
    }

    fn peek_at(&self, offset: usize) -> &Tok {
        let i = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[i].tok
    }

    fn advance(&mut self) -> Tok {
        let tok = self.peek().clone();
        if tok != Tok::Eof {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> ScriptError {
        ScriptError::Compile {
            line: token.line,
            column: token.column,
            message: message.into(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ScriptError {
        self.error_at(self.token(), message)
    }

    fn expect(&mut self, tok: Tok) -> Result<(), ScriptError> {
        if self.eat(&tok) {
            Ok(())
        } else {
            let found = self.peek().describe();
            Err(self.error(format!("expected {}, found {found}", tok.describe())))
        }
    }

    fn enter(&mut self) -> Result<(), ScriptError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("script is nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn is_keyword(&self, name: &str) -> bool {
        KEYWORDS.contains(&name)
    }

    fn resolve(&self, name: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
            .or_else(|| BINDINGS.iter().position(|b| *b == name))
    }

    fn constant(name: &str) -> Option<f64> {
        match name {
            "PI" => Some(std::f64::consts::PI),
            "E" => Some(std::f64::consts::E),
            _ => None,
        }
    }

    // ---- statements ----

    /// Parses one statement. Empty statements (`;`) yield `None`.
    fn statement(&mut self) -> Result<Option<Stmt>, ScriptError> {
        let stmt = match self.peek().clone() {
            Tok::Semi => {
                self.advance();
                return Ok(None);
            }
            Tok::Ident(name) if name == "let" => self.declaration()?,
            Tok::Ident(name) if name == "if" => return self.if_statement().map(Some),
            Tok::Ident(name) if name == "return" => {
                self.advance();
                Stmt::Return
            }
            Tok::Ident(name) if name == "else" => {
                return Err(self.error("'else' without a matching 'if'"));
            }
            Tok::Ident(name) if assign_op(self.peek_at(1)).is_some() => self.assignment(&name)?,
            _ => Stmt::Expr(self.expression()?),
        };
        self.end_statement()?;
        Ok(Some(stmt))
    }

    /// A simple statement ends at `;`, a line break, `}`, `else` or the end
    /// of the script.
    fn end_statement(&mut self) -> Result<(), ScriptError> {
        if self.eat(&Tok::Semi) {
            return Ok(());
        }
        let last_line = self.tokens[self.pos.saturating_sub(1)].line;
        let next = self.token();
        let ends = match &next.tok {
            Tok::RBrace | Tok::Eof => true,
            Tok::Ident(k) if k == "else" => true,
            _ => next.line > last_line,
        };
        if ends {
            Ok(())
        } else {
            let found = next.tok.describe();
            Err(self.error(format!("expected ';' or a line break before {found}")))
        }
    }

    fn declaration(&mut self) -> Result<Stmt, ScriptError> {
        self.advance();
        let token = self.token().clone();
        let name = match &token.tok {
            Tok::Ident(name) => name.clone(),
            other => {
                return Err(self.error(format!("expected variable name, found {}", other.describe())));
            }
        };
        if self.is_keyword(&name) {
            return Err(self.error(format!("'{name}' is a keyword")));
        }
        if BINDINGS.contains(&name.as_str()) || Self::constant(&name).is_some() {
            return Err(self.error(format!("'{name}' is a built-in name")));
        }
        self.advance();

        // The initializer is resolved before the name is in scope, so
        // `let k = k + 1` refers to an outer `k`.
        let value = if self.eat(&Tok::Assign) {
            Some(self.expression()?)
        } else {
            None
        };

        let slot = FIRST_LOCAL + self.locals.len();
        self.locals.push(name.clone());
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, slot);
        }
        Ok(Stmt::Declare { slot, value })
    }

    fn assignment(&mut self, name: &str) -> Result<Stmt, ScriptError> {
        let target = self.token().clone();
        self.advance();
        let op_tok = self.advance();
        let op = assign_op(&op_tok).flatten();

        let slot = match self.resolve(name) {
            Some(slot) if slot < WRITABLE_BINDINGS || slot >= FIRST_LOCAL => slot,
            Some(_) => {
                return Err(self.error_at(&target, format!("cannot assign to read-only '{name}'")));
            }
            None if Self::constant(name).is_some() => {
                return Err(self.error_at(&target, format!("cannot assign to read-only '{name}'")));
            }
            None => return Err(self.error_at(&target, format!("unknown identifier '{name}'"))),
        };
        let value = self.expression()?;
        Ok(Stmt::Assign { slot, op, value })
    }

    fn if_statement(&mut self) -> Result<Stmt, ScriptError> {
        self.advance();
        self.expect(Tok::LParen)?;
        let cond = self.expression()?;
        self.expect(Tok::RParen)?;
        let then = self.body()?;
        let otherwise = if matches!(self.peek(), Tok::Ident(k) if k == "else") {
            self.advance();
            self.body()?
        } else {
            Vec::new()
        };
        Ok(Stmt::If { cond, then, otherwise })
    }

    /// A braced block or a single statement, in its own scope.
    fn body(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.enter()?;
        self.scopes.push(HashMap::new());
        let mut stmts = Vec::new();
        if self.eat(&Tok::LBrace) {
            while !matches!(self.peek(), Tok::RBrace | Tok::Eof) {
                if let Some(stmt) = self.statement()? {
                    stmts.push(stmt);
                }
            }
            self.expect(Tok::RBrace)?;
        } else if let Some(stmt) = self.statement()? {
            stmts.push(stmt);
        }
        self.scopes.pop();
        self.leave(1);
        Ok(stmts)
    }

    // ---- expressions ----

    fn expression(&mut self) -> Result<Expr, ScriptError> {
        self.enter()?;
        let cond = self.or()?;
        let expr = if self.eat(&Tok::Question) {
            let then = self.expression()?;
            self.expect(Tok::Colon)?;
            let otherwise = self.expression()?;
            Expr::Cond(Box::new(cond), Box::new(then), Box::new(otherwise))
        } else {
            cond
        };
        self.leave(1);
        Ok(expr)
    }

    fn or(&mut self) -> Result<Expr, ScriptError> {
        let mut lhs = self.and()?;
        let mut chain = 0;
        while self.eat(&Tok::OrOr) {
            self.enter()?;
            chain += 1;
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        self.leave(chain);
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ScriptError> {
        let mut lhs = self.binary(0)?;
        let mut chain = 0;
        while self.eat(&Tok::AndAnd) {
            self.enter()?;
            chain += 1;
            let rhs = self.binary(0)?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        self.leave(chain);
        Ok(lhs)
    }

    /// Left-associative binary levels, loosest first.
    fn binary(&mut self, level: usize) -> Result<Expr, ScriptError> {
        const LEVELS: [&[BinOp]; 4] = [
            &[BinOp::Eq, BinOp::Ne],
            &[BinOp::Lt, BinOp::Le, BinOp::Gt, BinOp::Ge],
            &[BinOp::Add, BinOp::Sub],
            &[BinOp::Mul, BinOp::Div, BinOp::Rem],
        ];
        let Some(ops) = LEVELS.get(level) else {
            return self.unary();
        };

        let mut lhs = self.binary(level + 1)?;
        let mut chain = 0;
        while let Some(op) = BinOp::from_tok(self.peek()).filter(|op| ops.contains(op)) {
            self.advance();
            self.enter()?;
            chain += 1;
            let rhs = self.binary(level + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.leave(chain);
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ScriptError> {
        let wrap: fn(Box<Expr>) -> Expr = match self.peek().clone() {
            Tok::Minus => Expr::Neg,
            Tok::Bang => Expr::Not,
            Tok::Plus => {
                self.advance();
                self.enter()?;
                let operand = self.unary()?;
                self.leave(1);
                return Ok(operand);
            }
            _ => return self.power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.unary()?;
        self.leave(1);
        Ok(wrap(Box::new(operand)))
    }

    fn power(&mut self) -> Result<Expr, ScriptError> {
        let base = self.primary()?;
        if self.eat(&Tok::StarStar) {
            self.enter()?;
            let exponent = self.unary()?;
            self.leave(1);
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ScriptError> {
        let token = self.token().clone();
        match &token.tok {
            Tok::Number(n) => {
                self.advance();
                Ok(Expr::Num(*n))
            }
            Tok::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(Tok::RParen)?;
                Ok(inner)
            }
            Tok::Ident(name) if self.peek_at(1) == &Tok::LParen => self.call(&token, name),
            Tok::Ident(name) => {
                if self.is_keyword(name) {
                    return Err(self.error(format!("unexpected keyword '{name}'")));
                }
                self.advance();
                if let Some(slot) = self.resolve(name) {
                    Ok(Expr::Slot(slot))
                } else if let Some(value) = Self::constant(name) {
                    Ok(Expr::Num(value))
                } else {
                    Err(self.error_at(&token, format!("unknown identifier '{name}'")))
                }
            }
            other => Err(self.error(format!("expected expression, found {}", other.describe()))),
        }
    }

    fn call(&mut self, token: &Token, name: &str) -> Result<Expr, ScriptError> {
        let Some(builtin) = builtins::lookup(name) else {
            let known = builtins::names().collect::<Vec<_>>().join(", ");
            return Err(self.error_at(token, format!("unknown function '{name}'; available: {known}")));
        };
        self.advance();
        self.expect(Tok::LParen)?;

        let mut args = Vec::new();
        if !self.eat(&Tok::RParen) {
            loop {
                args.push(self.expression()?);
                if self.eat(&Tok::Comma) {
                    continue;
                }
                self.expect(Tok::RParen)?;
                break;
            }
        }

        if args.len() != builtin.arity {
            let plural = if builtin.arity == 1 { "" } else { "s" };
            return Err(self.error_at(
                token,
                format!(
                    "'{name}' takes {} argument{plural}, got {}",
                    builtin.arity,
                    args.len()
                ),
            ));
        }
        Ok(Expr::Call(builtin, args))
    }
}

/// Maps an assignment token to its compound operator.
///
/// `Some(None)` is plain `=`; `None` means the token is not an assignment.
fn assign_op(tok: &Tok) -> Option<Option<BinOp>> {
    match tok {
        Tok::Assign => Some(None),
        Tok::PlusAssign => Some(Some(BinOp::Add)),
        Tok::MinusAssign => Some(Some(BinOp::Sub)),
        Tok::StarAssign => Some(Some(BinOp::Mul)),
        Tok::SlashAssign => Some(Some(BinOp::Div)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::lexer::tokenize;

    fn parse_src(src: &str) -> Result<Program, ScriptError> {
        parse(&tokenize(src)?)
    }

    #[test]
    fn resolves_bindings_to_fixed_slots() {
        let program = parse_src("B = X").unwrap();
        match &program.body[..] {
            [Stmt::Assign { slot: 2, op: None, value: Expr::Slot(3) }] => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn locals_get_fresh_slots() {
        let program = parse_src("let a = 1; let a = a + 1; R = a").unwrap();
        assert_eq!(program.locals, vec!["a", "a"]);
        assert_eq!(program.slot_count(), FIRST_LOCAL + 2);
        assert_eq!(program.slot_name(FIRST_LOCAL + 1), "a");
        assert_eq!(program.slot_name(1), "G");
        match &program.body[2] {
            Stmt::Assign { value: Expr::Slot(s), .. } => assert_eq!(*s, FIRST_LOCAL + 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn block_scope_ends() {
        let err = parse_src("if (1) { let t = 1 } R = t").unwrap_err();
        assert_eq!(err.to_string(), "1:26: unknown identifier 't'");
    }

    #[test]
    fn compound_assignment_op() {
        let program = parse_src("G *= 2").unwrap();
        assert!(matches!(
            program.body[0],
            Stmt::Assign { slot: 1, op: Some(BinOp::Mul), .. }
        ));
    }

    #[test]
    fn keyword_misuse() {
        assert!(parse_src("let if = 1").is_err());
        assert!(parse_src("else R = 1").is_err());
        assert!(parse_src("R = return").is_err());
        assert!(parse_src("if R > 1 { }").is_err());
    }

    #[test]
    fn statements_need_a_separator_on_one_line() {
        let err = parse_src("R = 2R").unwrap_err();
        assert_eq!(err.to_string(), "1:6: expected ';' or a line break before 'R'");
        assert!(parse_src("R = 1 G = 2").is_err());
        assert!(parse_src("let k = 1 2").is_err());

        assert!(parse_src("R = 2; R").is_ok());
        assert!(parse_src("R = 2\nG = 3").is_ok());
        assert!(parse_src("if (1) { R = 2 } G = 3").is_ok());
        assert!(parse_src("if (R > 1) R = 0 else G = 0").is_ok());
        assert!(parse_src("return").is_ok());
    }

    #[test]
    fn long_operator_chains_are_bounded() {
        let ok = format!("R = 1{}", " + 1".repeat(150));
        assert!(parse_src(&ok).is_ok());
        let deep = format!("R = 1{}", " + 1".repeat(500));
        assert!(parse_src(&deep).is_err());
    }
}
