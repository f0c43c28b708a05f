//! Tree-walking evaluator for compiled scripts.

use super::parser::{BinOp, Expr, Program, Stmt, FIRST_LOCAL};
use super::{PixelInput, ScriptError};

/// Runs a compiled script, one pixel at a time.
///
/// Holds the variable slots so repeated runs over a buffer reuse one
/// allocation.
#[derive(Debug)]
pub struct Evaluator<'a> {
    program: &'a Program,
    slots: Vec<f64>,
    assigned: Vec<bool>,
}

enum Flow {
    Next,
    Return,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(program: &'a Program) -> Self {
        let count = program.slot_count();
        Self {
            program,
            slots: vec![0.0; count],
            assigned: vec![false; count],
        }
    }

    /// Runs the script on one pixel and returns the final `R`, `G`, `B`.
    ///
    /// Values are returned as computed: no rounding, clamping or
    /// non-finite handling happens here.
    pub fn run(&mut self, input: PixelInput) -> Result<[f64; 3], ScriptError> {
        let PixelInput { r, g, b, x, y, w, h } = input;
        self.slots[..FIRST_LOCAL].copy_from_slice(&[r, g, b, x, y, w, h]);
        self.assigned[..FIRST_LOCAL].fill(true);
        self.assigned[FIRST_LOCAL..].fill(false);

        let program = self.program;
        self.block(&program.body)?;
        Ok([self.slots[0], self.slots[1], self.slots[2]])
    }

    fn block(&mut self, stmts: &[Stmt]) -> Result<Flow, ScriptError> {
        for stmt in stmts {
            if let Flow::Return = self.statement(stmt)? {
                return Ok(Flow::Return);
            }
        }
        Ok(Flow::Next)
    }

    fn statement(&mut self, stmt: &Stmt) -> Result<Flow, ScriptError> {
        match stmt {
            Stmt::Assign { slot, op, value } => {
                let rhs = self.expr(value)?;
                let result = match op {
                    Some(op) => binary(*op, self.read(*slot)?, rhs),
                    None => rhs,
                };
                self.write(*slot, result);
            }
            Stmt::Declare { slot, value } => match value {
                Some(value) => {
                    let v = self.expr(value)?;
                    self.write(*slot, v);
                }
                None => self.assigned[*slot] = false,
            },
            Stmt::If { cond, then, otherwise } => {
                let branch = if truthy(self.expr(cond)?) { then } else { otherwise };
                return self.block(branch);
            }
            Stmt::Return => return Ok(Flow::Return),
            Stmt::Expr(expr) => {
                self.expr(expr)?;
            }
        }
        Ok(Flow::Next)
    }

    fn read(&self, slot: usize) -> Result<f64, ScriptError> {
        if self.assigned[slot] {
            Ok(self.slots[slot])
        } else {
            Err(ScriptError::Runtime(format!(
                "variable '{}' read before assignment",
                self.program.slot_name(slot)
            )))
        }
    }

    fn write(&mut self, slot: usize, value: f64) {
        self.slots[slot] = value;
        self.assigned[slot] = true;
    }

    fn expr(&self, expr: &Expr) -> Result<f64, ScriptError> {
        Ok(match expr {
            Expr::Num(n) => *n,
            Expr::Slot(slot) => self.read(*slot)?,
            Expr::Neg(e) => -self.expr(e)?,
            Expr::Not(e) => bool_value(!truthy(self.expr(e)?)),
            Expr::Binary(op, l, r) => binary(*op, self.expr(l)?, self.expr(r)?),
            Expr::And(l, r) => bool_value(truthy(self.expr(l)?) && truthy(self.expr(r)?)),
            Expr::Or(l, r) => bool_value(truthy(self.expr(l)?) || truthy(self.expr(r)?)),
            Expr::Cond(c, t, f) => {
                if truthy(self.expr(c)?) {
                    self.expr(t)?
                } else {
                    self.expr(f)?
                }
            }
            Expr::Call(builtin, args) => {
                let mut values = [0.0f64; 3];
                for (value, arg) in values.iter_mut().zip(args) {
                    *value = self.expr(arg)?;
                }
                (builtin.eval)(&values[..args.len()])
            }
        })
    }
}

/// Nonzero and not NaN.
fn truthy(v: f64) -> bool {
    v != 0.0 && !v.is_nan()
}

fn bool_value(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn binary(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Rem => a % b,
        BinOp::Pow => a.powf(b),
        BinOp::Eq => bool_value(a == b),
        BinOp::Ne => bool_value(a != b),
        BinOp::Lt => bool_value(a < b),
        BinOp::Le => bool_value(a <= b),
        BinOp::Gt => bool_value(a > b),
        BinOp::Ge => bool_value(a >= b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(truthy(-1.0));
        assert!(truthy(f64::INFINITY));
        assert!(!truthy(0.0));
        assert!(!truthy(-0.0));
        assert!(!truthy(f64::NAN));
    }

    #[test]
    fn division_follows_ieee() {
        assert_eq!(binary(BinOp::Div, 1.0, 0.0), f64::INFINITY);
        assert!(binary(BinOp::Div, 0.0, 0.0).is_nan());
        assert_eq!(binary(BinOp::Rem, -7.0, 4.0), -3.0);
    }
}
