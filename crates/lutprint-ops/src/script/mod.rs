//! Embedded per-pixel script language.
//!
//! A filter script is a short, loop-free program run once per pixel. It sees
//! the pixel's channels as `R`, `G`, `B` (0-255, writable) and its position
//! as `X`, `Y` in a `W` x `H` image (read-only). Whatever `R`, `G`, `B` hold
//! when the script ends, or hits `return`, is the new pixel.
//!
//! ```text
//! // warm the highlights
//! let luma = 0.2126 * R + 0.7152 * G + 0.0722 * B;
//! if (luma > 128) {
//!     R *= 1.08;
//!     B = mix(B, luma, 0.25);
//! }
//! G = X < W / 2 ? G : 255 - G;
//! ```
//!
//! # Grammar
//!
//! ```text
//! program   := stmt*
//! stmt      := "let" ident ("=" expr)? end
//!            | ident ("=" | "+=" | "-=" | "*=" | "/=") expr end
//!            | "if" "(" expr ")" body ("else" body)?
//!            | "return" end
//!            | expr end
//!            | ";"
//! end       := ";" | line break | before "}" or "else" or end of script
//! body      := "{" stmt* "}" | stmt
//! expr      := or ("?" expr ":" expr)?
//! or        := and ("||" and)*
//! and       := equality ("&&" equality)*
//! equality  := compare (("==" | "!=") compare)*
//! compare   := additive (("<" | "<=" | ">" | ">=") additive)*
//! additive  := term (("+" | "-") term)*
//! term      := unary (("*" | "/" | "%") unary)*
//! unary     := ("-" | "+" | "!") unary | power
//! power     := primary ("**" unary)?
//! primary   := number | ident | ident "(" args ")" | "(" expr ")"
//! ```
//!
//! Names are resolved when the script is compiled, so typos, calls to
//! unknown functions, wrong argument counts and writes to `X`/`Y`/`W`/`H`
//! are all reported before any pixel is processed. The only runtime error
//! is reading a `let` variable that was never given a value on the path
//! actually taken.

mod builtins;
mod eval;
mod lexer;
mod parser;

pub use eval::Evaluator;

use thiserror::Error;

/// Errors raised by script compilation or evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// Syntax or name-resolution error at a source position.
    #[error("{line}:{column}: {message}")]
    Compile {
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
        /// Diagnostic text.
        message: String,
    },

    /// Error while running the script on one pixel.
    #[error("{0}")]
    Runtime(String),
}

/// Values visible to a script for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelInput {
    /// Red channel, 0-255.
    pub r: f64,
    /// Green channel, 0-255.
    pub g: f64,
    /// Blue channel, 0-255.
    pub b: f64,
    /// Pixel column.
    pub x: f64,
    /// Pixel row.
    pub y: f64,
    /// Image width.
    pub w: f64,
    /// Image height.
    pub h: f64,
}

impl PixelInput {
    /// Input for pixel `(x, y)` of a `w` x `h` image holding `rgb`.
    pub fn new(rgb: [u8; 3], x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            r: rgb[0] as f64,
            g: rgb[1] as f64,
            b: rgb[2] as f64,
            x: x as f64,
            y: y as f64,
            w: w as f64,
            h: h as f64,
        }
    }
}

/// A compiled filter script.
///
/// Compilation resolves every name to a slot; evaluating it needs no
/// lookups. A script is immutable and can be shared; each thread of
/// evaluation gets its own [`Evaluator`].
#[derive(Debug, Clone)]
pub struct Script {
    program: parser::Program,
}

impl Script {
    /// Compiles `source`.
    pub fn compile(source: &str) -> Result<Self, ScriptError> {
        let tokens = lexer::tokenize(source)?;
        let program = parser::parse(&tokens)?;
        Ok(Self { program })
    }

    /// Creates an evaluator with its own variable storage.
    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.program)
    }

    /// Number of `let` variables the script declares.
    pub fn local_count(&self) -> usize {
        self.program.locals.len()
    }

    /// Runs the script once on `input`. Convenience for single pixels.
    pub fn eval(&self, input: PixelInput) -> Result<[f64; 3], ScriptError> {
        self.evaluator().run(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(src: &str, rgb: [u8; 3]) -> [f64; 3] {
        Script::compile(src)
            .unwrap()
            .eval(PixelInput::new(rgb, 3, 4, 10, 20))
            .unwrap()
    }

    fn compile_err(src: &str) -> String {
        match Script::compile(src) {
            Err(ScriptError::Compile { message, .. }) => message,
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn empty_script_passes_through() {
        assert_eq!(run("", [1, 2, 3]), [1.0, 2.0, 3.0]);
        assert_eq!(run("// nothing\n;;", [9, 8, 7]), [9.0, 8.0, 7.0]);
    }

    #[test]
    fn assignments_and_coordinates() {
        assert_eq!(run("R = X; G = Y; B = W + H", [0, 0, 0]), [3.0, 4.0, 30.0]);
        assert_eq!(run("R += 10; G -= 1; B *= 2; R /= 2", [10, 10, 10]), [10.0, 9.0, 20.0]);
    }

    #[test]
    fn precedence() {
        assert_eq!(run("R = 1 + 2 * 3", [0; 3])[0], 7.0);
        assert_eq!(run("R = -2 ** 2", [0; 3])[0], -4.0);
        assert_eq!(run("R = 2 ** 3 ** 2", [0; 3])[0], 512.0);
        assert_eq!(run("R = 2 ** -1", [0; 3])[0], 0.5);
        assert_eq!(run("R = 7 % 4 * 2", [0; 3])[0], 6.0);
        assert_eq!(run("R = 1 < 2 == 1", [0; 3])[0], 1.0);
        assert_eq!(run("R = 0 || 2 && 3", [0; 3])[0], 1.0);
        assert_eq!(run("R = 1 ? 2 : 3 ? 4 : 5", [0; 3])[0], 2.0);
    }

    #[test]
    fn constants_and_functions() {
        assert_relative_eq!(run("R = PI", [0; 3])[0], std::f64::consts::PI);
        assert_relative_eq!(run("R = ln(E)", [0; 3])[0], 1.0);
        assert_eq!(run("R = clamp(R * 2, 0, 255)", [200, 0, 0])[0], 255.0);
        assert_eq!(run("R = max(G, B)", [0, 5, 9])[0], 9.0);
    }

    #[test]
    fn control_flow() {
        let src = "if (R > 100) { R = 255 } else if (R > 50) R = 128; else { R = 0 }";
        assert_eq!(run(src, [200, 0, 0])[0], 255.0);
        assert_eq!(run(src, [60, 0, 0])[0], 128.0);
        assert_eq!(run(src, [10, 0, 0])[0], 0.0);
    }

    #[test]
    fn early_return_keeps_assigned_values() {
        assert_eq!(run("R = 1; return; G = 2", [9, 9, 9]), [1.0, 9.0, 9.0]);
        assert_eq!(run("if (1) { B = 0; return } B = 5", [9, 9, 9]), [9.0, 9.0, 0.0]);
    }

    #[test]
    fn locals_and_scopes() {
        assert_eq!(run("let k = 2; R = R * k", [10, 0, 0])[0], 20.0);
        // Inner `let` shadows until the block ends.
        assert_eq!(run("let k = 1; if (1) { let k = 5; G = k } B = k", [0; 3]), [0.0, 5.0, 1.0]);
    }

    #[test]
    fn short_circuit_skips_unassigned_read() {
        assert_eq!(run("let k; R = 0 && k", [9, 0, 0])[0], 0.0);
    }

    #[test]
    fn unassigned_local_is_a_runtime_error() {
        let script = Script::compile("let k; if (R > 100) { k = 1 } G = k").unwrap();
        let mut eval = script.evaluator();
        assert!(eval.run(PixelInput::new([200, 0, 0], 0, 0, 1, 1)).is_ok());
        let err = eval.run(PixelInput::new([0, 0, 0], 0, 0, 1, 1)).unwrap_err();
        assert_eq!(err, ScriptError::Runtime("variable 'k' read before assignment".into()));
    }

    #[test]
    fn compile_errors() {
        assert_eq!(compile_err("R = foo"), "unknown identifier 'foo'");
        assert_eq!(compile_err("X = 1"), "cannot assign to read-only 'X'");
        assert_eq!(compile_err("PI = 3"), "cannot assign to read-only 'PI'");
        assert_eq!(compile_err("let G = 1"), "'G' is a built-in name");
        let unknown = compile_err("R = nope(1)");
        assert!(unknown.starts_with("unknown function 'nope'; available: "), "{unknown}");
        assert!(unknown.contains("clamp") && unknown.contains("mix"), "{unknown}");
        assert_eq!(compile_err("R = pow(1)"), "'pow' takes 2 arguments, got 1");
        assert_eq!(compile_err("R = (1"), "expected ')', found end of script");
        assert_eq!(compile_err("R = "), "expected expression, found end of script");
    }

    #[test]
    fn compile_error_positions() {
        let err = Script::compile("R = 1\nG = bad + 1").unwrap_err();
        assert_eq!(err.to_string(), "2:5: unknown identifier 'bad'");
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let src = format!("R = {}1{}", "(".repeat(400), ")".repeat(400));
        assert!(compile_err(&src).contains("nested too deeply"));
        let ok = format!("R = {}1{}", "(".repeat(50), ")".repeat(50));
        assert!(Script::compile(&ok).is_ok());
    }

    #[test]
    fn local_count() {
        let script = Script::compile("let a = 1; let b; if (1) { let a = 2 }").unwrap();
        assert_eq!(script.local_count(), 3);
    }
}
