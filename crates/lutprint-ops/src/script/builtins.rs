//! Functions callable from filter scripts.
//!
//! All functions are pure `f64 -> f64` maps with a fixed arity checked at
//! compile time. None of them can fail; out-of-domain input yields NaN,
//! which the filter later replaces with the pixel's original channel.

/// A script-callable function.
#[derive(Clone, Copy)]
pub(crate) struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub eval: fn(&[f64]) -> f64,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

macro_rules! builtins {
    ($($name:literal => |$($arg:ident),+| $body:expr;)*) => {
        const BUILTINS: &[Builtin] = &[
            $(Builtin {
                name: $name,
                arity: [$(stringify!($arg)),+].len(),
                eval: {
                    fn eval(args: &[f64]) -> f64 {
                        let &[$($arg),+] = args else { return f64::NAN };
                        $body
                    }
                    eval
                },
            },)*
        ];
    };
}

builtins! {
    "abs" => |a| a.abs();
    "sign" => |a| if a > 0.0 { 1.0 } else if a < 0.0 { -1.0 } else { a };
    "floor" => |a| a.floor();
    "ceil" => |a| a.ceil();
    "round" => |a| (a + 0.5).floor();
    "trunc" => |a| a.trunc();
    "fract" => |a| a - a.floor();
    "sqrt" => |a| a.sqrt();
    "exp" => |a| a.exp();
    "ln" => |a| a.ln();
    "log2" => |a| a.log2();
    "log10" => |a| a.log10();
    "sin" => |a| a.sin();
    "cos" => |a| a.cos();
    "tan" => |a| a.tan();
    "asin" => |a| a.asin();
    "acos" => |a| a.acos();
    "atan" => |a| a.atan();
    "atan2" => |y, x| y.atan2(x);
    "pow" => |a, b| a.powf(b);
    "min" => |a, b| a.min(b);
    "max" => |a, b| a.max(b);
    "clamp" => |x, lo, hi| x.max(lo).min(hi);
    "mix" => |a, b, t| a + (b - a) * t;
    "step" => |edge, x| if x < edge { 0.0 } else { 1.0 };
    "smoothstep" => |e0, e1, x| {
        let t = ((x - e0) / (e1 - e0)).max(0.0).min(1.0);
        t * t * (3.0 - 2.0 * t)
    };
}

/// Looks up a function by name.
pub(crate) fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|b| b.name == name).copied()
}

/// Names of all functions, in table order.
pub(crate) fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|b| b.name)
}
