//! Functions the evaluators know by name.
//!
//! Function application is the node `["apply", name, argument]`. A name
//! found here is *interpreted*: the real and complex evaluators compute it.
//! Any other applied name is a symbolic function (an uninterpreted `f(x)`),
//! which numeric strategies treat as opaque.

/// Interpreted functions of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFn {
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    /// Base-10 logarithm, also spelled `log10`
    Log,
    Sqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Conj,
    Re,
    Im,
}

/// Accepted spellings, canonical name first for each function.
const NAMES: &[(&str, BuiltinFn)] = &[
    ("sin", BuiltinFn::Sin),
    ("cos", BuiltinFn::Cos),
    ("tan", BuiltinFn::Tan),
    ("sec", BuiltinFn::Sec),
    ("csc", BuiltinFn::Csc),
    ("cot", BuiltinFn::Cot),
    ("asin", BuiltinFn::Asin),
    ("arcsin", BuiltinFn::Asin),
    ("acos", BuiltinFn::Acos),
    ("arccos", BuiltinFn::Acos),
    ("atan", BuiltinFn::Atan),
    ("arctan", BuiltinFn::Atan),
    ("sinh", BuiltinFn::Sinh),
    ("cosh", BuiltinFn::Cosh),
    ("tanh", BuiltinFn::Tanh),
    ("exp", BuiltinFn::Exp),
    ("ln", BuiltinFn::Ln),
    ("log", BuiltinFn::Log),
    ("log10", BuiltinFn::Log),
    ("sqrt", BuiltinFn::Sqrt),
    ("abs", BuiltinFn::Abs),
    ("sign", BuiltinFn::Sign),
    ("floor", BuiltinFn::Floor),
    ("ceil", BuiltinFn::Ceil),
    ("conj", BuiltinFn::Conj),
    ("re", BuiltinFn::Re),
    ("im", BuiltinFn::Im),
];

impl BuiltinFn {
    /// Canonical spelling.
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(_, f)| *f == self)
            .map_or("?", |(name, _)| name)
    }

    /// Look a function up by any of its spellings.
    pub fn from_name(name: &str) -> Option<BuiltinFn> {
        NAMES.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    /// Whether `name` is interpreted by the evaluators.
    #[inline]
    pub fn is_builtin(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}
