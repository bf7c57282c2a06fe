//! Argument values and per-opcode argument shapes

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single positional action argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    /// Integer argument (volume percent, milliseconds)
    Int(i64),
    /// String argument (application, key combination, text)
    Str(String),
}

impl Arg {
    /// Kind tag of this argument
    #[must_use]
    pub const fn kind(&self) -> ArgKind {
        match self {
            Self::Int(_) => ArgKind::Int,
            Self::Str(_) => ArgKind::Str,
        }
    }

    /// String value, if this is a string argument
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }

    /// Integer value, if this is an integer argument
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Str(_) => None,
        }
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Kind tag of an [`Arg`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Int,
    Str,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "an integer"),
            Self::Str => write!(f, "a string"),
        }
    }
}

/// Fixed argument shape of an opcode
///
/// `required` slots must all be present with the given kinds. When `rest` is
/// set, any number of further arguments of that kind may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    required: &'static [ArgKind],
    rest: Option<ArgKind>,
}

impl Shape {
    /// Exactly the given slots
    #[must_use]
    pub const fn exact(required: &'static [ArgKind]) -> Self {
        Self {
            required,
            rest: None,
        }
    }

    /// The given slots followed by zero or more `rest` arguments
    #[must_use]
    pub const fn variadic(required: &'static [ArgKind], rest: ArgKind) -> Self {
        Self {
            required,
            rest: Some(rest),
        }
    }

    #[must_use]
    pub const fn required(&self) -> &'static [ArgKind] {
        self.required
    }

    #[must_use]
    pub const fn rest(&self) -> Option<ArgKind> {
        self.rest
    }

    /// Check `args` against this shape
    ///
    /// Returns a human-readable reason on mismatch. Only counts and kinds are
    /// checked, never values.
    pub fn check(&self, args: &[Arg]) -> std::result::Result<(), String> {
        let want = self.required.len();
        match self.rest {
            None if args.len() != want => {
                return Err(format!("expected {want} argument(s), got {}", args.len()));
            }
            Some(_) if args.len() < want => {
                return Err(format!(
                    "expected at least {want} argument(s), got {}",
                    args.len()
                ));
            }
            _ => {}
        }

        for (index, arg) in args.iter().enumerate() {
            let expected = self.required.get(index).copied().or(self.rest);
            if let Some(expected) = expected
                && arg.kind() != expected
            {
                return Err(format!(
                    "argument {} must be {expected}, got {}",
                    index + 1,
                    arg.kind()
                ));
            }
        }

        Ok(())
    }

    /// Check `args` and produce a typed view over them
    pub fn bind<'a>(&self, args: &'a [Arg]) -> std::result::Result<Bound<'a>, String> {
        self.check(args)?;
        Ok(Bound { args })
    }
}

/// Arguments that have already passed [`Shape::check`]
///
/// Accessors fall back to empty values for out-of-shape indexes, which the
/// check makes unreachable.
#[derive(Debug, Clone, Copy)]
pub struct Bound<'a> {
    args: &'a [Arg],
}

impl<'a> Bound<'a> {
    /// String at `index`
    #[must_use]
    pub fn text(&self, index: usize) -> &'a str {
        self.args
            .get(index)
            .and_then(Arg::as_str)
            .unwrap_or_default()
    }

    /// Integer at `index`
    #[must_use]
    pub fn int(&self, index: usize) -> i64 {
        self.args
            .get(index)
            .and_then(Arg::as_int)
            .unwrap_or_default()
    }

    /// Strings from `index` to the end
    #[must_use]
    pub fn texts_from(&self, index: usize) -> Vec<&'a str> {
        self.args
            .iter()
            .skip(index)
            .filter_map(Arg::as_str)
            .collect()
    }
}
