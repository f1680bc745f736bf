/// A query or row token after numeric coercion.
///
/// Coercion is locale-independent: `1,5` is never a number, `1.5` always is.
/// Tokens that do not parse as numbers stay strings and compare lexically.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
}

impl Literal {
    /// Coerce a raw token, preferring integers over floats over strings.
    ///
    /// Surrounding whitespace is ignored when probing for a number, but a
    /// token that stays a string keeps it.
    pub fn coerce(token: &str) -> Literal {
        let trimmed = token.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Literal::Integer(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) => Literal::Float(f),
            Err(_) => Literal::String(token.to_string()),
        }
    }

    /// Numeric view of the literal, `None` for strings.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Integer(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            Literal::String(_) => None,
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Literal::String(_))
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::String(v.to_string())
    }
}
