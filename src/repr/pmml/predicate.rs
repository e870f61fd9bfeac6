//! Boolean split predicates.

use std::fmt;

use super::Value;

/// Comparison operator of a [`SimplePredicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    LessOrEqual,
    GreaterThan,
}

impl Operator {
    /// The operator selecting exactly the values this one rejects.
    pub fn complement(self) -> Self {
        match self {
            Operator::Equal => Operator::NotEqual,
            Operator::NotEqual => Operator::Equal,
            Operator::LessOrEqual => Operator::GreaterThan,
            Operator::GreaterThan => Operator::LessOrEqual,
        }
    }

    /// Returns true for the ordering operators.
    #[inline]
    pub fn is_ordering(self) -> bool {
        matches!(self, Operator::LessOrEqual | Operator::GreaterThan)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessOrEqual => "<=",
            Operator::GreaterThan => ">",
        }
    }
}

/// A test of one field against a literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimplePredicate {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl SimplePredicate {
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }
}

/// Incoming condition of a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Always satisfied. Used for roots and ensemble segments.
    True,
    Simple(SimplePredicate),
}

impl Predicate {
    #[inline]
    pub fn is_true(&self) -> bool {
        matches!(self, Predicate::True)
    }

    /// The simple predicate, if this is one.
    #[inline]
    pub fn as_simple(&self) -> Option<&SimplePredicate> {
        match self {
            Predicate::Simple(p) => Some(p),
            Predicate::True => None,
        }
    }
}

impl fmt::Display for SimplePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator.symbol(), self.value)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => f.write_str("True"),
            Predicate::Simple(p) => fmt::Display::fmt(p, f),
        }
    }
}
