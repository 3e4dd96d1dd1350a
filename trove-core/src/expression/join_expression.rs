use crate::Value;
use std::cmp::Ordering;

/// A predicate relating a property of the left entity to a property of the right entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinExpression {
    Equal {
        left_property: String,
        right_property: String,
        true_or_not: bool,
    },
    Greater {
        left_property: String,
        right_property: String,
        true_or_not: bool,
    },
    Lesser {
        left_property: String,
        right_property: String,
        true_or_not: bool,
    },
}

impl JoinExpression {
    pub fn equal(left_property: impl Into<String>, right_property: impl Into<String>) -> Self {
        JoinExpression::Equal {
            left_property: left_property.into(),
            right_property: right_property.into(),
            true_or_not: true,
        }
    }

    pub fn greater(left_property: impl Into<String>, right_property: impl Into<String>) -> Self {
        JoinExpression::Greater {
            left_property: left_property.into(),
            right_property: right_property.into(),
            true_or_not: true,
        }
    }

    pub fn lesser(left_property: impl Into<String>, right_property: impl Into<String>) -> Self {
        JoinExpression::Lesser {
            left_property: left_property.into(),
            right_property: right_property.into(),
            true_or_not: true,
        }
    }

    pub fn left_property(&self) -> &str {
        match self {
            JoinExpression::Equal { left_property, .. }
            | JoinExpression::Greater { left_property, .. }
            | JoinExpression::Lesser { left_property, .. } => left_property,
        }
    }

    pub fn right_property(&self) -> &str {
        match self {
            JoinExpression::Equal { right_property, .. }
            | JoinExpression::Greater { right_property, .. }
            | JoinExpression::Lesser { right_property, .. } => right_property,
        }
    }

    pub fn true_or_not(&self) -> bool {
        match self {
            JoinExpression::Equal { true_or_not, .. }
            | JoinExpression::Greater { true_or_not, .. }
            | JoinExpression::Lesser { true_or_not, .. } => *true_or_not,
        }
    }

    pub fn clause_name(&self) -> &'static str {
        match self {
            JoinExpression::Equal { .. } => "EqualJoin",
            JoinExpression::Greater { .. } => "GreaterJoin",
            JoinExpression::Lesser { .. } => "LesserJoin",
        }
    }

    pub fn invert(&self) -> Self {
        let mut result = self.clone();
        match &mut result {
            JoinExpression::Equal { true_or_not, .. }
            | JoinExpression::Greater { true_or_not, .. }
            | JoinExpression::Lesser { true_or_not, .. } => *true_or_not = !*true_or_not,
        }
        result
    }

    /// Swap the sides. `l.a > r.b` holds exactly when `r.b < l.a`, so the
    /// asymmetric comparisons trade places.
    pub fn flip(&self) -> Self {
        let (left_property, right_property, true_or_not) = (
            self.right_property().to_string(),
            self.left_property().to_string(),
            self.true_or_not(),
        );
        match self {
            JoinExpression::Equal { .. } => JoinExpression::Equal {
                left_property,
                right_property,
                true_or_not,
            },
            JoinExpression::Greater { .. } => JoinExpression::Lesser {
                left_property,
                right_property,
                true_or_not,
            },
            JoinExpression::Lesser { .. } => JoinExpression::Greater {
                left_property,
                right_property,
                true_or_not,
            },
        }
    }

    /// Truth of the predicate for a pair of property values.
    ///
    /// Mirrors SQL: a NULL (or non comparable) operand is unknown and never
    /// matches, whatever the polarity.
    pub fn matches(&self, left: &Value, right: &Value) -> bool {
        let Some(ordering) = left.compare(right) else {
            return false;
        };
        let positive = match self {
            JoinExpression::Equal { .. } => ordering == Ordering::Equal,
            JoinExpression::Greater { .. } => ordering == Ordering::Greater,
            JoinExpression::Lesser { .. } => ordering == Ordering::Less,
        };
        positive == self.true_or_not()
    }
}
