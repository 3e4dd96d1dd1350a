use crate::{Criteria, DaoError, Error, Result, Value};

/// A predicate over the properties of a single entity.
///
/// `true_or_not` is the polarity: `false` matches the complement of the
/// positive clause, following SQL semantics (a NULL property never matches a
/// comparison whatever the polarity, a NULL operand of `Equal` becomes an
/// `IS [NOT] NULL` check).
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Equal {
        property: String,
        value: Value,
        true_or_not: bool,
    },
    EqualCaseInsensitive {
        property: String,
        value: Value,
        true_or_not: bool,
    },
    Greater {
        property: String,
        value: Value,
        true_or_not: bool,
    },
    Lesser {
        property: String,
        value: Value,
        true_or_not: bool,
    },
    /// Inclusive on both ends.
    Between {
        property: String,
        min: Value,
        max: Value,
        true_or_not: bool,
    },
    /// `%` matches any sequence, `_` matches a single character.
    Like {
        property: String,
        pattern: String,
        true_or_not: bool,
    },
    LikeCaseInsensitive {
        property: String,
        pattern: String,
        true_or_not: bool,
    },
    /// Matches when every bit of `mask` is set.
    BitwiseAnd {
        property: String,
        mask: i64,
        true_or_not: bool,
    },
    PropertyInList {
        property: String,
        values: Vec<Value>,
        true_or_not: bool,
    },
    /// A parenthesized group, inverted through De Morgan.
    Nested(Box<Criteria>),
    /// SQL text with `?` placeholders, only SQL backends can run it.
    Raw { clause: String, params: Vec<Value> },
}

impl Expression {
    pub fn equal(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Expression::Equal {
            property: property.into(),
            value: value.into(),
            true_or_not: true,
        }
    }

    pub fn not_equal(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Expression::Equal {
            property: property.into(),
            value: value.into(),
            true_or_not: false,
        }
    }

    pub fn is_null(property: impl Into<String>) -> Self {
        Expression::equal(property, Value::Null)
    }

    pub fn is_not_null(property: impl Into<String>) -> Self {
        Expression::not_equal(property, Value::Null)
    }

    pub fn equal_case_insensitive(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Expression::EqualCaseInsensitive {
            property: property.into(),
            value: value.into(),
            true_or_not: true,
        }
    }

    pub fn greater(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Expression::Greater {
            property: property.into(),
            value: value.into(),
            true_or_not: true,
        }
    }

    pub fn lesser(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Expression::Lesser {
            property: property.into(),
            value: value.into(),
            true_or_not: true,
        }
    }

    pub fn between(
        property: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Self {
        Expression::Between {
            property: property.into(),
            min: min.into(),
            max: max.into(),
            true_or_not: true,
        }
    }

    pub fn like(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        Expression::Like {
            property: property.into(),
            pattern: pattern.into(),
            true_or_not: true,
        }
    }

    pub fn like_case_insensitive(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        Expression::LikeCaseInsensitive {
            property: property.into(),
            pattern: pattern.into(),
            true_or_not: true,
        }
    }

    pub fn bitwise_and(property: impl Into<String>, mask: i64) -> Self {
        Expression::BitwiseAnd {
            property: property.into(),
            mask,
            true_or_not: true,
        }
    }

    pub fn in_list<V: Into<Value>>(
        property: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Expression::PropertyInList {
            property: property.into(),
            values: values.into_iter().map(Into::into).collect(),
            true_or_not: true,
        }
    }

    /// Groups the expressions of `criteria`. Ordering and pagination only
    /// apply to the outermost query, they are dropped here.
    pub fn nested(criteria: Criteria) -> Self {
        Expression::Nested(Box::new(criteria.filter_only()))
    }

    pub fn raw(clause: impl Into<String>, params: impl IntoIterator<Item = Value>) -> Self {
        Expression::Raw {
            clause: clause.into(),
            params: params.into_iter().collect(),
        }
    }

    /// The property this expression tests, `None` for nested and raw clauses.
    pub fn property(&self) -> Option<&str> {
        match self {
            Expression::Equal { property, .. }
            | Expression::EqualCaseInsensitive { property, .. }
            | Expression::Greater { property, .. }
            | Expression::Lesser { property, .. }
            | Expression::Between { property, .. }
            | Expression::Like { property, .. }
            | Expression::LikeCaseInsensitive { property, .. }
            | Expression::BitwiseAnd { property, .. }
            | Expression::PropertyInList { property, .. } => Some(property),
            Expression::Nested(..) | Expression::Raw { .. } => None,
        }
    }

    pub fn true_or_not(&self) -> bool {
        match self {
            Expression::Equal { true_or_not, .. }
            | Expression::EqualCaseInsensitive { true_or_not, .. }
            | Expression::Greater { true_or_not, .. }
            | Expression::Lesser { true_or_not, .. }
            | Expression::Between { true_or_not, .. }
            | Expression::Like { true_or_not, .. }
            | Expression::LikeCaseInsensitive { true_or_not, .. }
            | Expression::BitwiseAnd { true_or_not, .. }
            | Expression::PropertyInList { true_or_not, .. } => *true_or_not,
            Expression::Nested(..) | Expression::Raw { .. } => true,
        }
    }

    /// Short name used in diagnostics.
    pub fn clause_name(&self) -> &'static str {
        match self {
            Expression::Equal { .. } => "Equal",
            Expression::EqualCaseInsensitive { .. } => "EqualCaseInsensitive",
            Expression::Greater { .. } => "Greater",
            Expression::Lesser { .. } => "Lesser",
            Expression::Between { .. } => "Between",
            Expression::Like { .. } => "Like",
            Expression::LikeCaseInsensitive { .. } => "LikeCaseInsensitive",
            Expression::BitwiseAnd { .. } => "BitwiseAnd",
            Expression::PropertyInList { .. } => "PropertyInList",
            Expression::Nested(..) => "Nested",
            Expression::Raw { .. } => "RawClause",
        }
    }

    /// The expression matching the complement of `self`.
    ///
    /// Raw clauses cannot be inverted, the caller must write the negated clause.
    pub fn invert(&self) -> Result<Expression> {
        let mut result = self.clone();
        match &mut result {
            Expression::Equal { true_or_not, .. }
            | Expression::EqualCaseInsensitive { true_or_not, .. }
            | Expression::Greater { true_or_not, .. }
            | Expression::Lesser { true_or_not, .. }
            | Expression::Between { true_or_not, .. }
            | Expression::Like { true_or_not, .. }
            | Expression::LikeCaseInsensitive { true_or_not, .. }
            | Expression::BitwiseAnd { true_or_not, .. }
            | Expression::PropertyInList { true_or_not, .. } => *true_or_not = !*true_or_not,
            Expression::Nested(criteria) => **criteria = criteria.invert()?,
            Expression::Raw { clause, .. } => {
                return Err(Error::new(DaoError::UnsupportedInvert(clause.clone())));
            }
        }
        Ok(result)
    }
}
