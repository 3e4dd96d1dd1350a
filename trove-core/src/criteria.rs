use crate::{Expression, Order, Result, SortOrder};
use std::fmt::{self, Display, Formatter};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOperator {
    #[default]
    And,
    Or,
}

impl BooleanOperator {
    /// De Morgan dual.
    pub fn invert(&self) -> Self {
        match self {
            BooleanOperator::And => BooleanOperator::Or,
            BooleanOperator::Or => BooleanOperator::And,
        }
    }

    /// Combine the truth of each term, short circuiting like the SQL engines do.
    pub fn combine<T>(
        &self,
        terms: impl IntoIterator<Item = T>,
        mut f: impl FnMut(T) -> Result<bool>,
    ) -> Result<bool> {
        match self {
            BooleanOperator::And => {
                for term in terms {
                    if !f(term)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            BooleanOperator::Or => {
                for term in terms {
                    if f(term)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl Display for BooleanOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BooleanOperator::And => "AND",
            BooleanOperator::Or => "OR",
        })
    }
}

/// Filter, ordering and pagination of a query over a single entity.
///
/// ```rust
/// use trove_core::{Criteria, Expression, Order};
/// let criteria = Criteria::new()
///     .with(Expression::greater("age", 18))
///     .with(Expression::like("name", "A%"))
///     .order_by("name", Order::Asc)
///     .limit(10);
/// assert_eq!(criteria.expressions.len(), 2);
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Criteria {
    pub expressions: Vec<Expression>,
    pub operator: BooleanOperator,
    pub orders: Vec<SortOrder>,
    /// Rows to skip.
    pub start: Option<u64>,
    /// Maximum number of rows.
    pub limit: Option<u64>,
}

impl Criteria {
    /// Expressions combined with AND.
    pub fn new() -> Self {
        Default::default()
    }

    /// Expressions combined with OR.
    pub fn any() -> Self {
        Self {
            operator: BooleanOperator::Or,
            ..Default::default()
        }
    }

    pub fn with(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }

    pub fn order_by(mut self, property: impl Into<String>, direction: Order) -> Self {
        self.orders.push(SortOrder::new(property, direction));
        self
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn is_paginated(&self) -> bool {
        self.start.is_some() || self.limit.is_some()
    }

    /// The same filter without ordering and pagination.
    pub fn filter_only(self) -> Self {
        Self {
            expressions: self.expressions,
            operator: self.operator,
            ..Default::default()
        }
    }

    /// Criteria matching the complement: every expression is inverted and
    /// the operator swapped. Ordering and pagination are kept.
    pub fn invert(&self) -> Result<Self> {
        Ok(Self {
            expressions: self
                .expressions
                .iter()
                .map(Expression::invert)
                .collect::<Result<_>>()?,
            operator: self.operator.invert(),
            orders: self.orders.clone(),
            start: self.start,
            limit: self.limit,
        })
    }
}

/// Slice `rows` the way `LIMIT`/`OFFSET` would.
pub fn paginate<T>(rows: Vec<T>, start: Option<u64>, limit: Option<u64>) -> Vec<T> {
    let start = start.unwrap_or(0) as usize;
    let limit = limit.map_or(usize::MAX, |v| v as usize);
    rows.into_iter().skip(start).take(limit).collect()
}

/// Number of rows `paginate` would keep out of `total`.
pub fn paginated_count(total: u64, start: Option<u64>, limit: Option<u64>) -> u64 {
    let remaining = total.saturating_sub(start.unwrap_or(0));
    limit.map_or(remaining, |limit| remaining.min(limit))
}
