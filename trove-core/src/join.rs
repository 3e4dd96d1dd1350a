use crate::{
    BooleanOperator, Criteria, DaoError, Error, JoinExpression, JoinSortOrder, Order, Result,
};
use std::fmt::{self, Display, Formatter};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinType {
    #[default]
    Inner,
    LeftOuter,
    RightOuter,
    /// Full outer join.
    Outer,
}

impl JoinType {
    /// The join type answering the same question with the sides swapped.
    ///
    /// Inner and full outer joins are symmetric and are rejected.
    pub fn flip(&self) -> Result<JoinType> {
        match self {
            JoinType::LeftOuter => Ok(JoinType::RightOuter),
            JoinType::RightOuter => Ok(JoinType::LeftOuter),
            JoinType::Inner | JoinType::Outer => Err(Error::new(DaoError::UnsupportedFlip(*self))),
        }
    }

    /// Whether rows of the left entity without a match are kept.
    pub fn preserves_left(&self) -> bool {
        matches!(self, JoinType::LeftOuter | JoinType::Outer)
    }

    /// Whether rows of the right entity without a match are kept.
    pub fn preserves_right(&self) -> bool {
        matches!(self, JoinType::RightOuter | JoinType::Outer)
    }
}

impl Display for JoinType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinType::Inner => "inner",
            JoinType::LeftOuter => "left outer",
            JoinType::RightOuter => "right outer",
            JoinType::Outer => "full outer",
        })
    }
}

/// Everything describing a join between two entities.
///
/// `left_criteria` and `right_criteria` filter each entity independently of
/// the join predicate, they are applied before joining so a filtered out row
/// behaves as if it did not exist.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct JoinCriteria {
    pub join_type: JoinType,
    pub operator: BooleanOperator,
    pub expressions: Vec<JoinExpression>,
    pub orders: Vec<JoinSortOrder>,
    pub left_criteria: Option<Criteria>,
    pub right_criteria: Option<Criteria>,
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

impl JoinCriteria {
    pub fn new(join_type: JoinType) -> Self {
        Self {
            join_type,
            ..Default::default()
        }
    }

    pub fn inner() -> Self {
        Self::new(JoinType::Inner)
    }

    pub fn left_outer() -> Self {
        Self::new(JoinType::LeftOuter)
    }

    pub fn right_outer() -> Self {
        Self::new(JoinType::RightOuter)
    }

    pub fn outer() -> Self {
        Self::new(JoinType::Outer)
    }

    pub fn on(mut self, expression: JoinExpression) -> Self {
        self.expressions.push(expression);
        self
    }

    pub fn operator(mut self, operator: BooleanOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn order_by_left(mut self, property: impl Into<String>, direction: Order) -> Self {
        self.orders.push(JoinSortOrder {
            property: property.into(),
            direction,
            is_for_left: true,
        });
        self
    }

    pub fn order_by_right(mut self, property: impl Into<String>, direction: Order) -> Self {
        self.orders.push(JoinSortOrder {
            property: property.into(),
            direction,
            is_for_left: false,
        });
        self
    }

    /// Filter on the left entity, its ordering and pagination are dropped.
    pub fn left(mut self, criteria: Criteria) -> Self {
        self.left_criteria = Some(criteria.filter_only());
        self
    }

    /// Filter on the right entity, its ordering and pagination are dropped.
    pub fn right(mut self, criteria: Criteria) -> Self {
        self.right_criteria = Some(criteria.filter_only());
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

    /// Fails when the join has no predicate.
    pub fn validate(&self) -> Result<()> {
        if self.expressions.is_empty() {
            return Err(Error::new(DaoError::EmptyCriteria {
                operation: "join",
            }));
        }
        Ok(())
    }

    /// The per side filter, `None` when absent or empty.
    pub fn side_filter(&self, left: bool) -> Option<&Criteria> {
        let criteria = if left {
            &self.left_criteria
        } else {
            &self.right_criteria
        };
        criteria.as_ref().filter(|v| !v.is_empty())
    }

    /// The equivalent join with sides swapped: the outer side changes, every
    /// expression and sort order is flipped and the side filters trade places.
    pub fn flip(&self) -> Result<Self> {
        Ok(Self {
            join_type: self.join_type.flip()?,
            operator: self.operator,
            expressions: self.expressions.iter().map(JoinExpression::flip).collect(),
            orders: self.orders.iter().map(JoinSortOrder::flip).collect(),
            left_criteria: self.right_criteria.clone(),
            right_criteria: self.left_criteria.clone(),
            start: self.start,
            limit: self.limit,
        })
    }
}

/// A row of a join, either side is absent when padded by an outer join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinResult<L, R> {
    pub left: Option<L>,
    pub right: Option<R>,
}

impl<L, R> JoinResult<L, R> {
    pub fn new(left: Option<L>, right: Option<R>) -> Self {
        Self { left, right }
    }

    pub fn flip(self) -> JoinResult<R, L> {
        JoinResult {
            left: self.right,
            right: self.left,
        }
    }
}
