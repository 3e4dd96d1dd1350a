use crate::{
    Backend, BooleanOperator, Criteria, DaoError, Error, JoinCriteria, JoinExpression, JoinKey,
    JoinResult, JoinType, Mapping, Order, Result, Row, SortOrder, Value, paginate,
    paginated_count,
};
use std::{cmp::Ordering, collections::HashMap};

static NULL: Value = Value::Null;

/// Join rows of two backends in memory.
///
/// Each side is fetched in full (after its own filter) and merged here: this
/// is the fallback when the storage cannot join, and it costs the transfer
/// and the memory of both sides.
pub fn pseudo_join(
    left: &dyn Backend,
    left_mapping: Mapping,
    right: &dyn Backend,
    right_mapping: Mapping,
    criteria: &JoinCriteria,
) -> Result<Vec<JoinResult<Row, Row>>> {
    criteria.validate()?;
    if criteria.join_type == JoinType::RightOuter {
        // Probe from the preserved side
        let flipped = criteria.flip()?;
        return Ok(
            pseudo_join(right, right_mapping, left, left_mapping, &flipped)?
                .into_iter()
                .map(JoinResult::flip)
                .collect(),
        );
    }
    let plan = JoinPlan::new(left_mapping, right_mapping, criteria)?;
    let left_rows = fetch_side(left, left_mapping, criteria, true)?;
    let right_rows = fetch_side(right, right_mapping, criteria, false)?;
    let mut pairs = Vec::new();
    plan.merge(&left_rows, &right_rows, |l, r| pairs.push((l, r)));
    if !plan.orders.is_empty() {
        pairs.sort_by(|a, b| {
            plan.orders
                .iter()
                .fold(Ordering::Equal, |ordering, (is_for_left, position, order)| {
                    ordering.then_with(|| {
                        let (a, b) = if *is_for_left {
                            (
                                cell(&left_rows, a.0, *position),
                                cell(&left_rows, b.0, *position),
                            )
                        } else {
                            (
                                cell(&right_rows, a.1, *position),
                                cell(&right_rows, b.1, *position),
                            )
                        };
                        order.apply(a.sort_cmp(b))
                    })
                })
        });
    }
    Ok(paginate(pairs, criteria.start, criteria.limit)
        .into_iter()
        .map(|(l, r)| {
            JoinResult::new(
                l.map(|i| left_rows[i].clone()),
                r.map(|i| right_rows[i].clone()),
            )
        })
        .collect())
}

/// Value at `position` of the row `i`, NULL for an absent side.
fn cell(rows: &[Row], i: Option<usize>, position: usize) -> &Value {
    match i {
        Some(i) => &rows[i][position],
        None => &NULL,
    }
}

/// Number of rows [`pseudo_join`] returns, without building them.
pub fn pseudo_join_count(
    left: &dyn Backend,
    left_mapping: Mapping,
    right: &dyn Backend,
    right_mapping: Mapping,
    criteria: &JoinCriteria,
) -> Result<u64> {
    criteria.validate()?;
    if criteria.join_type == JoinType::RightOuter {
        return pseudo_join_count(right, right_mapping, left, left_mapping, &criteria.flip()?);
    }
    let plan = JoinPlan::new(left_mapping, right_mapping, criteria)?;
    let left_rows = fetch_side(left, left_mapping, criteria, true)?;
    let right_rows = fetch_side(right, right_mapping, criteria, false)?;
    let mut total = 0;
    plan.merge(&left_rows, &right_rows, |_, _| total += 1);
    Ok(paginated_count(total, criteria.start, criteria.limit))
}

/// Rows of one side, filtered by its criteria and ordered by its sort keys.
fn fetch_side(
    backend: &dyn Backend,
    mapping: Mapping,
    criteria: &JoinCriteria,
    is_for_left: bool,
) -> Result<Vec<Row>> {
    let mut side = criteria
        .side_filter(is_for_left)
        .cloned()
        .unwrap_or_else(Criteria::new);
    side.orders = criteria
        .orders
        .iter()
        .filter(|v| v.is_for_left == is_for_left)
        .map(|v| SortOrder::new(v.property.clone(), v.direction))
        .collect();
    mapping.fetch(backend, &side)
}

struct JoinPlan<'a> {
    join_type: JoinType,
    operator: BooleanOperator,
    /// Left position, right position, predicate.
    expressions: Vec<(usize, usize, &'a JoinExpression)>,
    /// Positions of the equality used to index the right side.
    index: Option<(usize, usize)>,
    /// Side, position, direction.
    orders: Vec<(bool, usize, Order)>,
}

impl<'a> JoinPlan<'a> {
    fn new(left: Mapping, right: Mapping, criteria: &'a JoinCriteria) -> Result<Self> {
        let expressions = criteria
            .expressions
            .iter()
            .map(|v| {
                Ok((
                    left.position(v.left_property())?,
                    right.position(v.right_property())?,
                    v,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        let orders = criteria
            .orders
            .iter()
            .map(|v| {
                if v.direction == Order::Computed {
                    return Err(Error::new(DaoError::UnsupportedClause {
                        backend: "Pseudo join",
                        clause: format!("computed order `{}`", v.property),
                    }));
                }
                let mapping = if v.is_for_left { left } else { right };
                Ok((v.is_for_left, mapping.position(&v.property)?, v.direction))
            })
            .collect::<Result<Vec<_>>>()?;
        let index = if criteria.operator == BooleanOperator::And || expressions.len() == 1 {
            expressions
                .iter()
                .find(|(_, _, v)| matches!(v, JoinExpression::Equal { true_or_not: true, .. }))
                .map(|(l, r, _)| (*l, *r))
        } else {
            None
        };
        log::debug!(
            "Pseudo {} join of `{}` with `{}` using {}, both sides are loaded in memory",
            criteria.join_type,
            left.table,
            right.table,
            if index.is_some() {
                "a hash index"
            } else {
                "a nested loop"
            },
        );
        Ok(Self {
            join_type: criteria.join_type,
            operator: criteria.operator,
            expressions,
            index,
            orders,
        })
    }

    fn matches(&self, left: &Row, right: &Row) -> bool {
        let mut terms = self.expressions.iter();
        let test = |(l, r, v): &(usize, usize, &JoinExpression)| v.matches(&left[*l], &right[*r]);
        match self.operator {
            BooleanOperator::And => terms.all(test),
            BooleanOperator::Or => terms.any(test),
        }
    }

    /// Call `emit` with the indexes of every joined pair, in left row order
    /// then right row order, followed by the unmatched right rows of a full join.
    fn merge(
        &self,
        left: &[Row],
        right: &[Row],
        mut emit: impl FnMut(Option<usize>, Option<usize>),
    ) {
        let index = self.index.map(|(_, r)| {
            let mut index: HashMap<JoinKey, Vec<usize>> = HashMap::new();
            for (i, row) in right.iter().enumerate() {
                if let Some(key) = row[r].join_key() {
                    index.entry(key).or_default().push(i);
                }
            }
            index
        });
        let all: Vec<usize> = if index.is_none() {
            (0..right.len()).collect()
        } else {
            Vec::new()
        };
        let mut right_matched = vec![false; right.len()];
        for (li, row) in left.iter().enumerate() {
            let candidates: &[usize] = match (&index, self.index) {
                (Some(index), Some((l, _))) => row[l]
                    .join_key()
                    .and_then(|key| index.get(&key))
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
                _ => &all,
            };
            let mut matched = false;
            for &ri in candidates {
                if self.matches(row, &right[ri]) {
                    matched = true;
                    right_matched[ri] = true;
                    emit(Some(li), Some(ri));
                }
            }
            if !matched && self.join_type.preserves_left() {
                emit(Some(li), None);
            }
        }
        if self.join_type.preserves_right() {
            for (ri, matched) in right_matched.iter().enumerate() {
                if !matched {
                    emit(None, Some(ri));
                }
            }
        }
    }
}
