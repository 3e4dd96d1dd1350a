use crate::{
    Criteria, DaoError, Error, Expression, GroupCount, Mapping, Order, Result, Row, SortOrder,
    Value, paginate,
};
use std::{borrow::Cow, cmp::Ordering};

const IN_PROCESS: &str = "In process evaluation";

/// Check that `criteria` can be evaluated in process, before touching any data.
pub fn validate(mapping: Mapping, criteria: &Criteria) -> Result<()> {
    for expression in &criteria.expressions {
        validate_expression(mapping, expression)?;
    }
    sort_positions(mapping, &criteria.orders).map(|_| ())
}

fn validate_expression(mapping: Mapping, expression: &Expression) -> Result<()> {
    if let Some(property) = expression.property() {
        mapping.position(property)?;
    }
    let null_operand = |property: &str| {
        Err(Error::new(DaoError::NullOperand {
            property: property.to_string(),
            clause: expression.clause_name(),
        }))
    };
    match expression {
        Expression::Greater {
            property, value, ..
        }
        | Expression::Lesser {
            property, value, ..
        } if value.is_null() => null_operand(property),
        Expression::Between {
            property, min, max, ..
        } if min.is_null() || max.is_null() => null_operand(property),
        Expression::PropertyInList {
            property, values, ..
        } if values.is_empty() => Err(Error::new(DaoError::EmptyInList(property.clone()))),
        Expression::Nested(criteria) => {
            if criteria.is_empty() {
                return Err(Error::new(DaoError::EmptyCriteria {
                    operation: "nested criteria",
                }));
            }
            criteria
                .expressions
                .iter()
                .try_for_each(|v| validate_expression(mapping, v))
        }
        Expression::Raw { clause, .. } => Err(Error::new(DaoError::UnsupportedClause {
            backend: IN_PROCESS,
            clause: format!("raw clause `{}`", clause),
        })),
        _ => Ok(()),
    }
}

/// Positions of the sort properties, computed keys cannot be evaluated here.
pub fn sort_positions(mapping: Mapping, orders: &[SortOrder]) -> Result<Vec<(usize, Order)>> {
    orders
        .iter()
        .map(|order| {
            if order.direction == Order::Computed {
                return Err(Error::new(DaoError::UnsupportedClause {
                    backend: IN_PROCESS,
                    clause: format!("computed order `{}`", order.property),
                }));
            }
            Ok((mapping.position(&order.property)?, order.direction))
        })
        .collect()
}

/// Whether `row`, in canonical column order, passes the filter of `criteria`.
/// An empty criteria matches every row.
pub fn matches(mapping: Mapping, criteria: &Criteria, row: &[Value]) -> Result<bool> {
    if criteria.is_empty() {
        return Ok(true);
    }
    criteria
        .operator
        .combine(&criteria.expressions, |v| matches_expression(mapping, v, row))
}

/// Truth of one expression, NULL operands follow SQL: unknown never matches.
pub fn matches_expression(mapping: Mapping, expression: &Expression, row: &[Value]) -> Result<bool> {
    let lookup = |property: &str| -> Result<(&Value, &Value)> {
        let i = mapping.position(property)?;
        Ok((&row[i], &mapping.columns[i].value))
    };
    Ok(match expression {
        Expression::Equal {
            property,
            value,
            true_or_not,
        } => {
            let (cell, prototype) = lookup(property)?;
            if value.is_null() {
                cell.is_null() == *true_or_not
            } else {
                let value = operand(value, prototype);
                compare(cell, &value, |v| v == Ordering::Equal, *true_or_not)
            }
        }
        Expression::EqualCaseInsensitive {
            property,
            value,
            true_or_not,
        } => {
            let (cell, prototype) = lookup(property)?;
            if value.is_null() {
                cell.is_null() == *true_or_not
            } else {
                match (text(cell), text(value)) {
                    (Some(l), Some(r)) => l.eq_ignore_ascii_case(&r) == *true_or_not,
                    (None, _) if cell.is_null() => false,
                    _ => {
                        let value = operand(value, prototype);
                        compare(cell, &value, |v| v == Ordering::Equal, *true_or_not)
                    }
                }
            }
        }
        Expression::Greater {
            property,
            value,
            true_or_not,
        } => {
            let (cell, prototype) = lookup(property)?;
            let value = operand(value, prototype);
            compare(cell, &value, |v| v == Ordering::Greater, *true_or_not)
        }
        Expression::Lesser {
            property,
            value,
            true_or_not,
        } => {
            let (cell, prototype) = lookup(property)?;
            let value = operand(value, prototype);
            compare(cell, &value, |v| v == Ordering::Less, *true_or_not)
        }
        Expression::Between {
            property,
            min,
            max,
            true_or_not,
        } => {
            let (cell, prototype) = lookup(property)?;
            let (min, max) = (operand(min, prototype), operand(max, prototype));
            match (cell.compare(&min), cell.compare(&max)) {
                (Some(low), Some(high)) => {
                    let inside = low != Ordering::Less && high != Ordering::Greater;
                    inside == *true_or_not
                }
                _ => false,
            }
        }
        Expression::Like {
            property,
            pattern,
            true_or_not,
        } => {
            let (cell, _) = lookup(property)?;
            match text(cell) {
                Some(text) => like(pattern, &text) == *true_or_not,
                None => false,
            }
        }
        Expression::LikeCaseInsensitive {
            property,
            pattern,
            true_or_not,
        } => {
            let (cell, _) = lookup(property)?;
            match text(cell) {
                Some(text) => {
                    like(
                        &pattern.to_ascii_lowercase(),
                        &text.to_ascii_lowercase(),
                    ) == *true_or_not
                }
                None => false,
            }
        }
        Expression::BitwiseAnd {
            property,
            mask,
            true_or_not,
        } => {
            let (cell, _) = lookup(property)?;
            match cell.as_i128() {
                Some(v) => {
                    let mask = *mask as i128;
                    (v & mask == mask) == *true_or_not
                }
                None => false,
            }
        }
        Expression::PropertyInList {
            property,
            values,
            true_or_not,
        } => {
            let (cell, prototype) = lookup(property)?;
            if cell.is_null() {
                return Ok(false);
            }
            let found = values
                .iter()
                .any(|v| cell.compare(&operand(v, prototype)) == Some(Ordering::Equal));
            if *true_or_not {
                found
            } else {
                !found && !values.iter().any(Value::is_null)
            }
        }
        Expression::Nested(criteria) => {
            if criteria.is_empty() {
                return Err(Error::new(DaoError::EmptyCriteria {
                    operation: "nested criteria",
                }));
            }
            matches(mapping, criteria, row)?
        }
        Expression::Raw { clause, .. } => {
            return Err(Error::new(DaoError::UnsupportedClause {
                backend: IN_PROCESS,
                clause: format!("raw clause `{}`", clause),
            }));
        }
    })
}

/// The operand converted into the column type when possible.
fn operand<'a>(value: &'a Value, prototype: &Value) -> Cow<'a, Value> {
    if value.same_type(prototype) {
        return Cow::Borrowed(value);
    }
    match value.clone().coerce(prototype) {
        Ok(v) => Cow::Owned(v),
        Err(..) => Cow::Borrowed(value),
    }
}

fn compare(cell: &Value, value: &Value, test: impl Fn(Ordering) -> bool, true_or_not: bool) -> bool {
    match cell.compare(value) {
        Some(ordering) => test(ordering) == true_or_not,
        None => false,
    }
}

/// Textual form used by LIKE, numbers are converted like SQL engines do.
fn text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Varchar(Some(v)) => Some(Cow::Borrowed(v)),
        Value::Int32(Some(..))
        | Value::Int64(Some(..))
        | Value::Float64(Some(..))
        | Value::Decimal(Some(..)) => Some(Cow::Owned(value.to_string())),
        _ => value.to_canonical_string().map(Cow::Owned),
    }
}

/// SQL LIKE: `%` matches any sequence, `_` exactly one character.
pub fn like(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if let Some((star, mark)) = backtrack {
            p = star + 1;
            t = mark + 1;
            backtrack = Some((star, mark + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}

/// Stable sort, NULLs first in ascending order.
pub fn sort_rows(rows: &mut [Row], positions: &[(usize, Order)]) {
    if positions.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        positions.iter().fold(Ordering::Equal, |ordering, (i, order)| {
            ordering.then_with(|| order.apply(a[*i].sort_cmp(&b[*i])))
        })
    });
}

/// Filter, sort and paginate `rows` following `criteria`.
pub fn select(mapping: Mapping, criteria: &Criteria, rows: &[Row]) -> Result<Vec<Row>> {
    let positions = sort_positions(mapping, &criteria.orders)?;
    let mut result = Vec::new();
    for row in rows {
        if matches(mapping, criteria, row)? {
            result.push(row.clone());
        }
    }
    sort_rows(&mut result, &positions);
    Ok(paginate(result, criteria.start, criteria.limit))
}

/// Number of rows matching the filter of `criteria`, before pagination.
pub fn count(mapping: Mapping, criteria: &Criteria, rows: &[Row]) -> Result<u64> {
    let mut result = 0;
    for row in rows {
        if matches(mapping, criteria, row)? {
            result += 1;
        }
    }
    Ok(result)
}

/// Count the matching rows per distinct value of `group_by`, ordered by those values.
pub fn count_grouped(
    mapping: Mapping,
    criteria: &Criteria,
    rows: &[Row],
    group_by: &[&str],
) -> Result<Vec<GroupCount>> {
    let positions = group_by
        .iter()
        .map(|v| mapping.position(v))
        .collect::<Result<Vec<_>>>()?;
    if positions.is_empty() {
        let count = count(mapping, criteria, rows)?;
        return Ok(paginate(
            vec![GroupCount {
                count,
                values: Vec::new(),
            }],
            criteria.start,
            criteria.limit,
        ));
    }
    let mut keys = Vec::new();
    for row in rows {
        if matches(mapping, criteria, row)? {
            keys.push(positions.iter().map(|i| row[*i].clone()).collect::<Vec<_>>());
        }
    }
    let key_cmp = |a: &Vec<Value>, b: &Vec<Value>| {
        a.iter()
            .zip(b)
            .fold(Ordering::Equal, |ordering, (a, b)| {
                ordering.then_with(|| a.sort_cmp(b))
            })
    };
    keys.sort_by(key_cmp);
    let mut result: Vec<GroupCount> = Vec::new();
    for key in keys {
        match result.last_mut() {
            Some(last) if key_cmp(&last.values, &key) == Ordering::Equal => last.count += 1,
            _ => result.push(GroupCount {
                count: 1,
                values: key,
            }),
        }
    }
    Ok(paginate(result, criteria.start, criteria.limit))
}
