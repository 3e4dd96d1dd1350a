use crate::{
    Backend, DaoError, Entity, Error, JoinBackend, JoinCriteria, JoinResult, Mapping, Result,
    Row, pseudo_join, pseudo_join_count,
};

/// How a join gets executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Compiled and run by the left backend.
    Native,
    /// The dialect only has the mirrored one sided join: run flipped, flip the results back.
    NativeFlipped,
    /// Both sides fetched and merged in memory.
    Pseudo,
}

fn resolve<'a>(
    left: &'a dyn Backend,
    right: &dyn Backend,
    criteria: &JoinCriteria,
) -> Option<(&'a dyn JoinBackend, bool)> {
    let native = left.as_join_backend()?;
    if !native.can_join_natively(criteria, right) {
        return None;
    }
    if native.supports_join_type(criteria.join_type) {
        return Some((native, false));
    }
    match criteria.join_type.flip() {
        Ok(flipped) if native.supports_join_type(flipped) => Some((native, true)),
        _ => None,
    }
}

/// The strategy [`fetch_join`] picks for these backends.
pub fn join_strategy(
    left: &dyn Backend,
    right: &dyn Backend,
    criteria: &JoinCriteria,
) -> JoinStrategy {
    match resolve(left, right, criteria) {
        Some((_, false)) => JoinStrategy::Native,
        Some((_, true)) => JoinStrategy::NativeFlipped,
        None => JoinStrategy::Pseudo,
    }
}

/// Join the rows of two entities, `left` holds the left entity and `right` the right one.
pub fn fetch_join_rows(
    left: &dyn Backend,
    left_mapping: Mapping,
    right: &dyn Backend,
    right_mapping: Mapping,
    criteria: &JoinCriteria,
) -> Result<Vec<JoinResult<Row, Row>>> {
    criteria.validate()?;
    match resolve(left, right, criteria) {
        Some((native, false)) => native_join(native, left_mapping, right_mapping, criteria),
        Some((native, true)) => {
            log::debug!(
                "{} cannot run a {} join, running the flipped join",
                native.name(),
                criteria.join_type
            );
            Ok(
                native_join(native, right_mapping, left_mapping, &criteria.flip()?)?
                    .into_iter()
                    .map(JoinResult::flip)
                    .collect(),
            )
        }
        None => pseudo_join(left, left_mapping, right, right_mapping, criteria),
    }
}

/// Number of rows [`fetch_join_rows`] returns for the same criteria.
pub fn count_join_rows(
    left: &dyn Backend,
    left_mapping: Mapping,
    right: &dyn Backend,
    right_mapping: Mapping,
    criteria: &JoinCriteria,
) -> Result<u64> {
    criteria.validate()?;
    match resolve(left, right, criteria) {
        Some((native, false)) => native.count_join(left_mapping, right_mapping, criteria),
        Some((native, true)) => native.count_join(right_mapping, left_mapping, &criteria.flip()?),
        None => pseudo_join_count(left, left_mapping, right, right_mapping, criteria),
    }
}

/// Join two entities, decoding each side.
///
/// Runs natively when the left backend can reach the right entity, in memory otherwise.
pub fn fetch_join<L: Entity, R: Entity>(
    left: &dyn Backend,
    right: &dyn Backend,
    criteria: &JoinCriteria,
) -> Result<Vec<JoinResult<L, R>>> {
    let (left_mapping, right_mapping) = (L::mapping(), R::mapping());
    let (left_labels, right_labels) = (left_mapping.labels(), right_mapping.labels());
    fetch_join_rows(left, left_mapping, right, right_mapping, criteria)?
        .into_iter()
        .map(|v| {
            Ok(JoinResult::new(
                v.left
                    .map(|row| left_mapping.decode(&left_labels, row))
                    .transpose()?,
                v.right
                    .map(|row| right_mapping.decode(&right_labels, row))
                    .transpose()?,
            ))
        })
        .collect()
}

/// Number of rows [`fetch_join`] returns for the same criteria.
pub fn count_join<L: Entity, R: Entity>(
    left: &dyn Backend,
    right: &dyn Backend,
    criteria: &JoinCriteria,
) -> Result<u64> {
    count_join_rows(left, L::mapping(), right, R::mapping(), criteria)
}

fn native_join(
    backend: &dyn JoinBackend,
    left: Mapping,
    right: Mapping,
    criteria: &JoinCriteria,
) -> Result<Vec<JoinResult<Row, Row>>> {
    let query = backend.compile_join_query(left, right, criteria)?;
    let (left_keys, right_keys) = (left.key_positions(), right.key_positions());
    let split = left.columns.len();
    let mut result = Vec::new();
    let outcome = backend.execute(&query, &mut |row| {
        let mut values = row.values.into_vec();
        if values.len() != split + right.columns.len() {
            return Err(Error::new(DaoError::result_processing(
                &format!("{} joined with {}", left.table, right.table),
                Error::msg(format!(
                    "expected {} columns, the row has {}",
                    split + right.columns.len(),
                    values.len()
                )),
            )));
        }
        let right_values = values.split_off(split);
        result.push(JoinResult::new(
            join_side(backend, left, values, &left_keys)?,
            join_side(backend, right, right_values, &right_keys)?,
        ));
        Ok(())
    });
    backend.dispose_query(query);
    outcome.map(|_| result)
}

/// One side of a native join row, absent when every key column is NULL.
fn join_side<B: Backend + ?Sized>(
    backend: &B,
    mapping: Mapping,
    values: Vec<crate::Value>,
    keys: &[usize],
) -> Result<Option<Row>> {
    if keys.iter().all(|i| values[*i].is_null()) {
        return Ok(None);
    }
    values
        .into_iter()
        .zip(mapping.columns)
        .map(|(value, column)| {
            backend
                .coerce_type(value, &column.value)
                .map_err(|e| Error::new(DaoError::result_processing(&mapping.table.full_name(), e)))
        })
        .collect::<Result<Row>>()
        .map(Some)
}
