use crate::{
    ConnectionDescriptor, Criteria, GroupCount, JoinCriteria, JoinType, Mapping, Pooled, Query,
    QueryShape, Result, Row, RowLabeled, RowsAffected, Value,
};

/// Storage layer contract implemented by every backend.
///
/// Calls are blocking and run on the calling thread, implementations are
/// shared between threads.
pub trait Backend: Send + Sync {
    /// Backend family, the connection url scheme.
    fn name(&self) -> &'static str;

    fn descriptor(&self) -> &ConnectionDescriptor;

    fn create_table(&self, mapping: Mapping, if_not_exists: bool) -> Result<()>;

    fn drop_table(&self, mapping: Mapping, if_exists: bool) -> Result<()>;

    /// Delete the rows matching `criteria`, which must not be empty.
    fn delete(&self, mapping: Mapping, criteria: &Criteria) -> Result<RowsAffected>;

    fn delete_all(&self, mapping: Mapping) -> Result<RowsAffected>;

    /// Insert one row, values in canonical column order.
    fn insert(&self, mapping: Mapping, row: &[Value]) -> Result<RowsAffected>;

    /// Insert item by item, earlier rows stay when a later one fails.
    fn insert_batch(&self, mapping: Mapping, rows: &[Row]) -> Result<RowsAffected> {
        let mut result = RowsAffected::new(0);
        for row in rows {
            result.extend([self.insert(mapping, row)?]);
        }
        Ok(result)
    }

    /// Assign `values` (by property) to the rows matching `criteria`, which must not be empty.
    fn update(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
        values: &[(&str, Value)],
    ) -> Result<RowsAffected>;

    /// Update item by item, earlier updates stay when a later one fails.
    fn update_batch(
        &self,
        mapping: Mapping,
        items: &[(Criteria, Vec<(&str, Value)>)],
    ) -> Result<RowsAffected> {
        let mut result = RowsAffected::new(0);
        for (criteria, values) in items {
            result.extend([self.update(mapping, criteria, values)?]);
        }
        Ok(result)
    }

    fn compile_query(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
    ) -> Result<Pooled<QueryShape, Query>>;

    /// Run a compiled query, calling `callback` for each row as it is read.
    fn execute(
        &self,
        query: &Query,
        callback: &mut dyn FnMut(RowLabeled) -> Result<()>,
    ) -> Result<()>;

    /// Give the query back to its pool.
    fn dispose_query(&self, query: Pooled<QueryShape, Query>) {
        drop(query);
    }

    /// Number of rows a query with the same criteria would return, pagination included.
    fn count(&self, mapping: Mapping, criteria: &Criteria) -> Result<u64>;

    /// Counts per distinct value of the `group_by` properties, ordered by those values.
    fn count_grouped(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
        group_by: &[&str],
    ) -> Result<Vec<GroupCount>>;

    fn coerce_type(&self, value: Value, desired: &Value) -> Result<Value> {
        value.coerce(desired)
    }

    fn as_join_backend(&self) -> Option<&dyn JoinBackend> {
        None
    }
}

/// A backend able to run joins itself.
pub trait JoinBackend: Backend {
    /// Whether `criteria` can run here with `other` holding the right entity.
    fn can_join_natively(&self, criteria: &JoinCriteria, other: &dyn Backend) -> bool;

    fn supports_join_type(&self, join_type: JoinType) -> bool;

    /// Compile a join, rows hold the left columns followed by the right columns.
    fn compile_join_query(
        &self,
        left: Mapping,
        right: Mapping,
        criteria: &JoinCriteria,
    ) -> Result<Pooled<QueryShape, Query>>;

    fn count_join(&self, left: Mapping, right: Mapping, criteria: &JoinCriteria) -> Result<u64>;
}

/// A scoped unit of work. Dropping it without `commit` or `rollback` is a
/// leak: it gets reported and rolled back.
pub trait Transaction: Backend {
    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}
