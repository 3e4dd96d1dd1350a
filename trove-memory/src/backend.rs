use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use trove_core::{
    Backend, ConnectionDescriptor, Criteria, DaoError, Error, GenericSqlWriter, GroupCount,
    Mapping, Pool, PoolStats, Pooled, Query, QueryShape, Result, Row, RowLabeled, RowsAffected,
    SqlWriter, Value, evaluate, log_error, paginated_count,
};

#[derive(Default, Debug)]
struct MemoryTable {
    rows: Vec<Row>,
}

/// Tables kept in process.
///
/// Criteria are evaluated in process, the SQL text compiled for each
/// operation is only used for logging and error messages. There is no native
/// join: joins against this backend always run through the pseudo join.
pub struct MemoryBackend {
    descriptor: ConnectionDescriptor,
    writer: GenericSqlWriter,
    tables: RwLock<HashMap<String, MemoryTable>>,
    queries: Pool<QueryShape, Query>,
}

impl MemoryBackend {
    pub fn new(descriptor: ConnectionDescriptor) -> Self {
        let max_idle = descriptor.pool_max_idle;
        Self {
            descriptor,
            writer: GenericSqlWriter::new(),
            tables: Default::default(),
            queries: Pool::new("memory query", max_idle),
        }
    }

    pub fn query_stats(&self) -> PoolStats {
        self.queries.stats()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, MemoryTable>>> {
        self.tables
            .read()
            .map_err(|_| Error::msg(format!("The storage of {} is poisoned", self.descriptor)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, MemoryTable>>> {
        self.tables
            .write()
            .map_err(|_| Error::msg(format!("The storage of {} is poisoned", self.descriptor)))
    }

    fn failure(query: &Query, reason: String) -> Error {
        log_error!(Error::new(DaoError::execution(
            &query.text,
            &query.params,
            reason
        )))
    }

    fn no_table(query: &Query, mapping: Mapping) -> Error {
        Self::failure(query, format!("no such table: {}", mapping.table))
    }

    fn statement(
        &self,
        write: impl FnOnce(&mut Query) -> Result<()>,
    ) -> Result<Pooled<QueryShape, Query>> {
        let mut query = self
            .queries
            .get(QueryShape::Statement, |shape| Ok(Query::new(*shape)))?;
        write(&mut *query)?;
        log::debug!("{}", *query);
        Ok(query)
    }

    /// Snapshot of the table, callbacks run after the lock is released.
    fn rows(&self, query: &Query, mapping: Mapping) -> Result<Vec<Row>> {
        let tables = self.read()?;
        tables
            .get(&mapping.table.full_name())
            .map(|v| v.rows.clone())
            .ok_or_else(|| Self::no_table(query, mapping))
    }

    /// Coerce `value` into the column type, refusing NULL in non nullable columns.
    fn column_value(
        query: &Query,
        mapping: Mapping,
        position: usize,
        value: &Value,
    ) -> Result<Value> {
        let column = &mapping.columns[position];
        let value = value.clone().coerce(&column.value)?;
        if value.is_null() && !column.nullable {
            return Err(Self::failure(
                query,
                format!("NOT NULL constraint failed: {}.{}", mapping.table, column.name),
            ));
        }
        Ok(value)
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    fn create_table(&self, mapping: Mapping, if_not_exists: bool) -> Result<()> {
        let query = self.statement(|out| {
            self.writer.write_create_table(out, mapping, if_not_exists)
        })?;
        let mut tables = self.write()?;
        let name = mapping.table.full_name();
        if tables.contains_key(&name) {
            if if_not_exists {
                return Ok(());
            }
            return Err(Self::failure(
                &query,
                format!("table {} already exists", mapping.table),
            ));
        }
        tables.insert(name, MemoryTable::default());
        Ok(())
    }

    fn drop_table(&self, mapping: Mapping, if_exists: bool) -> Result<()> {
        let query = self.statement(|out| {
            self.writer.write_drop_table(out, mapping, if_exists);
            Ok(())
        })?;
        let removed = self.write()?.remove(&mapping.table.full_name());
        if removed.is_none() && !if_exists {
            return Err(Self::no_table(&query, mapping));
        }
        Ok(())
    }

    fn delete(&self, mapping: Mapping, criteria: &Criteria) -> Result<RowsAffected> {
        let query = self.statement(|out| self.writer.write_delete(out, mapping, criteria))?;
        evaluate::validate(mapping, criteria)?;
        let mut tables = self.write()?;
        let table = tables
            .get_mut(&mapping.table.full_name())
            .ok_or_else(|| Self::no_table(&query, mapping))?;
        let matched = table
            .rows
            .iter()
            .map(|row| evaluate::matches(mapping, criteria, row))
            .collect::<Result<Vec<_>>>()?;
        let deleted = matched.iter().filter(|v| **v).count() as u64;
        let mut matched = matched.into_iter();
        table.rows.retain(|_| !matched.next().unwrap_or(false));
        Ok(RowsAffected::new(deleted))
    }

    fn delete_all(&self, mapping: Mapping) -> Result<RowsAffected> {
        let query = self.statement(|out| {
            self.writer.write_delete_all(out, mapping);
            Ok(())
        })?;
        let mut tables = self.write()?;
        let table = tables
            .get_mut(&mapping.table.full_name())
            .ok_or_else(|| Self::no_table(&query, mapping))?;
        let deleted = table.rows.len() as u64;
        table.rows.clear();
        Ok(RowsAffected::new(deleted))
    }

    fn insert(&self, mapping: Mapping, row: &[Value]) -> Result<RowsAffected> {
        let query = self.statement(|out| self.writer.write_insert(out, mapping, row))?;
        let row = row
            .iter()
            .enumerate()
            .map(|(i, v)| Self::column_value(&query, mapping, i, v))
            .collect::<Result<Row>>()?;
        let keys: Vec<_> = mapping
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i)
            .collect();
        let mut tables = self.write()?;
        let table = tables
            .get_mut(&mapping.table.full_name())
            .ok_or_else(|| Self::no_table(&query, mapping))?;
        if !keys.is_empty()
            && table
                .rows
                .iter()
                .any(|v| keys.iter().all(|i| v[*i] == row[*i]))
        {
            return Err(Self::failure(
                &query,
                format!("UNIQUE constraint failed: {}", mapping.table),
            ));
        }
        table.rows.push(row);
        Ok(RowsAffected::new(1))
    }

    fn update(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
        values: &[(&str, Value)],
    ) -> Result<RowsAffected> {
        let query =
            self.statement(|out| self.writer.write_update(out, mapping, criteria, values))?;
        evaluate::validate(mapping, criteria)?;
        let assignments = values
            .iter()
            .map(|(property, value)| {
                let position = mapping.position(property)?;
                Ok((position, Self::column_value(&query, mapping, position, value)?))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut tables = self.write()?;
        let table = tables
            .get_mut(&mapping.table.full_name())
            .ok_or_else(|| Self::no_table(&query, mapping))?;
        let matched = table
            .rows
            .iter()
            .map(|row| evaluate::matches(mapping, criteria, row))
            .collect::<Result<Vec<_>>>()?;
        let mut updated = 0;
        for (row, _) in table.rows.iter_mut().zip(matched).filter(|(_, v)| *v) {
            for (position, value) in &assignments {
                row[*position] = value.clone();
            }
            updated += 1;
        }
        Ok(RowsAffected::new(updated))
    }

    fn compile_query(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
    ) -> Result<Pooled<QueryShape, Query>> {
        evaluate::validate(mapping, criteria)?;
        let mut query = self
            .queries
            .get(QueryShape::Select, |shape| Ok(Query::new(*shape)))?;
        self.writer.write_select(&mut query, mapping, criteria)?;
        query.mapping = Some(mapping);
        query.criteria = Some(criteria.clone());
        log::debug!("{}", *query);
        Ok(query)
    }

    fn execute(
        &self,
        query: &Query,
        callback: &mut dyn FnMut(RowLabeled) -> Result<()>,
    ) -> Result<()> {
        let (Some(mapping), Some(criteria)) = (query.mapping, &query.criteria) else {
            return Err(Error::msg(format!(
                "The query was not compiled by the memory backend:\n{}",
                query
            )));
        };
        let rows = self.rows(query, mapping)?;
        let labels = mapping.labels();
        for row in evaluate::select(mapping, criteria, &rows)? {
            callback(RowLabeled::new(labels.clone(), row))?;
        }
        Ok(())
    }

    fn count(&self, mapping: Mapping, criteria: &Criteria) -> Result<u64> {
        evaluate::validate(mapping, criteria)?;
        let query = self.statement(|out| self.writer.write_count(out, mapping, criteria))?;
        let total = evaluate::count(mapping, criteria, &self.rows(&query, mapping)?)?;
        Ok(paginated_count(total, criteria.start, criteria.limit))
    }

    fn count_grouped(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
        group_by: &[&str],
    ) -> Result<Vec<GroupCount>> {
        evaluate::validate(mapping, criteria)?;
        let query = self.statement(|out| {
            self.writer
                .write_count_grouped(out, mapping, criteria, group_by)
        })?;
        evaluate::count_grouped(mapping, criteria, &self.rows(&query, mapping)?, group_by)
    }
}
