use crate::{SqliteConnection, SqliteSqlWriter, SqliteTransaction};
use std::fmt::{self, Debug, Formatter};
use trove_core::{
    AsValue, Backend, Command, ConnectionDescriptor, Criteria, GroupCount, JoinCriteria, Mapping,
    Pool, PoolStats, Pooled, Query, QueryShape, Result, RowLabeled, RowsAffected, SqlWriter,
    Value, paginated_count,
};

/// Sqlite storage, runs joins natively against tables of the same database.
pub struct SqliteBackend {
    pub(crate) descriptor: ConnectionDescriptor,
    pub(crate) writer: SqliteSqlWriter,
    pub(crate) connections: Pool<String, SqliteConnection>,
    pub(crate) commands: Pool<(String, String), Command>,
    pub(crate) queries: Pool<QueryShape, Query>,
}

impl SqliteBackend {
    /// Open the database, failing early when it cannot be reached.
    pub fn open(descriptor: ConnectionDescriptor) -> Result<Self> {
        let max_idle = descriptor.pool_max_idle;
        let result = Self {
            descriptor,
            writer: SqliteSqlWriter {},
            connections: Pool::new("sqlite connection", max_idle),
            commands: Pool::new("sqlite command", max_idle * 16),
            queries: Pool::new("sqlite query", max_idle),
        };
        drop(result.lease()?);
        Ok(result)
    }

    pub(crate) fn lease(&self) -> Result<Pooled<String, SqliteConnection>> {
        self.connections
            .get(self.descriptor.identity().to_string(), |_| {
                SqliteConnection::open(&self.descriptor)
            })
    }

    /// Start a transaction pinned on one connection.
    pub fn begin(&self) -> Result<SqliteTransaction<'_>> {
        SqliteTransaction::new(self)
    }

    pub fn connection_stats(&self) -> PoolStats {
        self.connections.stats()
    }

    pub fn command_stats(&self) -> PoolStats {
        self.commands.stats()
    }

    pub fn query_stats(&self) -> PoolStats {
        self.queries.stats()
    }

    pub(crate) fn session(&self) -> Session<'_> {
        Session {
            backend: self,
            pinned: None,
            transaction: None,
        }
    }
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("descriptor", &self.descriptor.identity())
            .field("connections", &self.connections)
            .field("commands", &self.commands)
            .field("queries", &self.queries)
            .finish()
    }
}

/// Where statements run: a connection leased per call, or the one pinned by a transaction.
pub(crate) struct Session<'a> {
    pub(crate) backend: &'a SqliteBackend,
    pub(crate) pinned: Option<&'a SqliteConnection>,
    pub(crate) transaction: Option<u64>,
}

impl<'a> Session<'a> {
    fn with_connection<R>(&self, f: impl FnOnce(&SqliteConnection) -> Result<R>) -> Result<R> {
        match self.pinned {
            Some(connection) => f(connection),
            None => {
                let connection = self.backend.lease()?;
                f(&*connection)
            }
        }
    }

    fn command(&self, query: &Query) -> Result<Pooled<(String, String), Command>> {
        let key = (
            query.text.clone(),
            self.backend.descriptor.identity().to_string(),
        );
        let mut command = self
            .backend
            .commands
            .get(key, |(text, _)| Ok(Command::new(text.clone())))?;
        command.params.extend(query.params.iter().cloned());
        command.transaction = self.transaction;
        Ok(command)
    }

    fn new_query(&self, shape: QueryShape) -> Result<Pooled<QueryShape, Query>> {
        self.backend.queries.get(shape, |shape| Ok(Query::new(*shape)))
    }

    /// Compile with `write` and run as a statement.
    fn statement(&self, write: impl FnOnce(&mut Query) -> Result<()>) -> Result<RowsAffected> {
        let mut query = self.new_query(QueryShape::Statement)?;
        write(&mut *query)?;
        log::debug!("{}", *query);
        let command = self.command(&query)?;
        self.with_connection(|connection| connection.execute(&command))
    }

    pub(crate) fn execute_batch(&self, sql: &str) -> Result<()> {
        log::debug!("{}", sql);
        self.with_connection(|connection| connection.execute_batch(sql))
    }

    fn single_count(&self, query: &Query) -> Result<u64> {
        let mut count = 0;
        self.execute(query, &mut |row| {
            let value = row.values.into_vec().into_iter().next().unwrap_or_default();
            count = i64::try_from_value(value)?.max(0) as u64;
            Ok(())
        })?;
        Ok(count)
    }

    pub(crate) fn create_table(&self, mapping: Mapping, if_not_exists: bool) -> Result<()> {
        self.statement(|out| {
            self.backend
                .writer
                .write_create_table(out, mapping, if_not_exists)
        })
        .map(|_| ())
    }

    pub(crate) fn drop_table(&self, mapping: Mapping, if_exists: bool) -> Result<()> {
        self.statement(|out| {
            self.backend.writer.write_drop_table(out, mapping, if_exists);
            Ok(())
        })
        .map(|_| ())
    }

    pub(crate) fn delete(&self, mapping: Mapping, criteria: &Criteria) -> Result<RowsAffected> {
        self.statement(|out| self.backend.writer.write_delete(out, mapping, criteria))
    }

    pub(crate) fn delete_all(&self, mapping: Mapping) -> Result<RowsAffected> {
        self.statement(|out| {
            self.backend.writer.write_delete_all(out, mapping);
            Ok(())
        })
    }

    pub(crate) fn insert(&self, mapping: Mapping, row: &[Value]) -> Result<RowsAffected> {
        self.statement(|out| self.backend.writer.write_insert(out, mapping, row))
    }

    pub(crate) fn update(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
        values: &[(&str, Value)],
    ) -> Result<RowsAffected> {
        self.statement(|out| {
            self.backend
                .writer
                .write_update(out, mapping, criteria, values)
        })
    }

    pub(crate) fn compile_query(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
    ) -> Result<Pooled<QueryShape, Query>> {
        let mut query = self.new_query(QueryShape::Select)?;
        query.mapping = Some(mapping);
        self.backend.writer.write_select(&mut query, mapping, criteria)?;
        log::debug!("{}", *query);
        Ok(query)
    }

    pub(crate) fn execute(
        &self,
        query: &Query,
        callback: &mut dyn FnMut(RowLabeled) -> Result<()>,
    ) -> Result<()> {
        let command = self.command(query)?;
        self.with_connection(|connection| connection.query(&command, callback))
    }

    pub(crate) fn count(&self, mapping: Mapping, criteria: &Criteria) -> Result<u64> {
        let mut query = self.new_query(QueryShape::Count)?;
        self.backend.writer.write_count(&mut query, mapping, criteria)?;
        log::debug!("{}", *query);
        let total = self.single_count(&query)?;
        Ok(paginated_count(total, criteria.start, criteria.limit))
    }

    pub(crate) fn count_grouped(
        &self,
        mapping: Mapping,
        criteria: &Criteria,
        group_by: &[&str],
    ) -> Result<Vec<GroupCount>> {
        let columns = group_by
            .iter()
            .map(|v| mapping.column(v))
            .collect::<Result<Vec<_>>>()?;
        let mut query = self.new_query(QueryShape::CountGrouped)?;
        self.backend
            .writer
            .write_count_grouped(&mut query, mapping, criteria, group_by)?;
        log::debug!("{}", *query);
        let mut result = Vec::new();
        self.execute(&query, &mut |row| {
            let count = row.get_column("gb_count").cloned().unwrap_or_default();
            let values = columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = row
                        .get_column(&format!("gb_{}", i))
                        .cloned()
                        .unwrap_or_default();
                    value.coerce(&column.value)
                })
                .collect::<Result<Vec<_>>>()?;
            result.push(GroupCount {
                count: i64::try_from_value(count)?.max(0) as u64,
                values,
            });
            Ok(())
        })?;
        Ok(result)
    }

    pub(crate) fn can_join_natively(&self, other: &dyn Backend) -> bool {
        other.name() == self.backend.name()
            && other.descriptor().identity() == self.backend.descriptor.identity()
    }

    pub(crate) fn compile_join_query(
        &self,
        left: Mapping,
        right: Mapping,
        criteria: &JoinCriteria,
    ) -> Result<Pooled<QueryShape, Query>> {
        let mut query = self.new_query(QueryShape::Join)?;
        query.mapping = Some(left);
        query.joined = Some(right);
        self.backend
            .writer
            .write_join_select(&mut query, left, right, criteria)?;
        log::debug!("{}", *query);
        Ok(query)
    }

    pub(crate) fn count_join(
        &self,
        left: Mapping,
        right: Mapping,
        criteria: &JoinCriteria,
    ) -> Result<u64> {
        let mut query = self.new_query(QueryShape::JoinCount)?;
        self.backend
            .writer
            .write_join_count(&mut query, left, right, criteria)?;
        log::debug!("{}", *query);
        let total = self.single_count(&query)?;
        Ok(paginated_count(total, criteria.start, criteria.limit))
    }
}

/// Implements `Backend` and `JoinBackend` by forwarding every call to `self.session()`.
macro_rules! impl_sqlite_backend {
    ($ty:ty) => {
        impl trove_core::Backend for $ty {
            fn name(&self) -> &'static str {
                <crate::SqliteDriver as trove_core::Driver>::NAME
            }

            fn descriptor(&self) -> &trove_core::ConnectionDescriptor {
                &self.session().backend.descriptor
            }

            fn create_table(&self, mapping: trove_core::Mapping, if_not_exists: bool) -> trove_core::Result<()> {
                self.session().create_table(mapping, if_not_exists)
            }

            fn drop_table(&self, mapping: trove_core::Mapping, if_exists: bool) -> trove_core::Result<()> {
                self.session().drop_table(mapping, if_exists)
            }

            fn delete(
                &self,
                mapping: trove_core::Mapping,
                criteria: &trove_core::Criteria,
            ) -> trove_core::Result<trove_core::RowsAffected> {
                self.session().delete(mapping, criteria)
            }

            fn delete_all(&self, mapping: trove_core::Mapping) -> trove_core::Result<trove_core::RowsAffected> {
                self.session().delete_all(mapping)
            }

            fn insert(
                &self,
                mapping: trove_core::Mapping,
                row: &[trove_core::Value],
            ) -> trove_core::Result<trove_core::RowsAffected> {
                self.session().insert(mapping, row)
            }

            fn update(
                &self,
                mapping: trove_core::Mapping,
                criteria: &trove_core::Criteria,
                values: &[(&str, trove_core::Value)],
            ) -> trove_core::Result<trove_core::RowsAffected> {
                self.session().update(mapping, criteria, values)
            }

            fn compile_query(
                &self,
                mapping: trove_core::Mapping,
                criteria: &trove_core::Criteria,
            ) -> trove_core::Result<trove_core::Pooled<trove_core::QueryShape, trove_core::Query>> {
                self.session().compile_query(mapping, criteria)
            }

            fn execute(
                &self,
                query: &trove_core::Query,
                callback: &mut dyn FnMut(trove_core::RowLabeled) -> trove_core::Result<()>,
            ) -> trove_core::Result<()> {
                self.session().execute(query, callback)
            }

            fn count(&self, mapping: trove_core::Mapping, criteria: &trove_core::Criteria) -> trove_core::Result<u64> {
                self.session().count(mapping, criteria)
            }

            fn count_grouped(
                &self,
                mapping: trove_core::Mapping,
                criteria: &trove_core::Criteria,
                group_by: &[&str],
            ) -> trove_core::Result<Vec<trove_core::GroupCount>> {
                self.session().count_grouped(mapping, criteria, group_by)
            }

            fn as_join_backend(&self) -> Option<&dyn trove_core::JoinBackend> {
                Some(self)
            }
        }

        impl trove_core::JoinBackend for $ty {
            fn can_join_natively(
                &self,
                _criteria: &trove_core::JoinCriteria,
                other: &dyn trove_core::Backend,
            ) -> bool {
                self.session().can_join_natively(other)
            }

            fn supports_join_type(&self, join_type: trove_core::JoinType) -> bool {
                trove_core::SqlWriter::supports_join_type(&self.session().backend.writer, join_type)
            }

            fn compile_join_query(
                &self,
                left: trove_core::Mapping,
                right: trove_core::Mapping,
                criteria: &trove_core::JoinCriteria,
            ) -> trove_core::Result<trove_core::Pooled<trove_core::QueryShape, trove_core::Query>> {
                self.session().compile_join_query(left, right, criteria)
            }

            fn count_join(
                &self,
                left: trove_core::Mapping,
                right: trove_core::Mapping,
                criteria: &trove_core::JoinCriteria,
            ) -> trove_core::Result<u64> {
                self.session().count_join(left, right, criteria)
            }
        }
    };
}
pub(crate) use impl_sqlite_backend;

impl_sqlite_backend!(SqliteBackend);
