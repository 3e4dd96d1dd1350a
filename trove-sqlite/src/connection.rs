use crate::extract::{bind_value, extract_value};
use rusqlite::{Connection, OpenFlags, config::DbConfig, params_from_iter};
use std::sync::{Mutex, MutexGuard};
use trove_core::{
    Command, ConnectionDescriptor, DaoError, Error, Poolable, Result, Row, RowLabeled, RowNames,
    RowsAffected, log_error,
};
use url::form_urlencoded;

/// A pooled sqlite connection.
///
/// The handle is guarded so that a connection pinned by a transaction can be
/// shared, statements are prepared through the rusqlite statement cache.
pub struct SqliteConnection {
    identity: String,
    connection: Mutex<Connection>,
}

impl SqliteConnection {
    /// Open `file:<location>?<options>`, options go straight to sqlite (`mode`, `cache`, ...).
    pub fn open(descriptor: &ConnectionDescriptor) -> Result<Self> {
        let mut uri = format!("file:{}", descriptor.location());
        if !descriptor.options().is_empty() {
            uri.push('?');
            uri.push_str(
                &form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(descriptor.options())
                    .finish(),
            );
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(&uri, flags)
            .and_then(|connection| {
                connection.busy_timeout(descriptor.busy_timeout)?;
                connection.pragma_update(None, "case_sensitive_like", true)?;
                // Quoted names are identifiers only, never string literals
                connection.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DML, false)?;
                connection.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DDL, false)?;
                Ok(connection)
            })
            .map_err(|e| {
                log_error!(
                    Error::new(e)
                        .context(format!("Could not open the sqlite database `{}`", descriptor))
                )
            })?;
        log::debug!("Opened the sqlite connection {}", descriptor);
        Ok(Self {
            identity: descriptor.identity().to_string(),
            connection: Mutex::new(connection),
        })
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|_| {
            Error::new(DaoError::PoolDiscipline(format!(
                "the connection to {} was poisoned by a panic",
                self.identity
            )))
        })
    }

    fn failure(command: &Command, error: rusqlite::Error) -> Error {
        log_error!(Error::new(DaoError::execution(
            &command.text,
            &command.params,
            error
        )))
    }

    /// Run a statement returning rows, `callback` is called while stepping.
    pub fn query(
        &self,
        command: &Command,
        callback: &mut dyn FnMut(RowLabeled) -> Result<()>,
    ) -> Result<()> {
        let connection = self.lock()?;
        let mut statement = connection
            .prepare_cached(&command.text)
            .map_err(|e| Self::failure(command, e))?;
        let labels: RowNames = statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let mut rows = statement
            .query(params_from_iter(command.params.iter().map(bind_value)))
            .map_err(|e| Self::failure(command, e))?;
        while let Some(row) = rows.next().map_err(|e| Self::failure(command, e))? {
            let values = (0..labels.len())
                .map(|i| {
                    row.get_ref(i)
                        .map_err(|e| Self::failure(command, e))
                        .and_then(extract_value)
                })
                .collect::<Result<Row>>()?;
            callback(RowLabeled::new(labels.clone(), values))?;
        }
        Ok(())
    }

    /// Run a statement not returning rows.
    pub fn execute(&self, command: &Command) -> Result<RowsAffected> {
        let connection = self.lock()?;
        let mut statement = connection
            .prepare_cached(&command.text)
            .map_err(|e| Self::failure(command, e))?;
        let rows = statement
            .execute(params_from_iter(command.params.iter().map(bind_value)))
            .map_err(|e| Self::failure(command, e))?;
        let mut result = RowsAffected::new(rows as u64);
        let id = connection.last_insert_rowid();
        if id != 0 {
            result.last_affected_id = Some(id);
        }
        Ok(result)
    }

    /// Run statements without parameters, used for transaction control.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.lock()?.execute_batch(sql).map_err(|e| {
            log_error!(Error::new(DaoError::execution(sql, &[], e)))
        })
    }

    pub fn is_autocommit(&self) -> bool {
        self.lock().map(|v| v.is_autocommit()).unwrap_or(true)
    }
}

impl Poolable for SqliteConnection {
    fn reset(&mut self) {
        let Ok(connection) = self.connection.get_mut() else {
            return;
        };
        if !connection.is_autocommit() {
            log::warn!(
                "A connection to {} went back to the pool inside a transaction, rolling back",
                self.identity
            );
            if let Err(e) = connection.execute_batch("ROLLBACK;") {
                log::error!("{:#}", Error::new(e));
            }
        }
    }
}
