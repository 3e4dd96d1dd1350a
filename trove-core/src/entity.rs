use crate::{
    Backend, ColumnDef, Criteria, DaoError, Error, GroupCount, Result, Row, RowLabeled,
    RowNames, RowsAffected, TableRef, Value,
};

/// Where an entity lives: its table and its columns in canonical order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapping {
    pub table: &'static TableRef,
    pub columns: &'static [ColumnDef],
}

impl Mapping {
    pub const fn new(table: &'static TableRef, columns: &'static [ColumnDef]) -> Self {
        Self { table, columns }
    }

    /// Resolve a property into its column.
    pub fn column(&self, property: &str) -> Result<&'static ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.property == property)
            .ok_or_else(|| self.unknown(property))
    }

    /// Index of the property in the canonical column order.
    pub fn position(&self, property: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.property == property)
            .ok_or_else(|| self.unknown(property))
    }

    fn unknown(&self, property: &str) -> Error {
        Error::new(DaoError::UnknownProperty {
            table: self.table.full_name(),
            property: property.to_string(),
        })
    }

    /// Column names in canonical order.
    pub fn labels(&self) -> RowNames {
        self.columns.iter().map(|c| c.name.to_string()).collect()
    }

    /// Columns telling whether a row exists: the primary key, or every column without one.
    pub fn key_positions(&self) -> Vec<usize> {
        let keys: Vec<_> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i)
            .collect();
        if keys.is_empty() {
            (0..self.columns.len()).collect()
        } else {
            keys
        }
    }

    /// Reorder a labeled row into canonical column order, coercing each
    /// value into the column type.
    pub fn project(&self, backend: &dyn Backend, row: RowLabeled) -> Result<Row> {
        let RowLabeled { labels, values } = row;
        let mut values = values.into_vec();
        self.columns
            .iter()
            .map(|column| {
                let Some(i) = labels.iter().position(|v| v == column.name) else {
                    return Err(Error::new(DaoError::result_processing(
                        &self.table.full_name(),
                        Error::msg(format!("column `{}` is missing from the row", column.name)),
                    )));
                };
                backend
                    .coerce_type(std::mem::take(&mut values[i]), &column.value)
                    .map_err(|e| {
                        Error::new(DaoError::result_processing(&self.table.full_name(), e))
                    })
            })
            .collect()
    }

    /// Build an entity out of a row in canonical column order.
    pub fn decode<E: Entity>(&self, labels: &RowNames, values: Row) -> Result<E> {
        E::from_row(RowLabeled::new(labels.clone(), values))
            .map_err(|e| Error::new(DaoError::result_processing(&self.table.full_name(), e)))
    }

    /// Fetch the rows matching `criteria`, in canonical column order.
    pub fn fetch(&self, backend: &dyn Backend, criteria: &Criteria) -> Result<Vec<Row>> {
        let query = backend.compile_query(*self, criteria)?;
        let mut rows = Vec::new();
        let result = backend.execute(&query, &mut |row| {
            rows.push(self.project(backend, row)?);
            Ok(())
        });
        backend.dispose_query(query);
        result.map(|_| rows)
    }
}

/// A type mapped onto a table.
pub trait Entity {
    fn table() -> &'static TableRef;
    fn columns() -> &'static [ColumnDef];

    fn mapping() -> Mapping {
        Mapping::new(Self::table(), Self::columns())
    }

    /// Column values in canonical column order.
    fn row(&self) -> Row;

    /// Decode a row labeled with the column names, values already have the column types.
    fn from_row(row: RowLabeled) -> Result<Self>
    where
        Self: Sized;

    fn create_table(backend: &dyn Backend, if_not_exists: bool) -> Result<()> {
        backend.create_table(Self::mapping(), if_not_exists)
    }

    fn drop_table(backend: &dyn Backend, if_exists: bool) -> Result<()> {
        backend.drop_table(Self::mapping(), if_exists)
    }

    fn insert_one(backend: &dyn Backend, entity: &Self) -> Result<RowsAffected> {
        backend.insert(Self::mapping(), &entity.row())
    }

    fn insert_many<'a, It>(backend: &dyn Backend, items: It) -> Result<RowsAffected>
    where
        Self: 'a,
        It: IntoIterator<Item = &'a Self>,
    {
        let rows: Vec<_> = items.into_iter().map(Entity::row).collect();
        backend.insert_batch(Self::mapping(), &rows)
    }

    fn find_many(backend: &dyn Backend, criteria: &Criteria) -> Result<Vec<Self>>
    where
        Self: Sized,
    {
        let mapping = Self::mapping();
        let labels = mapping.labels();
        mapping
            .fetch(backend, criteria)?
            .into_iter()
            .map(|row| mapping.decode(&labels, row))
            .collect()
    }

    fn find_one(backend: &dyn Backend, criteria: &Criteria) -> Result<Option<Self>>
    where
        Self: Sized,
    {
        let criteria = criteria.clone().limit(1);
        Ok(Self::find_many(backend, &criteria)?.into_iter().next())
    }

    /// Number of rows `find_many` would return.
    fn count(backend: &dyn Backend, criteria: &Criteria) -> Result<u64> {
        backend.count(Self::mapping(), criteria)
    }

    fn count_grouped(
        backend: &dyn Backend,
        criteria: &Criteria,
        group_by: &[&str],
    ) -> Result<Vec<GroupCount>> {
        backend.count_grouped(Self::mapping(), criteria, group_by)
    }

    fn update_many(
        backend: &dyn Backend,
        criteria: &Criteria,
        values: &[(&str, Value)],
    ) -> Result<RowsAffected> {
        backend.update(Self::mapping(), criteria, values)
    }

    /// Refuses an empty criteria, see [`Entity::delete_all`].
    fn delete_many(backend: &dyn Backend, criteria: &Criteria) -> Result<RowsAffected> {
        backend.delete(Self::mapping(), criteria)
    }

    fn delete_all(backend: &dyn Backend) -> Result<RowsAffected> {
        backend.delete_all(Self::mapping())
    }
}
