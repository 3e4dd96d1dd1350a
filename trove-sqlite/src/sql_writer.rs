use trove_core::{Context, JoinType, Query, SqlWriter, Value};

/// First sqlite release with `RIGHT JOIN` and `FULL OUTER JOIN`.
const RIGHT_JOIN_VERSION: i32 = 3_039_000;

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter {}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_column_type(&self, _context: &Context, out: &mut Query, value: &Value) {
        out.push_str(match value {
            Value::Null => "TEXT",
            Value::Boolean(..) => "INTEGER",
            Value::Int32(..) => "INTEGER",
            Value::Int64(..) => "INTEGER",
            Value::Float64(..) => "REAL",
            Value::Decimal(..) => "REAL",
            Value::Varchar(..) => "TEXT",
            Value::Blob(..) => "BLOB",
            Value::Date(..) => "TEXT",
            Value::Time(..) => "TEXT",
            Value::Timestamp(..) => "TEXT",
            Value::Uuid(..) => "TEXT",
        });
    }

    fn write_pagination(
        &self,
        _context: &Context,
        out: &mut Query,
        start: Option<u64>,
        limit: Option<u64>,
    ) {
        // OFFSET is only valid after LIMIT
        if limit.is_none() && start.is_none() {
            return;
        }
        out.push_str("\nLIMIT ");
        match limit {
            Some(limit) => out.push_str(&limit.to_string()),
            None => out.push_str("-1"),
        }
        if let Some(start) = start {
            out.push_str(" OFFSET ");
            out.push_str(&start.to_string());
        }
    }

    fn supports_join_type(&self, join_type: JoinType) -> bool {
        match join_type {
            JoinType::Inner | JoinType::LeftOuter => true,
            JoinType::RightOuter | JoinType::Outer => {
                rusqlite::version_number() >= RIGHT_JOIN_VERSION
            }
        }
    }
}
