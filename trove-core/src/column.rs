use crate::Value;

/// Declarative specification of a mapped column.
///
/// `property` is the name criteria use to refer to the column, `name` is the
/// physical column name. `value` is a typed NULL describing the column type.
#[derive(Debug, PartialEq)]
pub struct ColumnDef {
    pub property: &'static str,
    pub name: &'static str,
    pub value: Value,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnDef {
    pub const fn new(property: &'static str, name: &'static str, value: Value) -> Self {
        Self {
            property,
            name,
            value,
            nullable: true,
            primary_key: false,
        }
    }

    /// A non nullable primary key column.
    pub const fn key(property: &'static str, name: &'static str, value: Value) -> Self {
        Self {
            property,
            name,
            value,
            nullable: false,
            primary_key: true,
        }
    }

    /// A non nullable column.
    pub const fn required(property: &'static str, name: &'static str, value: Value) -> Self {
        Self {
            property,
            name,
            value,
            nullable: false,
            primary_key: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
