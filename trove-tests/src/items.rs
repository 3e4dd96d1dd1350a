use std::mem;
use time::{Date, macros::date};
use trove::{
    AsValue, ColumnDef, Entity, Error, Result, Row, RowLabeled, TableRef, Value,
};
use uuid::Uuid;

fn take<T: AsValue>(row: &mut RowLabeled, name: &str) -> Result<T> {
    let Some(i) = row.labels.iter().position(|v| v == name) else {
        return Err(Error::msg(format!("column `{}` is missing", name)));
    };
    T::try_from_value(mem::take(&mut row.values[i]))
}

/// Left side of the join scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct LeftItem {
    pub id: i64,
    pub tag: String,
}

static LEFT_ITEM_TABLE: TableRef = TableRef::new("left_item");
static LEFT_ITEM_COLUMNS: [ColumnDef; 2] = [
    ColumnDef::key("id", "id", Value::Int64(None)),
    ColumnDef::required("tag", "tag", Value::Varchar(None)),
];

impl LeftItem {
    pub fn new(id: i64, tag: &str) -> Self {
        Self {
            id,
            tag: tag.into(),
        }
    }
}

impl Entity for LeftItem {
    fn table() -> &'static TableRef {
        &LEFT_ITEM_TABLE
    }

    fn columns() -> &'static [ColumnDef] {
        &LEFT_ITEM_COLUMNS
    }

    fn row(&self) -> Row {
        Box::new([self.id.as_value(), self.tag.clone().as_value()])
    }

    fn from_row(mut row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: take(&mut row, "id")?,
            tag: take(&mut row, "tag")?,
        })
    }
}

/// Right side of the join scenarios, `tag` maps on the `label` column.
#[derive(Debug, Clone, PartialEq)]
pub struct RightItem {
    pub id: i64,
    pub tag: String,
}

static RIGHT_ITEM_TABLE: TableRef = TableRef::new("right_item");
static RIGHT_ITEM_COLUMNS: [ColumnDef; 2] = [
    ColumnDef::key("id", "id", Value::Int64(None)),
    ColumnDef::required("tag", "label", Value::Varchar(None)),
];

impl RightItem {
    pub fn new(id: i64, tag: &str) -> Self {
        Self {
            id,
            tag: tag.into(),
        }
    }
}

impl Entity for RightItem {
    fn table() -> &'static TableRef {
        &RIGHT_ITEM_TABLE
    }

    fn columns() -> &'static [ColumnDef] {
        &RIGHT_ITEM_COLUMNS
    }

    fn row(&self) -> Row {
        Box::new([self.id.as_value(), self.tag.clone().as_value()])
    }

    fn from_row(mut row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: take(&mut row, "id")?,
            tag: take(&mut row, "label")?,
        })
    }
}

/// Recreate both join tables: left tagged one..five, right tagged one, two, three, 4, 5.
pub fn setup_items(left: &dyn trove::Backend, right: &dyn trove::Backend) {
    LeftItem::drop_table(left, true).expect("Failed to drop the left_item table");
    LeftItem::create_table(left, false).expect("Failed to create the left_item table");
    RightItem::drop_table(right, true).expect("Failed to drop the right_item table");
    RightItem::create_table(right, false).expect("Failed to create the right_item table");
    let lefts = [
        LeftItem::new(1, "one"),
        LeftItem::new(2, "two"),
        LeftItem::new(3, "three"),
        LeftItem::new(4, "four"),
        LeftItem::new(5, "five"),
    ];
    let rights = [
        RightItem::new(1, "one"),
        RightItem::new(2, "two"),
        RightItem::new(3, "three"),
        RightItem::new(4, "4"),
        RightItem::new(5, "5"),
    ];
    let result = LeftItem::insert_many(left, &lefts).expect("Failed to insert the left items");
    assert_eq!(result.rows_affected, Some(5));
    let result = RightItem::insert_many(right, &rights).expect("Failed to insert the right items");
    assert_eq!(result.rows_affected, Some(5));
}

/// Entity exercising every column type the backends store.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub flags: i64,
    pub available: bool,
    pub added: Option<Date>,
    pub code: Option<Uuid>,
    pub note: Option<String>,
}

static PRODUCT_TABLE: TableRef = TableRef::new("product");
static PRODUCT_COLUMNS: [ColumnDef; 9] = [
    ColumnDef::key("id", "id", Value::Int64(None)),
    ColumnDef::required("name", "name", Value::Varchar(None)),
    ColumnDef::required("price", "price", Value::Float64(None)),
    ColumnDef::required("quantity", "quantity", Value::Int32(None)),
    ColumnDef::required("flags", "flags", Value::Int64(None)),
    ColumnDef::required("available", "available", Value::Boolean(None)),
    ColumnDef::new("added", "added_on", Value::Date(None)),
    ColumnDef::new("code", "code", Value::Uuid(None)),
    ColumnDef::new("note", "note", Value::Varchar(None)),
];

impl Entity for Product {
    fn table() -> &'static TableRef {
        &PRODUCT_TABLE
    }

    fn columns() -> &'static [ColumnDef] {
        &PRODUCT_COLUMNS
    }

    fn row(&self) -> Row {
        Box::new([
            self.id.as_value(),
            self.name.clone().as_value(),
            self.price.as_value(),
            self.quantity.as_value(),
            self.flags.as_value(),
            self.available.as_value(),
            self.added.as_value(),
            self.code.as_value(),
            self.note.clone().as_value(),
        ])
    }

    fn from_row(mut row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: take(&mut row, "id")?,
            name: take(&mut row, "name")?,
            price: take(&mut row, "price")?,
            quantity: take(&mut row, "quantity")?,
            flags: take(&mut row, "flags")?,
            available: take(&mut row, "available")?,
            added: take(&mut row, "added_on")?,
            code: take(&mut row, "code")?,
            note: take(&mut row, "note")?,
        })
    }
}

pub const KEYBOARD_CODE: &str = "5e915574-bb30-4430-98cf-c5854f61fbbd";
pub const MONITOR_CODE: &str = "0b1c9a7e-3f52-4c55-9d8e-2a6f4e1d7c30";

pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Keyboard".into(),
            price: 49.5,
            quantity: 10,
            flags: 0b011,
            available: true,
            added: Some(date!(2024 - 01 - 10)),
            code: Uuid::parse_str(KEYBOARD_CODE).ok(),
            note: Some("wireless".into()),
        },
        Product {
            id: 2,
            name: "Mouse".into(),
            price: 19.0,
            quantity: 0,
            flags: 0b001,
            available: false,
            added: Some(date!(2024 - 02 - 01)),
            code: None,
            note: None,
        },
        Product {
            id: 3,
            name: "Monitor".into(),
            price: 199.99,
            quantity: 3,
            flags: 0b110,
            available: true,
            added: None,
            code: Uuid::parse_str(MONITOR_CODE).ok(),
            note: Some("27 inch".into()),
        },
        Product {
            id: 4,
            name: "mousepad".into(),
            price: 5.25,
            quantity: 100,
            flags: 0b000,
            available: true,
            added: Some(date!(2023 - 12 - 24)),
            code: None,
            note: None,
        },
        Product {
            id: 5,
            name: "Webcam".into(),
            price: 89.0,
            quantity: 7,
            flags: 0b111,
            available: false,
            added: Some(date!(2024 - 03 - 15)),
            code: None,
            note: Some("hd".into()),
        },
    ]
}

/// Recreate the product table with the five products.
pub fn setup_products(backend: &dyn trove::Backend) {
    Product::drop_table(backend, true).expect("Failed to drop the product table");
    Product::create_table(backend, false).expect("Failed to create the product table");
    let result =
        Product::insert_many(backend, &products()).expect("Failed to insert the products");
    assert_eq!(result.rows_affected, Some(5));
}
