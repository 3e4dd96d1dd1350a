use crate::{Product, setup_products};
use trove::{Backend, Criteria, Entity, Expression, GroupCount, Value};

pub fn counts(backend: &dyn Backend) {
    setup_products(backend);

    let count = |criteria: &Criteria| {
        Product::count(backend, criteria)
            .unwrap_or_else(|e| panic!("Failed to count the products with {:?}: {:#}", criteria, e))
    };
    let cheap = Criteria::new().with(Expression::greater("price", 10.0));
    assert_eq!(count(&Criteria::new()), 5);
    assert_eq!(count(&cheap), 4);
    assert_eq!(count(&cheap.clone().limit(2)), 2);
    assert_eq!(count(&cheap.clone().start(3)), 1);
    assert_eq!(count(&cheap.clone().start(7)), 0);
    for criteria in [cheap.clone(), cheap.clone().start(1).limit(2)] {
        assert_eq!(
            count(&criteria),
            Product::find_many(backend, &criteria)
                .expect("Failed to query the products")
                .len() as u64
        );
    }

    let grouped = Product::count_grouped(backend, &Criteria::new(), &["available"])
        .expect("Failed to count the products by availability");
    assert_eq!(
        grouped,
        [
            GroupCount {
                count: 2,
                values: vec![Value::Boolean(Some(false))],
            },
            GroupCount {
                count: 3,
                values: vec![Value::Boolean(Some(true))],
            },
        ]
    );

    let grouped = Product::count_grouped(
        backend,
        &Criteria::new().with(Expression::greater("quantity", 1)),
        &["available", "note"],
    )
    .expect("Failed to count the products by availability and note");
    assert_eq!(
        grouped,
        [
            GroupCount {
                count: 1,
                values: vec![Value::Boolean(Some(false)), Value::Varchar(Some("hd".into()))],
            },
            GroupCount {
                count: 1,
                values: vec![Value::Boolean(Some(true)), Value::Varchar(None)],
            },
            GroupCount {
                count: 1,
                values: vec![Value::Boolean(Some(true)), Value::Varchar(Some("27 inch".into()))],
            },
            GroupCount {
                count: 1,
                values: vec![
                    Value::Boolean(Some(true)),
                    Value::Varchar(Some("wireless".into()))
                ],
            },
        ]
    );

    let grouped = Product::count_grouped(backend, &Criteria::new().limit(1), &["available"])
        .expect("Failed to count the first group");
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].count, 2);

    let total = Product::count_grouped(backend, &Criteria::new(), &[])
        .expect("Failed to count without groups");
    assert_eq!(
        total,
        [GroupCount {
            count: 5,
            values: vec![],
        }]
    );
}
