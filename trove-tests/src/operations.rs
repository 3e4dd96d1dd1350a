use crate::{Product, products, setup_products};
use trove::{
    Backend, Criteria, DaoError, Entity, ErrorKind, Expression, Value, error_kind,
};

fn by_id(id: i64) -> Criteria {
    Criteria::new().with(Expression::equal("id", id))
}

pub fn operations(backend: &dyn Backend) {
    setup_products(backend);

    // Update
    let result = Product::update_many(backend, &by_id(2), &[("quantity", Value::from(5))])
        .expect("Failed to update the mouse");
    assert_eq!(result.rows_affected, Some(1));
    let mouse = Product::find_one(backend, &by_id(2))
        .expect("Failed to query the mouse")
        .expect("The mouse is missing");
    assert_eq!(mouse.quantity, 5);
    assert_eq!(mouse.name, "Mouse");

    let result = Product::update_many(
        backend,
        &Criteria::new().with(Expression::equal("available", false)),
        &[("note", Value::from("discontinued")), ("available", Value::from(true))],
    )
    .expect("Failed to update the unavailable products");
    assert_eq!(result.rows_affected, Some(2));
    assert_eq!(
        Product::count(backend, &Criteria::new().with(Expression::equal("note", "discontinued")))
            .expect("Failed to count the discontinued products"),
        2
    );

    let result = backend
        .update_batch(
            Product::mapping(),
            &[
                (by_id(1), vec![("price", Value::from(45.0))]),
                (by_id(3), vec![("price", Value::from(189.0))]),
            ],
        )
        .expect("Failed to run the batch update");
    assert_eq!(result.rows_affected, Some(2));
    let prices: Vec<_> = Product::find_many(
        backend,
        &Criteria::new().with(Expression::in_list("id", [1, 3])),
    )
    .expect("Failed to query the updated prices")
    .into_iter()
    .map(|v| v.price)
    .collect();
    assert!(prices.contains(&45.0) && prices.contains(&189.0));

    let error = Product::update_many(backend, &Criteria::new(), &[("quantity", Value::from(0))])
        .expect_err("An update without filter must be rejected");
    assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
    let error = Product::update_many(backend, &by_id(1), &[])
        .expect_err("An update without values must be rejected");
    assert!(matches!(
        error.downcast_ref::<DaoError>(),
        Some(DaoError::EmptyAssignment)
    ));

    // Delete
    let error = Product::delete_many(backend, &Criteria::new())
        .expect_err("A delete without filter must be rejected");
    assert!(matches!(
        error.downcast_ref::<DaoError>(),
        Some(DaoError::EmptyCriteria { .. })
    ));
    assert_eq!(
        Product::count(backend, &Criteria::new()).expect("Failed to count the products"),
        5,
        "A rejected delete must not remove anything"
    );
    let result = Product::delete_many(
        backend,
        &Criteria::new().with(Expression::lesser("price", 10.0)),
    )
    .expect("Failed to delete the cheap products");
    assert_eq!(result.rows_affected, Some(1));
    assert_eq!(
        Product::find_one(backend, &by_id(4)).expect("Failed to query the mousepad"),
        None
    );

    // Constraints
    crate::silent_logs! {
        let error = Product::insert_one(backend, &products()[0])
            .expect_err("A duplicate key must be rejected");
        assert_eq!(error_kind(&error), Some(ErrorKind::Execution));
    }

    let result = Product::delete_all(backend).expect("Failed to delete every product");
    assert_eq!(result.rows_affected, Some(4));
    assert_eq!(
        Product::count(backend, &Criteria::new()).expect("Failed to count the products"),
        0
    );
}
