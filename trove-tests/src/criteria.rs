use crate::{KEYBOARD_CODE, Product, products, setup_products};
use time::macros::date;
use trove::{Backend, Criteria, Entity, ErrorKind, Expression, Order, error_kind};
use uuid::Uuid;

fn ids(backend: &dyn Backend, criteria: &Criteria) -> Vec<i64> {
    let criteria = if criteria.orders.is_empty() {
        criteria.clone().order_by("id", Order::Asc)
    } else {
        criteria.clone()
    };
    Product::find_many(backend, &criteria)
        .unwrap_or_else(|e| panic!("Failed to query the products with {:?}: {:#}", criteria, e))
        .into_iter()
        .map(|v| v.id)
        .collect()
}

fn filtered(expression: Expression) -> Criteria {
    Criteria::new().with(expression)
}

pub fn criteria(backend: &dyn Backend) {
    setup_products(backend);

    // Round trip
    let all = Product::find_many(backend, &Criteria::new().order_by("id", Order::Asc))
        .expect("Failed to query all the products");
    assert_eq!(all, products());
    let monitor = Product::find_one(backend, &filtered(Expression::equal("id", 3)))
        .expect("Failed to query the monitor")
        .expect("The monitor is missing");
    assert_eq!(monitor, products()[2]);
    let missing = Product::find_one(backend, &filtered(Expression::equal("id", 42)))
        .expect("Failed to query a missing product");
    assert_eq!(missing, None);

    // Comparisons
    assert_eq!(ids(backend, &filtered(Expression::equal("name", "Mouse"))), [2]);
    assert_eq!(
        ids(backend, &filtered(Expression::not_equal("name", "Mouse"))),
        [1, 3, 4, 5]
    );
    assert_eq!(
        ids(backend, &filtered(Expression::equal_case_insensitive("name", "MOUSE"))),
        [2]
    );
    assert_eq!(ids(backend, &filtered(Expression::greater("price", 50.0))), [3, 5]);
    assert_eq!(ids(backend, &filtered(Expression::lesser("quantity", 5))), [2, 3]);
    assert_eq!(
        ids(backend, &filtered(Expression::between("price", 19.0, 89.0))),
        [1, 2, 5]
    );
    assert_eq!(
        ids(
            backend,
            &filtered(
                Expression::between("price", 19.0, 89.0)
                    .invert()
                    .expect("Between can be inverted")
            )
        ),
        [3, 4]
    );
    assert_eq!(ids(backend, &filtered(Expression::equal("available", true))), [1, 3, 4]);
    assert_eq!(
        ids(
            backend,
            &filtered(Expression::greater("added", date!(2024 - 01 - 15)))
        ),
        [2, 5]
    );
    assert_eq!(
        ids(
            backend,
            &filtered(Expression::equal(
                "code",
                Uuid::parse_str(KEYBOARD_CODE).expect("Valid uuid")
            ))
        ),
        [1]
    );

    // Patterns
    assert_eq!(ids(backend, &filtered(Expression::like("name", "Mo%"))), [2, 3]);
    assert_eq!(
        ids(backend, &filtered(Expression::like_case_insensitive("name", "mo%"))),
        [2, 3, 4]
    );
    assert_eq!(ids(backend, &filtered(Expression::like("name", "_ouse"))), [2]);

    // Bits, lists and nulls
    assert_eq!(ids(backend, &filtered(Expression::bitwise_and("flags", 0b010))), [1, 3, 5]);
    assert_eq!(
        ids(backend, &filtered(Expression::in_list("id", [1, 3, 9]))),
        [1, 3]
    );
    assert_eq!(ids(backend, &filtered(Expression::is_null("note"))), [2, 4]);
    assert_eq!(ids(backend, &filtered(Expression::is_not_null("note"))), [1, 3, 5]);
    assert_eq!(ids(backend, &filtered(Expression::is_null("added"))), [3]);

    // Composition
    let any = Criteria::any()
        .with(Expression::equal("name", "Mouse"))
        .with(Expression::greater("price", 100.0));
    assert_eq!(ids(backend, &any), [2, 3]);
    let nested = Criteria::new()
        .with(Expression::greater("quantity", 1))
        .with(Expression::nested(
            Criteria::any()
                .with(Expression::equal("name", "Keyboard"))
                .with(Expression::equal("name", "Webcam")),
        ));
    assert_eq!(ids(backend, &nested), [1, 5]);
    let inverted = nested.invert().expect("The criteria can be inverted");
    assert_eq!(ids(backend, &inverted), [2, 3, 4]);
    let twice = inverted.invert().expect("The criteria can be inverted");
    assert_eq!(twice, nested);
    assert_eq!(ids(backend, &twice), [1, 5]);

    // Ordering and pagination
    assert_eq!(
        ids(backend, &Criteria::new().order_by("price", Order::Desc)),
        [3, 5, 1, 2, 4]
    );
    assert_eq!(
        ids(
            backend,
            &Criteria::new()
                .order_by("available", Order::Asc)
                .order_by("name", Order::Asc)
        ),
        [2, 5, 1, 3, 4]
    );
    assert_eq!(ids(backend, &Criteria::new().start(1).limit(2)), [2, 3]);
    assert_eq!(ids(backend, &Criteria::new().start(3)), [4, 5]);
    assert_eq!(ids(backend, &Criteria::new().limit(1)), [1]);
    assert_eq!(ids(backend, &Criteria::new().start(10)), [] as [i64; 0]);

    // Configuration errors
    let error = Product::find_many(backend, &filtered(Expression::equal("missing", 1)))
        .expect_err("An unknown property must be rejected");
    assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
    let error = Product::find_many(backend, &filtered(Expression::in_list("id", Vec::<i64>::new())))
        .expect_err("An empty list must be rejected");
    assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
    let error = Product::find_many(
        backend,
        &filtered(Expression::greater("price", Option::<f64>::None)),
    )
    .expect_err("A NULL operand must be rejected");
    assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
}
