use crate::{LeftItem, RightItem, setup_items};
use trove::{
    Backend, Criteria, DaoError, ErrorKind, Expression, JoinCriteria, JoinExpression, JoinResult,
    Order, count_join, error_kind, fetch_join,
};

type Tags<'a> = Vec<(Option<&'a str>, Option<&'a str>)>;

fn tags(rows: &[JoinResult<LeftItem, RightItem>]) -> Tags<'_> {
    rows.iter()
        .map(|v| {
            (
                v.left.as_ref().map(|v| v.tag.as_str()),
                v.right.as_ref().map(|v| v.tag.as_str()),
            )
        })
        .collect()
}

fn join(
    left: &dyn Backend,
    right: &dyn Backend,
    criteria: &JoinCriteria,
) -> Vec<JoinResult<LeftItem, RightItem>> {
    let result = fetch_join::<LeftItem, RightItem>(left, right, criteria)
        .unwrap_or_else(|e| panic!("Failed to run the join {:?}: {:#}", criteria, e));
    let count = count_join::<LeftItem, RightItem>(left, right, criteria)
        .unwrap_or_else(|e| panic!("Failed to count the join {:?}: {:#}", criteria, e));
    assert_eq!(
        count,
        result.len() as u64,
        "The count must match the rows of {:?}",
        criteria
    );
    result
}

fn on_tag(criteria: JoinCriteria) -> JoinCriteria {
    criteria
        .on(JoinExpression::equal("tag", "tag"))
        .order_by_left("id", Order::Asc)
        .order_by_right("id", Order::Asc)
}

pub fn join_types(left: &dyn Backend, right: &dyn Backend) {
    setup_items(left, right);

    let inner = join(left, right, &on_tag(JoinCriteria::inner()));
    assert_eq!(
        tags(&inner),
        [
            (Some("one"), Some("one")),
            (Some("two"), Some("two")),
            (Some("three"), Some("three")),
        ]
    );
    assert_eq!(
        inner
            .iter()
            .filter_map(|v| v.left.as_ref())
            .map(|v| v.id)
            .collect::<Vec<_>>(),
        [1, 2, 3]
    );

    let left_outer = join(left, right, &on_tag(JoinCriteria::left_outer()));
    assert_eq!(
        tags(&left_outer),
        [
            (Some("one"), Some("one")),
            (Some("two"), Some("two")),
            (Some("three"), Some("three")),
            (Some("four"), None),
            (Some("five"), None),
        ]
    );

    let right_outer = join(left, right, &on_tag(JoinCriteria::right_outer()));
    assert_eq!(
        tags(&right_outer),
        [
            (None, Some("4")),
            (None, Some("5")),
            (Some("one"), Some("one")),
            (Some("two"), Some("two")),
            (Some("three"), Some("three")),
        ]
    );

    let outer = join(left, right, &on_tag(JoinCriteria::outer()));
    assert_eq!(
        tags(&outer),
        [
            (None, Some("4")),
            (None, Some("5")),
            (Some("one"), Some("one")),
            (Some("two"), Some("two")),
            (Some("three"), Some("three")),
            (Some("four"), None),
            (Some("five"), None),
        ]
    );

    // A flipped left outer join, run with the entities swapped, gives the same rows
    let criteria = on_tag(JoinCriteria::left_outer());
    let flipped = criteria.flip().expect("Left outer joins can be flipped");
    assert_eq!(flipped.flip().expect("Right outer joins can be flipped"), criteria);
    let swapped: Vec<_> = fetch_join::<RightItem, LeftItem>(right, left, &flipped)
        .expect("Failed to run the flipped join")
        .into_iter()
        .map(JoinResult::flip)
        .collect();
    assert_eq!(swapped, left_outer);

    for criteria in [on_tag(JoinCriteria::inner()), on_tag(JoinCriteria::outer())] {
        let error = criteria
            .flip()
            .expect_err("Only one sided outer joins can be flipped");
        assert!(matches!(
            error.downcast_ref::<DaoError>(),
            Some(DaoError::UnsupportedFlip(..))
        ));
    }

    let error = fetch_join::<LeftItem, RightItem>(left, right, &JoinCriteria::inner())
        .expect_err("A join without expressions must be rejected");
    assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
}

pub fn join_pagination(left: &dyn Backend, right: &dyn Backend) {
    setup_items(left, right);

    let inner = || on_tag(JoinCriteria::inner());
    assert_eq!(
        tags(&join(left, right, &inner().start(1))),
        [(Some("two"), Some("two")), (Some("three"), Some("three"))]
    );
    assert_eq!(
        tags(&join(left, right, &inner().limit(2))),
        [(Some("one"), Some("one")), (Some("two"), Some("two"))]
    );
    assert_eq!(
        tags(&join(left, right, &inner().start(1).limit(1))),
        [(Some("two"), Some("two"))]
    );
    assert!(join(left, right, &inner().start(3)).is_empty());

    let left_outer = || on_tag(JoinCriteria::left_outer());
    assert_eq!(
        tags(&join(left, right, &left_outer().start(2).limit(2))),
        [(Some("three"), Some("three")), (Some("four"), None)]
    );

    let descending = JoinCriteria::left_outer()
        .on(JoinExpression::equal("tag", "tag"))
        .order_by_left("id", Order::Desc)
        .limit(3);
    assert_eq!(
        tags(&join(left, right, &descending)),
        [
            (Some("five"), None),
            (Some("four"), None),
            (Some("three"), Some("three")),
        ]
    );
}

pub fn join_predicates(left: &dyn Backend, right: &dyn Backend) {
    setup_items(left, right);

    // Per side filters
    let filtered = on_tag(JoinCriteria::inner()).left(
        Criteria::new()
            .with(Expression::greater("id", 1))
            .order_by("id", Order::Desc)
            .limit(1),
    );
    assert_eq!(
        tags(&join(left, right, &filtered)),
        [(Some("two"), Some("two")), (Some("three"), Some("three"))]
    );
    let filtered =
        on_tag(JoinCriteria::left_outer()).right(Criteria::new().with(Expression::equal("tag", "two")));
    assert_eq!(
        tags(&join(left, right, &filtered)),
        [
            (Some("one"), None),
            (Some("two"), Some("two")),
            (Some("three"), None),
            (Some("four"), None),
            (Some("five"), None),
        ]
    );
    let filtered = on_tag(JoinCriteria::left_outer())
        .left(Criteria::new().with(Expression::lesser("id", 3)));
    assert_eq!(
        tags(&join(left, right, &filtered)),
        [(Some("one"), Some("one")), (Some("two"), Some("two"))]
    );
    let filtered = on_tag(JoinCriteria::outer())
        .left(Criteria::new().with(Expression::lesser("id", 3)))
        .right(Criteria::new().with(Expression::greater("id", 2)));
    assert_eq!(
        tags(&join(left, right, &filtered)),
        [
            (None, Some("three")),
            (None, Some("4")),
            (None, Some("5")),
            (Some("one"), None),
            (Some("two"), None),
        ]
    );

    // Inequality joins
    let greater = JoinCriteria::inner()
        .on(JoinExpression::greater("id", "id"))
        .order_by_left("id", Order::Asc)
        .order_by_right("id", Order::Asc);
    let pairs: Vec<_> = join(left, right, &greater)
        .into_iter()
        .filter_map(|v| Some((v.left?.id, v.right?.id)))
        .collect();
    assert_eq!(
        pairs,
        [
            (2, 1),
            (3, 1),
            (3, 2),
            (4, 1),
            (4, 2),
            (4, 3),
            (5, 1),
            (5, 2),
            (5, 3),
            (5, 4),
        ]
    );
    let mirrored = JoinCriteria::inner()
        .on(JoinExpression::greater("id", "id").flip())
        .order_by_left("id", Order::Asc)
        .order_by_right("id", Order::Asc);
    let mirrored: Vec<_> = fetch_join::<RightItem, LeftItem>(right, left, &mirrored)
        .expect("Failed to run the mirrored join")
        .into_iter()
        .filter_map(|v| Some((v.right?.id, v.left?.id)))
        .collect();
    let mut expected = pairs.clone();
    expected.sort_by_key(|(l, r)| (*r, *l));
    assert_eq!(mirrored, expected);

    // Composite predicates
    let both = JoinCriteria::inner()
        .on(JoinExpression::equal("tag", "tag"))
        .on(JoinExpression::lesser("id", "id").invert())
        .order_by_left("id", Order::Asc);
    assert_eq!(join(left, right, &both).len(), 3);
    let either = JoinCriteria::inner()
        .operator(trove::BooleanOperator::Or)
        .on(JoinExpression::equal("tag", "tag"))
        .on(JoinExpression::equal("id", "id"))
        .order_by_left("id", Order::Asc);
    assert_eq!(
        tags(&join(left, right, &either)),
        [
            (Some("one"), Some("one")),
            (Some("two"), Some("two")),
            (Some("three"), Some("three")),
            (Some("four"), Some("4")),
            (Some("five"), Some("5")),
        ]
    );
    let unequal = JoinCriteria::left_outer()
        .on(JoinExpression::equal("tag", "tag").invert())
        .on(JoinExpression::equal("id", "id"));
    assert_eq!(
        tags(&join(left, right, &unequal.order_by_left("id", Order::Asc))),
        [
            (Some("one"), None),
            (Some("two"), None),
            (Some("three"), None),
            (Some("four"), Some("4")),
            (Some("five"), Some("5")),
        ]
    );
}
