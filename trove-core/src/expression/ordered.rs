use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Asc,
    Desc,
    /// The property is a backend expression written verbatim, direction included.
    Computed,
}

impl Order {
    /// Apply the direction to an ascending comparison.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Order::Desc => ordering.reverse(),
            _ => ordering,
        }
    }
}

/// Sort key of a single entity query.
#[derive(Debug, Clone, PartialEq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Order,
}

impl SortOrder {
    pub fn new(property: impl Into<String>, direction: Order) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }
}

/// Sort key of a join, `is_for_left` tells which entity owns the property.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSortOrder {
    pub property: String,
    pub direction: Order,
    pub is_for_left: bool,
}

impl JoinSortOrder {
    pub fn flip(&self) -> Self {
        Self {
            property: self.property.clone(),
            direction: self.direction,
            is_for_left: !self.is_for_left,
        }
    }
}
