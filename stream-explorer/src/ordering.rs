use std::fmt;

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::filter::FieldName;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "asc"),
            OrderDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Which field a list is sorted by, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ordering<O: FieldName> {
    /// The field sorted on.
    pub order_by: O,
    /// The direction.
    pub order_direction: OrderDirection,
}

impl<O: FieldName> Ordering<O> {
    /// Sort by `order_by` in `order_direction`.
    pub fn new(order_by: O, order_direction: OrderDirection) -> Self {
        Self {
            order_by,
            order_direction,
        }
    }

    /// Sort by `order_by` descending.
    pub fn desc(order_by: O) -> Self {
        Self::new(order_by, OrderDirection::Desc)
    }

    /// Sort by `order_by` ascending.
    pub fn asc(order_by: O) -> Self {
        Self::new(order_by, OrderDirection::Asc)
    }

    /// The ordering after a click on the sort header of `field`.
    ///
    /// A different field starts descending, a descending field turns ascending, and an ascending field falls
    /// back to `default`.
    pub fn cycled(&self, field: O, default: Ordering<O>) -> Self {
        if self.order_by != field {
            Self::desc(field)
        } else if self.order_direction == OrderDirection::Desc {
            Self::asc(field)
        } else {
            default
        }
    }
}

impl<O: FieldName> Serialize for Ordering<O> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Ordering", 2)?;
        state.serialize_field("orderBy", self.order_by.name())?;
        state.serialize_field("orderDirection", &self.order_direction)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;
    use crate::filter::tests::TestKey;

    #[rstest]
    #[case(Ordering::desc(TestKey::A), TestKey::B, Ordering::desc(TestKey::B))]
    #[case(Ordering::asc(TestKey::A), TestKey::B, Ordering::desc(TestKey::B))]
    #[case(Ordering::desc(TestKey::B), TestKey::B, Ordering::asc(TestKey::B))]
    #[case(Ordering::asc(TestKey::B), TestKey::B, Ordering::desc(TestKey::A))]
    fn cycle(
        #[case] current: Ordering<TestKey>,
        #[case] clicked: TestKey,
        #[case] expected: Ordering<TestKey>,
    ) {
        let default = Ordering::desc(TestKey::A);
        assert_eq!(current.cycled(clicked, default), expected);
    }

    #[test]
    fn three_clicks_from_default_return_to_default() {
        let default = Ordering::desc(TestKey::A);
        let mut ordering = default;
        for _ in 0..3 {
            ordering = ordering.cycled(TestKey::B, default);
        }
        assert_eq!(ordering, default);
    }
}
