use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{
    filter::{FieldName, Filter},
    ordering::Ordering,
    paging::SkipPaging,
};

/// Everything a list query is parameterised by. A snapshot: changes produce a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryArguments<K: FieldName, O: FieldName> {
    /// The chain the query runs against.
    pub chain_id: u64,
    /// Filter predicates.
    pub filter: Filter<K>,
    /// Page window.
    pub pagination: SkipPaging,
    /// Sort order.
    pub order: Ordering<O>,
}

impl<K: FieldName, O: FieldName> QueryArguments<K, O> {
    /// A copy with a new filter. The page window goes back to the first page.
    pub fn with_filter(&self, filter: Filter<K>) -> Self {
        Self {
            filter,
            pagination: self.pagination.reset(),
            ..self.clone()
        }
    }

    /// A copy with a new page window.
    pub fn with_pagination(&self, pagination: SkipPaging) -> Self {
        Self {
            pagination,
            ..self.clone()
        }
    }

    /// A copy with a new ordering, keeping the page window.
    pub fn with_order(&self, order: Ordering<O>) -> Self {
        Self {
            order,
            ..self.clone()
        }
    }

    /// Whether `self` and `other` differ, but only in their filter.
    pub fn differs_only_in_filter(&self, other: &Self) -> bool {
        self.filter != other.filter
            && self.chain_id == other.chain_id
            && self.order == other.order
            && self.pagination.take == other.pagination.take
            // Filter changes always reset to the first page, a skip that went back to zero is part of the edit:
            && (self.pagination.skip == other.pagination.skip || self.pagination.skip == 0)
    }
}

impl<K: FieldName, O: FieldName> Serialize for QueryArguments<K, O> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("QueryArguments", 4)?;
        state.serialize_field("chainId", &self.chain_id)?;
        state.serialize_field("filter", &self.filter)?;
        state.serialize_field("pagination", &self.pagination)?;
        state.serialize_field("order", &self.order)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::TestKey;

    fn args() -> QueryArguments<TestKey, TestKey> {
        QueryArguments {
            chain_id: 137,
            filter: Filter::new().with_field(TestKey::A, "0xabc"),
            pagination: SkipPaging::new(10).with_page(3),
            order: Ordering::desc(TestKey::C),
        }
    }

    #[test]
    fn with_filter_resets_skip() {
        let next = args().with_filter(Filter::new());
        assert_eq!(next.pagination.skip, 0);
        assert_eq!(next.pagination.take, 10);
        assert_eq!(args().pagination.skip, 20);
    }

    #[test]
    fn with_order_keeps_paging() {
        let next = args().with_order(Ordering::asc(TestKey::B));
        assert_eq!(next.pagination, args().pagination);
    }

    #[test]
    fn filter_only_detection() {
        let base = args();
        let filter_edit = base.with_filter(base.filter.with_field(TestKey::B, "1"));
        assert!(filter_edit.differs_only_in_filter(&base));

        let order_edit = base.with_order(Ordering::asc(TestKey::C));
        assert!(!order_edit.differs_only_in_filter(&base));

        let both = filter_edit.with_order(Ordering::asc(TestKey::C));
        assert!(!both.differs_only_in_filter(&base));

        let page_edit = base.with_pagination(base.pagination.with_page(5));
        assert!(!page_edit.differs_only_in_filter(&base));

        assert!(!base.differs_only_in_filter(&base.clone()));
    }

    #[test]
    fn serializes_as_subgraph_arguments() {
        assert_eq!(
            serde_json::to_value(args()).unwrap(),
            serde_json::json!({
                "chainId": 137,
                "filter": { "a": "0xabc" },
                "pagination": { "skip": 20, "take": 10 },
                "order": { "orderBy": "c", "orderDirection": "desc" },
            })
        );
    }
}
