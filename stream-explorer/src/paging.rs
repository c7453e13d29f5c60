use serde::{Deserialize, Serialize};

/// Offset pagination: skip `skip` items, then take `take`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkipPaging {
    /// Items to skip.
    pub skip: u32,
    /// Page size, at least 1.
    pub take: u32,
}

impl Default for SkipPaging {
    fn default() -> Self {
        Self::new(crate::options::DEFAULT_PAGE_SIZE)
    }
}

impl SkipPaging {
    /// First page of size `take`, which is clamped to at least 1.
    pub fn new(take: u32) -> Self {
        Self {
            skip: 0,
            take: take.max(1),
        }
    }

    /// The 1-indexed page `page`, page 0 is treated as page 1.
    pub fn with_page(self, page: u32) -> Self {
        Self {
            skip: page.saturating_sub(1).saturating_mul(self.take),
            ..self
        }
    }

    /// Same offset, different page size. Does not realign `skip`.
    pub fn with_take(self, take: u32) -> Self {
        Self {
            take: take.max(1),
            ..self
        }
    }

    /// Back to the first page.
    pub fn reset(self) -> Self {
        Self { skip: 0, ..self }
    }

    /// The page after this one.
    pub fn next(self) -> Self {
        Self {
            skip: self.skip.saturating_add(self.take),
            ..self
        }
    }

    /// The 1-indexed page number, `skip / take + 1`.
    pub fn page(&self) -> u32 {
        self.skip / self.take.max(1) + 1
    }
}

/// One page of a list, as returned by the subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// The items on this page.
    pub data: Vec<T>,
    /// The paging this page was fetched with.
    pub paging: SkipPaging,
    /// The paging of the next page, `None` when this is the last.
    pub next_paging: Option<SkipPaging>,
}

impl<T> PagedResult<T> {
    /// Build a page out of `take + 1` fetched items: the extra item only signals that a next page exists.
    pub fn from_lookahead(mut items: Vec<T>, paging: SkipPaging) -> Self {
        let has_next = items.len() > paging.take as usize;
        items.truncate(paging.take as usize);
        Self {
            data: items,
            paging,
            next_paging: has_next.then(|| paging.next()),
        }
    }

    /// Whether a next page exists.
    pub fn has_next_page(&self) -> bool {
        self.next_paging.is_some()
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(1, 10, 0)]
    #[case(2, 10, 10)]
    #[case(5, 25, 100)]
    #[case(0, 10, 0)]
    fn page_to_skip(#[case] page: u32, #[case] take: u32, #[case] skip: u32) {
        let paging = SkipPaging::new(take).with_page(page);
        assert_eq!(paging.skip, skip);
        assert_eq!(paging.page(), page.max(1));
    }

    #[test]
    fn take_change_keeps_skip() {
        let paging = SkipPaging::new(10).with_page(3).with_take(25);
        assert_eq!(paging, SkipPaging { skip: 20, take: 25 });
        // Not aligned to the new size, rounds down:
        assert_eq!(paging.page(), 1);
        assert_eq!(SkipPaging::new(10).with_take(0).take, 1);
    }

    #[test]
    fn lookahead() {
        let paging = SkipPaging::new(2);
        let page = PagedResult::from_lookahead(vec![1, 2, 3], paging);
        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(page.next_paging, Some(SkipPaging { skip: 2, take: 2 }));

        let last = PagedResult::from_lookahead(vec![1, 2], paging);
        assert!(!last.has_next_page());
    }
}
