#![allow(clippy::type_complexity)]
#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod controller;
mod debounce;
mod entities;
mod error;
mod explorer;
mod filter;
mod flow;
mod list_view;
mod network;
mod options;
mod ordering;
mod paging;
mod query;
mod query_args;
mod query_scope;
mod stream_page;
mod stream_periods;
mod streams;
mod subgraph;
mod subscriptions;
mod timer;
mod utils;

pub use controller::*;
pub use entities::{
    Entity, Stream, StreamFilterKey, StreamOrderBy, StreamPeriod, StreamPeriodFilterKey,
    StreamPeriodOrderBy, normalize_address,
};
pub use error::*;
pub use explorer::*;
pub use filter::{FieldName, Filter};
pub use flow::*;
pub use list_view::*;
pub use network::*;
pub use options::{ExplorerOptions, QueryOptions};
pub use ordering::*;
pub use paging::*;
pub use query::*;
pub use query_args::*;
pub use query_scope::*;
pub use stream_page::*;
pub use stream_periods::*;
pub use streams::*;
pub use subgraph::*;
pub use subscriptions::Subscription;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use any_spawner::Executor;

    use super::*;
    use crate::entities::tests::{ALICE, BOB, CAROL, TOKEN, stream};

    fn period(stream_id: &str, n: i64, stopped: bool) -> StreamPeriod {
        StreamPeriod {
            id: format!("{stream_id}-period-{n}"),
            stream: stream_id.to_string(),
            flow_rate: 10,
            started_at_timestamp: n * 100,
            stopped_at_timestamp: stopped.then_some(n * 100 + 50),
            total_amount_streamed: stopped.then_some(500),
        }
    }

    fn explorer() -> (Explorer, MemorySubgraph) {
        _ = Executor::init_tokio();
        let subgraph = MemorySubgraph::new();
        for (i, sender) in [ALICE, CAROL].into_iter().enumerate() {
            subgraph.insert_stream(137, stream(sender, BOB, i as i128, 100 + i as i64));
        }
        subgraph.insert_stream(137, stream(BOB, ALICE, 7, 50));
        let stream_id = stream(ALICE, BOB, 0, 0).id;
        for n in 0..3 {
            subgraph.insert_stream_period(137, period(&stream_id, n, n < 2));
        }
        (
            Explorer::new(subgraph.clone()).with_options(ExplorerOptions::new().with_page_size(1)),
            subgraph,
        )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn incoming_streams_table() {
        let (explorer, _) = explorer();
        let scope = explorer.account_scope(Some("matic"), BOB).unwrap();
        let table = explorer.incoming_streams(scope);
        assert!(table.view().is_loading);

        settle().await;
        let view = table.view();
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].sender, CAROL);
        assert!(view.has_next_page && view.show_pagination);

        table.set_page(2);
        settle().await;
        let view = table.view();
        assert_eq!((view.page, view.rows[0].sender.as_str()), (2, ALICE));
        assert!(!view.has_next_page);

        table.set_filter_text(StreamFilterKey::SenderContains, "A11C");
        assert_eq!(table.page(), 1);
        tokio::time::sleep(Duration::from_millis(300)).await;
        settle().await;
        assert_eq!(table.view().rows[0].sender, ALICE);

        table.set_status_filter(Some(StreamStatus::Active));
        tokio::time::sleep(Duration::from_millis(300)).await;
        settle().await;
        let view = table.view();
        assert!(view.show_empty && view.rows.is_empty() && view.can_reset_filter);

        table.reset_filter();
        settle().await;
        assert_eq!(table.view().rows.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn outgoing_streams_share_the_cache() {
        let (explorer, _) = explorer();
        let scope = explorer.account_scope(Some("137"), BOB).unwrap();
        let outgoing = explorer.outgoing_streams(scope.clone());
        settle().await;
        assert_eq!(outgoing.view().rows[0].receiver, ALICE);

        // Same arguments, served from the shared cache without loading:
        let again = explorer.outgoing_streams(scope);
        assert!(again.result().is_success);
        assert!(!again.view().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_page_loads_stream_and_periods() {
        let (explorer, _) = explorer();
        let id = format!("{ALICE}-{BOB}-{TOKEN}-0");
        let page = explorer.stream_page(Some("matic"), Some(&id)).unwrap();
        assert_eq!(page.state(), StreamPageState::Loading);
        assert_eq!(page.stream(), Ok(None));

        settle().await;
        match page.state() {
            StreamPageState::Loaded(stream) => assert_eq!(stream.sender, ALICE),
            other => panic!("unexpected {other:?}"),
        }

        let periods = page.periods();
        assert_eq!(periods.view().rows[0].started_at_timestamp, 200);
        assert!(periods.view().has_next_page);
        periods.cycle_sort_field(StreamPeriodOrderBy::StartedAtTimestamp);
        settle().await;
        assert_eq!(periods.view().rows[0].started_at_timestamp, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_page_not_found() {
        let (explorer, _) = explorer();
        assert!(explorer.stream_page(Some("nope"), Some("x")).unwrap_err().is_not_found());
        assert!(explorer.stream_page(Some("matic"), None).unwrap_err().is_not_found());

        let missing = format!("{CAROL}-{ALICE}-{TOKEN}-0");
        let page = explorer.stream_page(Some("matic"), Some(&missing)).unwrap();
        settle().await;
        assert_eq!(page.state(), StreamPageState::NotFound);
        assert_eq!(
            page.stream(),
            Err(ExplorerError::not_found(EntityKind::Stream, missing))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_picks_up_new_data() {
        let (explorer, subgraph) = explorer();
        let scope = explorer.account_scope(Some("matic"), ALICE).unwrap();
        let table = explorer.incoming_streams(scope);
        settle().await;
        assert_eq!(table.view().rows.len(), 1);

        subgraph.insert_stream(137, stream(CAROL, ALICE, 3, 400));
        table.refresh();
        settle().await;
        assert_eq!(table.view().rows[0].sender, CAROL);
    }
}
