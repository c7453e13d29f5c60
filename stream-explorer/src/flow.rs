//! Balances that change every second.

use chrono::{DateTime, TimeZone, Utc};
use chrono_humanize::HumanTime;

use crate::entities::Stream;

/// A balance known at one instant, changing by `flow_rate` every second after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowingBalance {
    /// The balance at `balance_timestamp`.
    pub balance: i128,
    /// Unix seconds.
    pub balance_timestamp: i64,
    /// Change per second.
    pub flow_rate: i128,
}

impl FlowingBalance {
    /// The balance at `now`. Before `balance_timestamp` the balance is as recorded.
    pub fn at(&self, now: DateTime<Utc>) -> i128 {
        let elapsed = now.timestamp().saturating_sub(self.balance_timestamp).max(0);
        self.balance
            .saturating_add(self.flow_rate.saturating_mul(i128::from(elapsed)))
    }
}

/// A span of time to express a flow rate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowRateUnit {
    /// One second.
    Second,
    /// One minute.
    Minute,
    /// One hour.
    Hour,
    /// One day.
    Day,
    /// Seven days.
    Week,
    /// Thirty days.
    Month,
    /// 365 days.
    Year,
}

impl FlowRateUnit {
    /// The length in seconds.
    pub fn seconds(&self) -> i128 {
        const DAY: i128 = 24 * 60 * 60;
        match self {
            FlowRateUnit::Second => 1,
            FlowRateUnit::Minute => 60,
            FlowRateUnit::Hour => 60 * 60,
            FlowRateUnit::Day => DAY,
            FlowRateUnit::Week => 7 * DAY,
            FlowRateUnit::Month => 30 * DAY,
            FlowRateUnit::Year => 365 * DAY,
        }
    }

    /// A per-second `flow_rate` expressed per this unit.
    pub fn scale(&self, flow_rate: i128) -> i128 {
        flow_rate.saturating_mul(self.seconds())
    }
}

impl Stream {
    /// The total streamed so far as a balance that keeps flowing.
    pub fn flowing_balance(&self) -> FlowingBalance {
        FlowingBalance {
            balance: self.streamed_until_updated_at,
            balance_timestamp: self.updated_at_timestamp,
            flow_rate: self.current_flow_rate,
        }
    }

    /// Total streamed as of `now`.
    pub fn streamed_at(&self, now: DateTime<Utc>) -> i128 {
        self.flowing_balance().at(now)
    }

    /// When the stream was first opened.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at_timestamp, 0).single()
    }

    /// When the flow rate last changed.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.updated_at_timestamp, 0).single()
    }
}

/// `timestamp` (unix seconds) relative to `now`, e.g. "5 minutes ago". Empty for an unrepresentable timestamp.
pub fn time_ago(timestamp: i64, now: DateTime<Utc>) -> String {
    match Utc.timestamp_opt(timestamp, 0).single() {
        Some(at) => HumanTime::from(at - now).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;
    use crate::entities::tests::{ALICE, BOB, stream};

    fn at(timestamp: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(timestamp, 0).unwrap()
    }

    #[test]
    fn balance_flows_from_last_update() {
        let stream = stream(ALICE, BOB, 3, 500);
        assert_eq!(stream.streamed_at(at(500)), 1_000);
        assert_eq!(stream.streamed_at(at(510)), 1_030);
        // Clock behind the subgraph:
        assert_eq!(stream.streamed_at(at(400)), 1_000);
    }

    #[test]
    fn closed_stream_stays_put() {
        let stream = stream(ALICE, BOB, 0, 500);
        assert_eq!(stream.streamed_at(at(10_000)), 1_000);
    }

    #[rstest]
    #[case(FlowRateUnit::Second, 2)]
    #[case(FlowRateUnit::Hour, 7_200)]
    #[case(FlowRateUnit::Month, 5_184_000)]
    fn scale(#[case] unit: FlowRateUnit, #[case] expected: i128) {
        assert_eq!(unit.scale(2), expected);
    }

    #[test]
    fn relative_time() {
        assert_eq!(time_ago(0, at(5 * 60)), "5 minutes ago");
        assert_eq!(time_ago(i64::MAX, at(0)), "");
        assert_eq!(stream(ALICE, BOB, 1, 500).created_at(), Some(at(100)));
    }
}
