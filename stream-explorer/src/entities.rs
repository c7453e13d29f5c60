//! Subgraph entities and the fields they can be filtered and sorted by.

use std::cmp::Ordering as CmpOrdering;

use serde::{Deserialize, Serialize};

use crate::{EntityKind, ExplorerError, filter::FieldName};

/// Lower-case `address` if it is a `0x`-prefixed 20 byte hex address.
pub fn normalize_address(address: &str) -> Result<String, ExplorerError> {
    let address = address.trim();
    let is_valid = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()));
    if is_valid {
        Ok(address.to_ascii_lowercase())
    } else {
        Err(ExplorerError::not_found(EntityKind::Account, address))
    }
}

/// Something the subgraph stores and lists.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The keys lists of this entity can be filtered by.
    type FilterKey: FieldName;
    /// The fields lists of this entity can be sorted by.
    type OrderBy: FieldName;

    /// The subgraph id.
    fn id(&self) -> &str;

    /// Whether this entity satisfies the predicate `key` = `value`.
    fn matches(&self, key: Self::FilterKey, value: &str) -> bool;

    /// Compare on `order_by`, ascending.
    fn cmp_by(&self, other: &Self, order_by: Self::OrderBy) -> CmpOrdering;
}

fn eq_address(address: &str, value: &str) -> bool {
    address.eq_ignore_ascii_case(value)
}

fn compare_amount(amount: i128, value: &str, cmp: impl Fn(i128, i128) -> bool) -> bool {
    value.parse::<i128>().is_ok_and(|value| cmp(amount, value))
}

/// A continuous token transfer from `sender` to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    /// `{sender}-{receiver}-{token}-{revisionIndex}`.
    pub id: String,
    /// The super token streamed.
    pub token: String,
    /// Sending account.
    pub sender: String,
    /// Receiving account.
    pub receiver: String,
    /// Wei per second, 0 once the stream was closed.
    pub current_flow_rate: i128,
    /// Total streamed as of `updated_at_timestamp`.
    pub streamed_until_updated_at: i128,
    /// Unix seconds.
    pub created_at_timestamp: i64,
    /// Unix seconds of the last flow rate change.
    pub updated_at_timestamp: i64,
}

impl Stream {
    /// Whether the stream currently flows.
    pub fn is_active(&self) -> bool {
        self.current_flow_rate > 0
    }
}

/// Filter keys for [`Stream`] lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamFilterKey {
    /// `receiver`
    Receiver,
    /// `receiver_contains`
    ReceiverContains,
    /// `sender`
    Sender,
    /// `sender_contains`
    SenderContains,
    /// `token`
    Token,
    /// `currentFlowRate`
    CurrentFlowRate,
    /// `currentFlowRate_gt`
    CurrentFlowRateGt,
}

impl FieldName for StreamFilterKey {
    fn name(&self) -> &'static str {
        match self {
            StreamFilterKey::Receiver => "receiver",
            StreamFilterKey::ReceiverContains => "receiver_contains",
            StreamFilterKey::Sender => "sender",
            StreamFilterKey::SenderContains => "sender_contains",
            StreamFilterKey::Token => "token",
            StreamFilterKey::CurrentFlowRate => "currentFlowRate",
            StreamFilterKey::CurrentFlowRateGt => "currentFlowRate_gt",
        }
    }
}

/// Sortable [`Stream`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamOrderBy {
    /// `id`
    Id,
    /// `createdAtTimestamp`
    CreatedAtTimestamp,
    /// `updatedAtTimestamp`
    UpdatedAtTimestamp,
    /// `currentFlowRate`
    CurrentFlowRate,
    /// `streamedUntilUpdatedAt`
    StreamedUntilUpdatedAt,
}

impl FieldName for StreamOrderBy {
    fn name(&self) -> &'static str {
        match self {
            StreamOrderBy::Id => "id",
            StreamOrderBy::CreatedAtTimestamp => "createdAtTimestamp",
            StreamOrderBy::UpdatedAtTimestamp => "updatedAtTimestamp",
            StreamOrderBy::CurrentFlowRate => "currentFlowRate",
            StreamOrderBy::StreamedUntilUpdatedAt => "streamedUntilUpdatedAt",
        }
    }
}

impl Entity for Stream {
    type FilterKey = StreamFilterKey;
    type OrderBy = StreamOrderBy;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, key: StreamFilterKey, value: &str) -> bool {
        match key {
            StreamFilterKey::Receiver => eq_address(&self.receiver, value),
            StreamFilterKey::ReceiverContains => self.receiver.to_ascii_lowercase().contains(value),
            StreamFilterKey::Sender => eq_address(&self.sender, value),
            StreamFilterKey::SenderContains => self.sender.to_ascii_lowercase().contains(value),
            StreamFilterKey::Token => eq_address(&self.token, value),
            StreamFilterKey::CurrentFlowRate => {
                compare_amount(self.current_flow_rate, value, |a, b| a == b)
            }
            StreamFilterKey::CurrentFlowRateGt => {
                compare_amount(self.current_flow_rate, value, |a, b| a > b)
            }
        }
    }

    fn cmp_by(&self, other: &Self, order_by: StreamOrderBy) -> CmpOrdering {
        match order_by {
            StreamOrderBy::Id => self.id.cmp(&other.id),
            StreamOrderBy::CreatedAtTimestamp => self.created_at_timestamp.cmp(&other.created_at_timestamp),
            StreamOrderBy::UpdatedAtTimestamp => self.updated_at_timestamp.cmp(&other.updated_at_timestamp),
            StreamOrderBy::CurrentFlowRate => self.current_flow_rate.cmp(&other.current_flow_rate),
            StreamOrderBy::StreamedUntilUpdatedAt => {
                self.streamed_until_updated_at.cmp(&other.streamed_until_updated_at)
            }
        }
    }
}

/// A stretch of time during which a stream's flow rate was constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamPeriod {
    /// Subgraph id.
    pub id: String,
    /// Id of the [`Stream`] this period belongs to.
    pub stream: String,
    /// Wei per second during the period.
    pub flow_rate: i128,
    /// Unix seconds.
    pub started_at_timestamp: i64,
    /// Unix seconds, `None` while the period is ongoing.
    pub stopped_at_timestamp: Option<i64>,
    /// Total streamed during the period, `None` while ongoing.
    pub total_amount_streamed: Option<i128>,
}

/// Filter keys for [`StreamPeriod`] lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamPeriodFilterKey {
    /// `stream`
    Stream,
}

impl FieldName for StreamPeriodFilterKey {
    fn name(&self) -> &'static str {
        match self {
            StreamPeriodFilterKey::Stream => "stream",
        }
    }
}

/// Sortable [`StreamPeriod`] fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamPeriodOrderBy {
    /// `startedAtTimestamp`
    StartedAtTimestamp,
    /// `stoppedAtTimestamp`
    StoppedAtTimestamp,
    /// `flowRate`
    FlowRate,
    /// `totalAmountStreamed`
    TotalAmountStreamed,
}

impl FieldName for StreamPeriodOrderBy {
    fn name(&self) -> &'static str {
        match self {
            StreamPeriodOrderBy::StartedAtTimestamp => "startedAtTimestamp",
            StreamPeriodOrderBy::StoppedAtTimestamp => "stoppedAtTimestamp",
            StreamPeriodOrderBy::FlowRate => "flowRate",
            StreamPeriodOrderBy::TotalAmountStreamed => "totalAmountStreamed",
        }
    }
}

impl Entity for StreamPeriod {
    type FilterKey = StreamPeriodFilterKey;
    type OrderBy = StreamPeriodOrderBy;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, key: StreamPeriodFilterKey, value: &str) -> bool {
        match key {
            StreamPeriodFilterKey::Stream => self.stream.eq_ignore_ascii_case(value),
        }
    }

    fn cmp_by(&self, other: &Self, order_by: StreamPeriodOrderBy) -> CmpOrdering {
        match order_by {
            StreamPeriodOrderBy::StartedAtTimestamp => self.started_at_timestamp.cmp(&other.started_at_timestamp),
            // Ongoing periods sort as if stopped in the future:
            StreamPeriodOrderBy::StoppedAtTimestamp => self
                .stopped_at_timestamp
                .unwrap_or(i64::MAX)
                .cmp(&other.stopped_at_timestamp.unwrap_or(i64::MAX)),
            StreamPeriodOrderBy::FlowRate => self.flow_rate.cmp(&other.flow_rate),
            StreamPeriodOrderBy::TotalAmountStreamed => {
                self.total_amount_streamed.cmp(&other.total_amount_streamed)
            }
        }
    }
}
