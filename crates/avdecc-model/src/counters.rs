// ── GET_COUNTERS stores ──
//
// Each descriptor kind that reports counters keeps a map from counter
// name to a monotonic value. Only counters the entity has actually
// reported are present.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityCounterName {
    EntitySpecific1,
    EntitySpecific2,
    EntitySpecific3,
    EntitySpecific4,
    EntitySpecific5,
    EntitySpecific6,
    EntitySpecific7,
    EntitySpecific8,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AvbInterfaceCounterName {
    LinkUp,
    LinkDown,
    FramesTx,
    FramesRx,
    RxCrcError,
    GptpGmChanged,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ClockDomainCounterName {
    Locked,
    Unlocked,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StreamInputCounterName {
    MediaLocked,
    MediaUnlocked,
    StreamInterrupted,
    SeqNumMismatch,
    MediaReset,
    TimestampUncertain,
    UnsupportedFormat,
    LateTimestamp,
    EarlyTimestamp,
    FramesRx,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StreamOutputCounterName {
    StreamStart,
    StreamStop,
    MediaReset,
    TimestampUncertain,
    FramesTx,
}

pub type EntityCounters = BTreeMap<EntityCounterName, u64>;
pub type AvbInterfaceCounters = BTreeMap<AvbInterfaceCounterName, u64>;
pub type ClockDomainCounters = BTreeMap<ClockDomainCounterName, u64>;
pub type StreamInputCounters = BTreeMap<StreamInputCounterName, u64>;
pub type StreamOutputCounters = BTreeMap<StreamOutputCounterName, u64>;
