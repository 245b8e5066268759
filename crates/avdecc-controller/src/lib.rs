//! Per-entity AVDECC (IEEE 1722.1) controller core.
//!
//! This crate holds the in-memory record a controller maintains for
//! every entity it discovers, and nothing else: no sockets, no packet
//! framing, no discovery. The owning orchestrator drives the protocol
//! and calls into this core on every response.
//!
//! - **[`ControlledEntity`]** -- the per-entity model: ADP record,
//!   descriptor tree (static + dynamic halves), derived node graph,
//!   acquire/lock ownership, link status, Milan info, statistics.
//! - **[`SharedLock`]** -- counted, owner-thread-tracking re-entrant
//!   mutex shared by all entities of one controller. All reads and
//!   writes happen under it; `unlock_all`/`lock_all` bracket observer
//!   notification.
//! - **Enumeration tracking** ([`enumeration`]) -- the ordered step
//!   bitset, per-step expected-response sets, and the retry policy that
//!   decides when outstanding queries are re-issued and when an entity
//!   is abandoned.
//! - **[`EntityModelVisitor`]** -- deterministic traversal of the model
//!   for external consumers.
//! - **Serialization** ([`serialization`]) -- versioned, lossless JSON
//!   dumps for offline caching and diagnostics; loading yields a
//!   *virtual* entity.

pub mod entity;
pub mod enumeration;
pub mod error;
pub mod graph;
pub mod lock;
pub mod ownership;
pub mod serialization;
pub mod statistics;
pub mod visitor;

pub use entity::{CompatibilityFlags, ControlledEntity, InterfaceLinkStatus};
pub use enumeration::{
    DescriptorDynamicInfoType, DynamicInfoType, EnumerationStep, EnumerationSteps, MilanInfoType,
    RetryTimer, MAX_QUERY_RETRIES, QUERY_RETRY_DELAY,
};
pub use error::{DeserializationError, EntityError, SerializationError};
pub use graph::{
    AudioUnitNode, ClockDomainNode, ConfigurationNode, EntityNodeGraph, LocaleNode,
    RedundantStreamNode, StreamNode, StreamPortNode,
};
pub use lock::SharedLock;
pub use ownership::{AcquireState, LockState};
pub use serialization::{create_json_dump, load_from_json, DUMP_VERSION};
pub use statistics::Statistics;
pub use visitor::EntityModelVisitor;
