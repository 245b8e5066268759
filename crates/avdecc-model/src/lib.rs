//! AVDECC (IEEE 1722.1) entity-model vocabulary.
//!
//! This crate holds the data types an AVDECC controller keeps about the
//! entities it discovers:
//!
//! - **Identifiers and value types** ([`types`]) -- 64-bit EUIs, descriptor
//!   indexes, capability bit-sets, fixed strings, localized-string
//!   references, stream formats, audio mappings.
//! - **Wire descriptors** ([`descriptor`]) -- decoded READ_DESCRIPTOR
//!   payloads, the inputs to the model.
//! - **The descriptor tree** ([`tree`]) -- per-configuration maps of
//!   static/dynamic model pairs, with completeness checks against the
//!   configuration's promised descriptor counts.
//! - **Counter stores** ([`counters`]) -- GET_COUNTERS results per kind.
//!
//! Everything is plain serde-serializable data; all protocol I/O and all
//! state tracking live in `avdecc-controller`.

pub mod counters;
pub mod descriptor;
pub mod tree;
pub mod types;

pub use counters::{
    AvbInterfaceCounterName, AvbInterfaceCounters, ClockDomainCounterName, ClockDomainCounters,
    EntityCounterName, EntityCounters, StreamInputCounterName, StreamInputCounters,
    StreamOutputCounterName, StreamOutputCounters,
};
pub use descriptor::{
    AudioClusterDescriptor, AudioMapDescriptor, AudioUnitDescriptor, AvbInterfaceDescriptor,
    ClockDomainDescriptor, ClockSourceDescriptor, ConfigurationDescriptor, ControlDescriptor,
    EntityDescriptor, LocaleDescriptor, MemoryObjectDescriptor, StreamDescriptor,
    StreamPortDescriptor, StringsDescriptor,
};
pub use tree::{ConfigurationTree, EntityTree, Models};
pub use types::{
    AsPath, AudioClusterFormat, AudioMapping, AudioMappings, AvbInterfaceFlags, AvdeccString,
    AvbInterfaceInfo, ClockSourceType, ControlType, ControlValueType, ControlValues, Entity,
    EntityCapabilities, LinearValueStatic, ListenerCapabilities, LocalizedStringReference,
    MacAddress, MemoryObjectType, MilanInfo, SamplingRate, StreamFlags, StreamFormat,
    StreamIdentification, StreamInputConnectionInfo, StreamInputConnectionState, StreamPortFlags,
    TalkerCapabilities, UniqueIdentifier,
};
pub use types::{
    AudioUnitIndex, AvbInterfaceIndex, ClockDomainIndex, ClockSourceIndex, ClusterIndex,
    ConfigurationIndex, ControlIndex, ControllerCapabilities, DescriptorIndex, DescriptorType,
    LocaleIndex, MapIndex, MemoryObjectIndex, StreamIndex, StreamPortIndex, StringsIndex,
    VirtualIndex,
};
