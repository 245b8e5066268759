// ── Core protocol identifiers and value types ──

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Identifiers ─────────────────────────────────────────────────────

/// 64-bit EUI identifying an entity, an entity model, or a grandmaster
/// clock on the network.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UniqueIdentifier(u64);

impl UniqueIdentifier {
    pub const NULL: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Zero and all-ones are reserved by the protocol and never identify
    /// a live entity.
    pub const fn is_valid(self) -> bool {
        self.0 != 0 && self.0 != u64::MAX
    }
}

impl fmt::Display for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl From<u64> for UniqueIdentifier {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// EUI-48 MAC address of an AVB interface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MacAddress(pub [u8; 6]);

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

// Descriptor indexes are plain u16 values scoped to a (configuration,
// descriptor type) mapping. The aliases keep signatures readable.
pub type ConfigurationIndex = u16;
pub type DescriptorIndex = u16;
pub type AudioUnitIndex = u16;
pub type StreamIndex = u16;
pub type AvbInterfaceIndex = u16;
pub type ClockSourceIndex = u16;
pub type MemoryObjectIndex = u16;
pub type LocaleIndex = u16;
pub type StringsIndex = u16;
pub type StreamPortIndex = u16;
pub type ClusterIndex = u16;
pub type MapIndex = u16;
pub type ControlIndex = u16;
pub type ClockDomainIndex = u16;

/// Index of a synthesized (virtual) node, e.g. a redundant stream pair.
pub type VirtualIndex = u16;

/// Descriptor kinds modeled by this controller, with their wire values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum DescriptorType {
    Entity = 0x0000,
    Configuration = 0x0001,
    AudioUnit = 0x0002,
    StreamInput = 0x0005,
    StreamOutput = 0x0006,
    AvbInterface = 0x0009,
    ClockSource = 0x000a,
    MemoryObject = 0x000b,
    Locale = 0x000c,
    Strings = 0x000d,
    StreamPortInput = 0x000e,
    StreamPortOutput = 0x000f,
    AudioCluster = 0x0014,
    AudioMap = 0x0017,
    Control = 0x001a,
    ClockDomain = 0x0024,
}

impl Default for DescriptorType {
    fn default() -> Self {
        Self::Entity
    }
}

// ── Capability bit-sets ─────────────────────────────────────────────

macro_rules! capability_set {
    ($(#[$meta:meta])* $name:ident($repr:ty) { $($(#[$fmeta:meta])* $flag:ident = $bit:expr;)* }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            $($(#[$fmeta])* pub const $flag: Self = Self(1 << $bit);)*

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn from_bits(bits: $repr) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> $repr {
                self.0
            }

            /// True iff every bit of `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

capability_set! {
    /// ADP `entity_capabilities` bits.
    EntityCapabilities(u32) {
        EFU_MODE = 0;
        ADDRESS_ACCESS_SUPPORTED = 1;
        GATEWAY_ENTITY = 2;
        AEM_SUPPORTED = 3;
        LEGACY_AVC = 4;
        ASSOCIATION_ID_SUPPORTED = 5;
        VENDOR_UNIQUE_SUPPORTED = 7;
        CLASS_A_SUPPORTED = 8;
        CLASS_B_SUPPORTED = 9;
        GPTP_SUPPORTED = 10;
        AEM_IDENTIFY_CONTROL_INDEX_VALID = 15;
    }
}

capability_set! {
    TalkerCapabilities(u16) {
        IMPLEMENTED = 0;
        MEDIA_CLOCK_SOURCE = 9;
        AUDIO_SOURCE = 14;
        VIDEO_SOURCE = 15;
    }
}

capability_set! {
    ListenerCapabilities(u16) {
        IMPLEMENTED = 0;
        MEDIA_CLOCK_SINK = 9;
        AUDIO_SINK = 14;
        VIDEO_SINK = 15;
    }
}

capability_set! {
    ControllerCapabilities(u16) {
        IMPLEMENTED = 0;
    }
}

capability_set! {
    StreamFlags(u16) {
        CLOCK_SYNC_SOURCE = 0;
        CLASS_A = 1;
        CLASS_B = 2;
        SUPPORTS_ENCRYPTED = 3;
        SECONDARY_BACKUP_VALID = 6;
    }
}

capability_set! {
    AvbInterfaceFlags(u16) {
        GPTP_GRANDMASTER_SUPPORTED = 0;
        GPTP_SUPPORTED = 1;
        SRP_SUPPORTED = 2;
    }
}

capability_set! {
    StreamPortFlags(u16) {
        CLOCK_SYNC_SOURCE = 0;
        ASYNC_SAMPLE_RATE_CONV = 1;
        SYNC_SAMPLE_RATE_CONV = 2;
    }
}

// ── Fixed strings and localized references ──────────────────────────

/// Fixed-capacity (64 byte) protocol string. Longer values are clamped
/// at construction, on a character boundary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvdeccString(String);

impl AvdeccString {
    pub const MAX_LEN: usize = 64;

    pub fn new(value: &str) -> Self {
        let mut end = value.len().min(Self::MAX_LEN);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        Self(value[..end].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AvdeccString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AvdeccString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Reference into the localized-strings store: a 16-bit value split into
/// a 13-bit entry offset and a 3-bit strings-descriptor index relative to
/// the selected locale's base. The all-ones value means "no string".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LocalizedStringReference(u16);

impl LocalizedStringReference {
    pub const NONE: Self = Self(u16::MAX);

    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn from_parts(offset: u16, strings_index: u16) -> Self {
        Self((offset << 3) | (strings_index & 0x0007))
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// Entry offset within the referenced strings descriptor.
    pub const fn offset(self) -> u16 {
        self.0 >> 3
    }

    /// Strings-descriptor index relative to the selected locale's base.
    pub const fn strings_index(self) -> u16 {
        self.0 & 0x0007
    }

    pub const fn is_valid(self) -> bool {
        self.0 != u16::MAX
    }
}

impl Default for LocalizedStringReference {
    fn default() -> Self {
        Self::NONE
    }
}

// ── Stream and clock value types ────────────────────────────────────

/// Sampling rate in pull/base-frequency encoding; stored opaque.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SamplingRate(u32);

impl SamplingRate {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

/// 64-bit stream format word; stored opaque.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StreamFormat(u64);

impl StreamFormat {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockSourceType {
    Internal,
    External,
    InputStream,
    Expansion,
}

impl Default for ClockSourceType {
    fn default() -> Self {
        Self::Internal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryObjectType {
    FirmwareImage,
    VendorSpecific,
    CrashDump,
    LogObject,
    AutostartSettings,
    SnapshotSettings,
}

impl Default for MemoryObjectType {
    fn default() -> Self {
        Self::VendorSpecific
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioClusterFormat {
    Iec60958,
    Mbla,
    Midi,
    Smpte,
}

impl Default for AudioClusterFormat {
    fn default() -> Self {
        Self::Mbla
    }
}

// ── Controls ────────────────────────────────────────────────────────

/// EUI-64 identifying a control's semantic (IEEE administered values).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ControlType(u64);

impl ControlType {
    pub const IDENTIFY: Self = Self(0x90e0_f000_0000_0001);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlValueType {
    LinearUint8,
    LinearUint16,
    LinearUint32,
    Utf8,
}

impl Default for ControlValueType {
    fn default() -> Self {
        Self::LinearUint8
    }
}

/// Static bounds of one linear control value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinearValueStatic {
    pub minimum: u32,
    pub maximum: u32,
    pub step: u32,
    pub default_value: u32,
    pub unit: u16,
}

/// Current values of a control, one entry per declared value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlValues {
    pub values: Vec<u32>,
}

impl ControlValues {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }
}

// ── Connections and mappings ────────────────────────────────────────

/// One end of a stream connection: a talker or listener stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct StreamIdentification {
    pub entity_id: UniqueIdentifier,
    pub stream_index: StreamIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamInputConnectionState {
    NotConnected,
    FastConnecting,
    Connected,
}

impl Default for StreamInputConnectionState {
    fn default() -> Self {
        Self::NotConnected
    }
}

/// Connection state of a listener (input) stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamInputConnectionInfo {
    pub talker_stream: StreamIdentification,
    pub state: StreamInputConnectionState,
}

/// One channel mapping between a stream and an audio cluster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct AudioMapping {
    pub stream_index: StreamIndex,
    pub stream_channel: u16,
    pub cluster_offset: ClusterIndex,
    pub cluster_channel: u16,
}

pub type AudioMappings = Vec<AudioMapping>;

// ── Interface runtime info ──────────────────────────────────────────

/// GET_AVB_INFO payload for one AVB interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvbInterfaceInfo {
    pub propagation_delay: u32,
    pub flags: u32,
}

/// GET_AS_PATH payload: the gPTP path trace for one interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AsPath {
    pub sequence: Vec<UniqueIdentifier>,
}

// ── Milan ───────────────────────────────────────────────────────────

/// GET_MILAN_INFO payload (Milan vendor-unique).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MilanInfo {
    pub protocol_version: u32,
    pub features_flags: u32,
    pub certification_version: u32,
}

// ── The ADP record ──────────────────────────────────────────────────

/// The discovery (ADP) advertisement record for an entity, as last seen
/// on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: UniqueIdentifier,
    pub entity_model_id: UniqueIdentifier,
    pub entity_capabilities: EntityCapabilities,
    pub talker_stream_sources: u16,
    pub talker_capabilities: TalkerCapabilities,
    pub listener_stream_sinks: u16,
    pub listener_capabilities: ListenerCapabilities,
    pub controller_capabilities: ControllerCapabilities,
    pub available_index: u32,
    pub identify_control_index: Option<ControlIndex>,
}

impl Entity {
    pub fn aem_supported(&self) -> bool {
        self.entity_capabilities
            .contains(EntityCapabilities::AEM_SUPPORTED)
    }

    pub fn vendor_unique_supported(&self) -> bool {
        self.entity_capabilities
            .contains(EntityCapabilities::VENDOR_UNIQUE_SUPPORTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_identifier_validity() {
        assert!(!UniqueIdentifier::NULL.is_valid());
        assert!(!UniqueIdentifier::new(u64::MAX).is_valid());
        assert!(UniqueIdentifier::new(0x0102_0304_0506_0708).is_valid());
    }

    #[test]
    fn unique_identifier_displays_as_hex() {
        let eid = UniqueIdentifier::new(0x1bc5_0ab0_0042_0001);
        assert_eq!(eid.to_string(), "0x1bc50ab000420001");
    }

    #[test]
    fn avdecc_string_clamps_at_capacity() {
        let long = "x".repeat(100);
        let s = AvdeccString::new(&long);
        assert_eq!(s.as_str().len(), AvdeccString::MAX_LEN);
    }

    #[test]
    fn localized_string_reference_split() {
        let reference = LocalizedStringReference::from_parts(5, 2);
        assert_eq!(reference.offset(), 5);
        assert_eq!(reference.strings_index(), 2);
        assert!(reference.is_valid());
        assert!(!LocalizedStringReference::NONE.is_valid());
    }

    #[test]
    fn capability_set_contains() {
        let caps = EntityCapabilities::AEM_SUPPORTED | EntityCapabilities::CLASS_A_SUPPORTED;
        assert!(caps.contains(EntityCapabilities::AEM_SUPPORTED));
        assert!(!caps.contains(EntityCapabilities::GATEWAY_ENTITY));
    }

    #[test]
    fn mac_address_display() {
        let mac = MacAddress([0x00, 0x1b, 0xc5, 0x0a, 0xb0, 0x01]);
        assert_eq!(mac.to_string(), "00:1b:c5:0a:b0:01");
    }
}
