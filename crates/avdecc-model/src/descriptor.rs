// ── Wire descriptors ──
//
// Decoded AEM descriptor payloads as delivered by READ_DESCRIPTOR
// responses. These are the *inputs* to the controlled-entity model; the
// tree in `tree.rs` is what the controller keeps after splitting them
// into static and dynamic halves.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::*;

/// ENTITY descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    pub entity_id: UniqueIdentifier,
    pub entity_model_id: UniqueIdentifier,
    pub entity_capabilities: EntityCapabilities,
    pub talker_stream_sources: u16,
    pub talker_capabilities: TalkerCapabilities,
    pub listener_stream_sinks: u16,
    pub listener_capabilities: ListenerCapabilities,
    pub controller_capabilities: ControllerCapabilities,
    pub available_index: u32,
    pub entity_name: AvdeccString,
    pub vendor_name_string: LocalizedStringReference,
    pub model_name_string: LocalizedStringReference,
    pub firmware_version: AvdeccString,
    pub group_name: AvdeccString,
    pub serial_number: AvdeccString,
    pub configurations_count: u16,
    pub current_configuration: ConfigurationIndex,
}

/// CONFIGURATION descriptor. `descriptor_counts` promises how many
/// descriptors of each kind the configuration holds; completeness checks
/// and the static-model walk are driven from it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub descriptor_counts: BTreeMap<DescriptorType, u16>,
}

/// AUDIO_UNIT descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioUnitDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub clock_domain_index: ClockDomainIndex,
    pub number_of_stream_input_ports: u16,
    pub base_stream_input_port: StreamPortIndex,
    pub number_of_stream_output_ports: u16,
    pub base_stream_output_port: StreamPortIndex,
    pub number_of_controls: u16,
    pub base_control: ControlIndex,
    pub current_sampling_rate: SamplingRate,
    pub sampling_rates: BTreeSet<SamplingRate>,
}

/// STREAM_INPUT / STREAM_OUTPUT descriptor (shared shape).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub clock_domain_index: ClockDomainIndex,
    pub stream_flags: StreamFlags,
    pub avb_interface_index: AvbInterfaceIndex,
    pub buffer_length: u32,
    pub current_format: StreamFormat,
    pub formats: BTreeSet<StreamFormat>,
    /// Indexes of the streams paired with this one for seamless
    /// redundancy; empty for non-redundant streams.
    pub redundant_streams: BTreeSet<StreamIndex>,
}

/// AVB_INTERFACE descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvbInterfaceDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub mac_address: MacAddress,
    pub interface_flags: AvbInterfaceFlags,
    pub clock_identity: UniqueIdentifier,
    pub priority1: u8,
    pub clock_class: u8,
    pub offset_scaled_log_variance: u16,
    pub clock_accuracy: u8,
    pub priority2: u8,
    pub domain_number: u8,
    pub log_sync_interval: i8,
    pub log_announce_interval: i8,
    pub log_pdelay_interval: i8,
    pub port_number: u16,
}

/// CLOCK_SOURCE descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockSourceDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub clock_source_type: ClockSourceType,
    pub clock_source_flags: u16,
    pub clock_source_identifier: UniqueIdentifier,
    pub clock_source_location_type: DescriptorType,
    pub clock_source_location_index: DescriptorIndex,
}

/// MEMORY_OBJECT descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryObjectDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub memory_object_type: MemoryObjectType,
    pub target_descriptor_type: DescriptorType,
    pub target_descriptor_index: DescriptorIndex,
    pub start_address: u64,
    pub maximum_length: u64,
    pub length: u64,
}

/// LOCALE descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocaleDescriptor {
    pub locale_id: AvdeccString,
    pub number_of_string_descriptors: u16,
    pub base_string_descriptor_index: StringsIndex,
}

/// STRINGS descriptor: up to seven strings per descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StringsDescriptor {
    pub strings: Vec<AvdeccString>,
}

/// STREAM_PORT_INPUT / STREAM_PORT_OUTPUT descriptor (shared shape).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamPortDescriptor {
    pub clock_domain_index: ClockDomainIndex,
    pub port_flags: StreamPortFlags,
    pub number_of_controls: u16,
    pub base_control: ControlIndex,
    pub number_of_clusters: u16,
    pub base_cluster: ClusterIndex,
    pub number_of_maps: u16,
    pub base_map: MapIndex,
}

/// AUDIO_CLUSTER descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioClusterDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub signal_type: DescriptorType,
    pub signal_index: DescriptorIndex,
    pub signal_output: u16,
    pub path_latency: u32,
    pub block_latency: u32,
    pub channel_count: u16,
    pub format: AudioClusterFormat,
}

/// AUDIO_MAP descriptor: the fixed channel mappings of a stream port
/// without dynamic mapping support.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioMapDescriptor {
    pub mappings: AudioMappings,
}

/// CONTROL descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub block_latency: u32,
    pub control_latency: u32,
    pub control_domain: u16,
    pub control_type: ControlType,
    pub reset_time: u32,
    pub signal_type: DescriptorType,
    pub signal_index: DescriptorIndex,
    pub signal_output: u16,
    pub control_value_type: ControlValueType,
    pub values_static: Vec<LinearValueStatic>,
    pub values_dynamic: ControlValues,
}

/// CLOCK_DOMAIN descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockDomainDescriptor {
    pub object_name: AvdeccString,
    pub localized_description: LocalizedStringReference,
    pub clock_source_index: ClockSourceIndex,
    pub clock_sources: Vec<ClockSourceIndex>,
}
