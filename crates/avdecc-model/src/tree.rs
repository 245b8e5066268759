// ── The static/dynamic descriptor tree ──
//
// Every descriptor kept by the controller splits into an immutable
// *static model* (shape and discovery-time values) and a mutable
// *dynamic model* (current values, counters, connection state). The
// tree mirrors the wire hierarchy: entity -> configurations ->
// per-kind index maps.
//
// `BTreeMap` throughout: traversal order and dump output must be
// deterministic and ascending by descriptor index.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::counters::*;
use crate::types::*;

/// A static/dynamic model pair for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Models<S, D> {
    pub static_model: S,
    pub dynamic_model: D,
}

// ── Entity ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityNodeStaticModel {
    pub vendor_name_string: LocalizedStringReference,
    pub model_name_string: LocalizedStringReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityNodeDynamicModel {
    pub entity_name: AvdeccString,
    pub group_name: AvdeccString,
    pub firmware_version: AvdeccString,
    pub serial_number: AvdeccString,
    pub current_configuration: ConfigurationIndex,
    pub counters: Option<EntityCounters>,
}

// ── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationNodeStaticModel {
    pub localized_description: LocalizedStringReference,
    pub descriptor_counts: BTreeMap<DescriptorType, u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationNodeDynamicModel {
    pub object_name: AvdeccString,
    pub is_active_configuration: bool,
    /// Base strings-descriptor index of the selected locale.
    pub selected_locale_base_index: StringsIndex,
    /// Number of strings descriptors covered by the selected locale.
    pub selected_locale_count: StringsIndex,
    /// Resolved strings of the selected locale, keyed by absolute
    /// strings-descriptor index.
    pub localized_strings: BTreeMap<StringsIndex, Vec<AvdeccString>>,
}

// ── Audio unit ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioUnitNodeStaticModel {
    pub localized_description: LocalizedStringReference,
    pub clock_domain_index: ClockDomainIndex,
    pub number_of_stream_input_ports: u16,
    pub base_stream_input_port: StreamPortIndex,
    pub number_of_stream_output_ports: u16,
    pub base_stream_output_port: StreamPortIndex,
    pub number_of_controls: u16,
    pub base_control: ControlIndex,
    pub sampling_rates: BTreeSet<SamplingRate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioUnitNodeDynamicModel {
    pub object_name: AvdeccString,
    pub current_sampling_rate: SamplingRate,
}

// ── Streams ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamNodeStaticModel {
    pub localized_description: LocalizedStringReference,
    pub clock_domain_index: ClockDomainIndex,
    pub stream_flags: StreamFlags,
    pub avb_interface_index: AvbInterfaceIndex,
    pub buffer_length: u32,
    pub formats: BTreeSet<StreamFormat>,
    pub redundant_streams: BTreeSet<StreamIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamInputNodeDynamicModel {
    pub object_name: AvdeccString,
    pub stream_format: StreamFormat,
    /// None until a START/STOP_STREAMING state is observed; an unknown
    /// state reads as running.
    pub is_stream_running: Option<bool>,
    pub connection_info: StreamInputConnectionInfo,
    pub counters: Option<StreamInputCounters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamOutputNodeDynamicModel {
    pub object_name: AvdeccString,
    pub stream_format: StreamFormat,
    pub is_stream_running: Option<bool>,
    /// Listener streams currently connected to this talker stream.
    pub connections: BTreeSet<StreamIdentification>,
    pub counters: Option<StreamOutputCounters>,
}

// ── AVB interface ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvbInterfaceNodeStaticModel {
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

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvbInterfaceNodeDynamicModel {
    pub object_name: AvdeccString,
    pub avb_interface_info: Option<AvbInterfaceInfo>,
    pub as_path: Option<AsPath>,
    pub counters: Option<AvbInterfaceCounters>,
}

// ── Clock source ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockSourceNodeStaticModel {
    pub localized_description: LocalizedStringReference,
    pub clock_source_type: ClockSourceType,
    pub clock_source_location_type: DescriptorType,
    pub clock_source_location_index: DescriptorIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockSourceNodeDynamicModel {
    pub object_name: AvdeccString,
    pub clock_source_flags: u16,
    pub clock_source_identifier: UniqueIdentifier,
}

// ── Memory object ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryObjectNodeStaticModel {
    pub localized_description: LocalizedStringReference,
    pub memory_object_type: MemoryObjectType,
    pub target_descriptor_type: DescriptorType,
    pub target_descriptor_index: DescriptorIndex,
    pub start_address: u64,
    pub maximum_length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryObjectNodeDynamicModel {
    pub object_name: AvdeccString,
    pub length: u64,
}

// ── Locale and strings ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocaleNodeStaticModel {
    pub locale_id: AvdeccString,
    pub number_of_string_descriptors: u16,
    pub base_string_descriptor_index: StringsIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocaleNodeDynamicModel {}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StringsNodeStaticModel {
    pub strings: Vec<AvdeccString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StringsNodeDynamicModel {}

// ── Stream port ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamPortNodeStaticModel {
    pub clock_domain_index: ClockDomainIndex,
    pub port_flags: StreamPortFlags,
    pub number_of_controls: u16,
    pub base_control: ControlIndex,
    pub number_of_clusters: u16,
    pub base_cluster: ClusterIndex,
    pub number_of_maps: u16,
    pub base_map: MapIndex,
    /// A port with no fixed AUDIO_MAP descriptors takes dynamic mappings
    /// instead.
    pub has_dynamic_audio_map: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamPortNodeDynamicModel {
    pub dynamic_audio_map: AudioMappings,
}

// ── Audio cluster and map ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioClusterNodeStaticModel {
    pub localized_description: LocalizedStringReference,
    pub signal_type: DescriptorType,
    pub signal_index: DescriptorIndex,
    pub signal_output: u16,
    pub path_latency: u32,
    pub block_latency: u32,
    pub channel_count: u16,
    pub format: AudioClusterFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioClusterNodeDynamicModel {
    pub object_name: AvdeccString,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioMapNodeStaticModel {
    pub mappings: AudioMappings,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudioMapNodeDynamicModel {}

// ── Control ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlNodeStaticModel {
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
    pub values: Vec<LinearValueStatic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlNodeDynamicModel {
    pub object_name: AvdeccString,
    pub values: ControlValues,
}

// ── Clock domain ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockDomainNodeStaticModel {
    pub localized_description: LocalizedStringReference,
    pub clock_sources: Vec<ClockSourceIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockDomainNodeDynamicModel {
    pub object_name: AvdeccString,
    pub clock_source_index: ClockSourceIndex,
    pub counters: Option<ClockDomainCounters>,
}

// ── Configuration tree ──────────────────────────────────────────────

pub type AudioUnitModels = Models<AudioUnitNodeStaticModel, AudioUnitNodeDynamicModel>;
pub type StreamInputModels = Models<StreamNodeStaticModel, StreamInputNodeDynamicModel>;
pub type StreamOutputModels = Models<StreamNodeStaticModel, StreamOutputNodeDynamicModel>;
pub type AvbInterfaceModels = Models<AvbInterfaceNodeStaticModel, AvbInterfaceNodeDynamicModel>;
pub type ClockSourceModels = Models<ClockSourceNodeStaticModel, ClockSourceNodeDynamicModel>;
pub type MemoryObjectModels = Models<MemoryObjectNodeStaticModel, MemoryObjectNodeDynamicModel>;
pub type LocaleModels = Models<LocaleNodeStaticModel, LocaleNodeDynamicModel>;
pub type StringsModels = Models<StringsNodeStaticModel, StringsNodeDynamicModel>;
pub type StreamPortModels = Models<StreamPortNodeStaticModel, StreamPortNodeDynamicModel>;
pub type AudioClusterModels = Models<AudioClusterNodeStaticModel, AudioClusterNodeDynamicModel>;
pub type AudioMapModels = Models<AudioMapNodeStaticModel, AudioMapNodeDynamicModel>;
pub type ControlModels = Models<ControlNodeStaticModel, ControlNodeDynamicModel>;
pub type ClockDomainModels = Models<ClockDomainNodeStaticModel, ClockDomainNodeDynamicModel>;

/// All descriptors of one configuration, keyed by descriptor index
/// within each kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationTree {
    pub static_model: ConfigurationNodeStaticModel,
    pub dynamic_model: ConfigurationNodeDynamicModel,
    pub audio_unit_models: BTreeMap<AudioUnitIndex, AudioUnitModels>,
    pub stream_input_models: BTreeMap<StreamIndex, StreamInputModels>,
    pub stream_output_models: BTreeMap<StreamIndex, StreamOutputModels>,
    pub avb_interface_models: BTreeMap<AvbInterfaceIndex, AvbInterfaceModels>,
    pub clock_source_models: BTreeMap<ClockSourceIndex, ClockSourceModels>,
    pub memory_object_models: BTreeMap<MemoryObjectIndex, MemoryObjectModels>,
    pub locale_models: BTreeMap<LocaleIndex, LocaleModels>,
    pub strings_models: BTreeMap<StringsIndex, StringsModels>,
    pub stream_port_input_models: BTreeMap<StreamPortIndex, StreamPortModels>,
    pub stream_port_output_models: BTreeMap<StreamPortIndex, StreamPortModels>,
    pub audio_cluster_models: BTreeMap<ClusterIndex, AudioClusterModels>,
    pub audio_map_models: BTreeMap<MapIndex, AudioMapModels>,
    pub control_models: BTreeMap<ControlIndex, ControlModels>,
    pub clock_domain_models: BTreeMap<ClockDomainIndex, ClockDomainModels>,
}

impl ConfigurationTree {
    /// Number of descriptors of `kind` currently stored in this tree.
    pub fn stored_count(&self, kind: DescriptorType) -> usize {
        match kind {
            DescriptorType::AudioUnit => self.audio_unit_models.len(),
            DescriptorType::StreamInput => self.stream_input_models.len(),
            DescriptorType::StreamOutput => self.stream_output_models.len(),
            DescriptorType::AvbInterface => self.avb_interface_models.len(),
            DescriptorType::ClockSource => self.clock_source_models.len(),
            DescriptorType::MemoryObject => self.memory_object_models.len(),
            DescriptorType::Locale => self.locale_models.len(),
            DescriptorType::Strings => self.strings_models.len(),
            DescriptorType::StreamPortInput => self.stream_port_input_models.len(),
            DescriptorType::StreamPortOutput => self.stream_port_output_models.len(),
            DescriptorType::AudioCluster => self.audio_cluster_models.len(),
            DescriptorType::AudioMap => self.audio_map_models.len(),
            DescriptorType::Control => self.control_models.len(),
            DescriptorType::ClockDomain => self.clock_domain_models.len(),
            DescriptorType::Entity | DescriptorType::Configuration => 0,
        }
    }

    /// True iff every descriptor kind promised by `descriptor_counts`
    /// is fully present.
    ///
    /// STRINGS descriptors are exempt: only the ones belonging to the
    /// selected locale are ever read from the entity.
    pub fn is_complete(&self) -> bool {
        self.static_model
            .descriptor_counts
            .iter()
            .all(|(&kind, &count)| {
                kind == DescriptorType::Strings || self.stored_count(kind) == count as usize
            })
    }
}

/// The complete descriptor tree of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityTree {
    pub static_model: EntityNodeStaticModel,
    pub dynamic_model: EntityNodeDynamicModel,
    pub configuration_trees: BTreeMap<ConfigurationIndex, ConfigurationTree>,
}

impl EntityTree {
    /// True iff the tree holds `configurations_count` configurations and
    /// every one of them is complete.
    pub fn is_complete(&self, configurations_count: u16) -> bool {
        self.configuration_trees.len() == configurations_count as usize
            && self.configuration_trees.values().all(ConfigurationTree::is_complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_counts(counts: &[(DescriptorType, u16)]) -> ConfigurationTree {
        let mut tree = ConfigurationTree::default();
        tree.static_model.descriptor_counts = counts.iter().copied().collect();
        tree
    }

    #[test]
    fn empty_configuration_with_no_promises_is_complete() {
        assert!(ConfigurationTree::default().is_complete());
    }

    #[test]
    fn configuration_missing_promised_descriptors_is_incomplete() {
        let tree = config_with_counts(&[(DescriptorType::StreamInput, 2)]);
        assert!(!tree.is_complete());
    }

    #[test]
    fn configuration_with_all_promised_descriptors_is_complete() {
        let mut tree = config_with_counts(&[(DescriptorType::StreamInput, 2)]);
        tree.stream_input_models.insert(0, StreamInputModels::default());
        tree.stream_input_models.insert(1, StreamInputModels::default());
        assert!(tree.is_complete());
    }

    #[test]
    fn strings_are_exempt_from_completeness() {
        let tree = config_with_counts(&[(DescriptorType::Strings, 7)]);
        assert!(tree.is_complete());
    }

    #[test]
    fn descriptor_counts_serialize_as_an_object() {
        let mut tree = ConfigurationTree::default();
        tree.static_model
            .descriptor_counts
            .insert(DescriptorType::StreamInput, 2);
        let value = serde_json::to_value(&tree.static_model).unwrap();
        assert_eq!(value["descriptor_counts"]["stream_input"], 2);
    }

    #[test]
    fn entity_tree_requires_every_configuration() {
        let mut tree = EntityTree::default();
        tree.configuration_trees.insert(0, ConfigurationTree::default());
        assert!(tree.is_complete(1));
        assert!(!tree.is_complete(2));
    }
}
