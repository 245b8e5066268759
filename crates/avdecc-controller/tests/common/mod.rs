// Shared builders for the controlled-entity tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use avdecc_controller::{ControlledEntity, SharedLock};
use avdecc_model::descriptor::{
    ConfigurationDescriptor, EntityDescriptor, StreamDescriptor, StreamPortDescriptor,
};
use avdecc_model::{
    AvbInterfaceIndex, AvdeccString, DescriptorType, Entity, EntityCapabilities,
    ListenerCapabilities, LocalizedStringReference, StreamFormat, StreamIndex,
    TalkerCapabilities, UniqueIdentifier,
};

pub const ENTITY_ID: u64 = 0x001b_c50a_b000_0001;
pub const ENTITY_MODEL_ID: u64 = 0xdead_beef;

pub fn adp_entity(aem_supported: bool) -> Entity {
    let mut capabilities = EntityCapabilities::empty();
    if aem_supported {
        capabilities.insert(EntityCapabilities::AEM_SUPPORTED);
    }
    Entity {
        entity_id: UniqueIdentifier::new(ENTITY_ID),
        entity_model_id: UniqueIdentifier::new(ENTITY_MODEL_ID),
        entity_capabilities: capabilities,
        talker_stream_sources: 1,
        talker_capabilities: TalkerCapabilities::IMPLEMENTED,
        listener_stream_sinks: 1,
        listener_capabilities: ListenerCapabilities::IMPLEMENTED,
        controller_capabilities: Default::default(),
        available_index: 0,
        identify_control_index: None,
    }
}

pub fn live_entity(aem_supported: bool) -> ControlledEntity {
    ControlledEntity::new(adp_entity(aem_supported), Arc::new(SharedLock::new()), false)
}

pub fn entity_descriptor() -> EntityDescriptor {
    EntityDescriptor {
        entity_id: UniqueIdentifier::new(ENTITY_ID),
        entity_model_id: UniqueIdentifier::new(ENTITY_MODEL_ID),
        entity_capabilities: EntityCapabilities::AEM_SUPPORTED,
        talker_stream_sources: 1,
        talker_capabilities: TalkerCapabilities::IMPLEMENTED,
        listener_stream_sinks: 1,
        listener_capabilities: ListenerCapabilities::IMPLEMENTED,
        controller_capabilities: Default::default(),
        available_index: 0,
        entity_name: AvdeccString::new("Test Device"),
        vendor_name_string: LocalizedStringReference::from_parts(0, 0),
        model_name_string: LocalizedStringReference::from_parts(1, 0),
        firmware_version: AvdeccString::new("1.0.0"),
        group_name: AvdeccString::new("Lab"),
        serial_number: AvdeccString::new("SN-0001"),
        configurations_count: 1,
        current_configuration: 0,
    }
}

pub fn configuration_descriptor(counts: &[(DescriptorType, u16)]) -> ConfigurationDescriptor {
    ConfigurationDescriptor {
        object_name: AvdeccString::new("Default"),
        localized_description: LocalizedStringReference::NONE,
        descriptor_counts: counts.iter().copied().collect::<BTreeMap<_, _>>(),
    }
}

pub fn stream_descriptor(
    name: &str,
    avb_interface_index: AvbInterfaceIndex,
    redundant_streams: &[StreamIndex],
) -> StreamDescriptor {
    StreamDescriptor {
        object_name: AvdeccString::new(name),
        localized_description: LocalizedStringReference::NONE,
        clock_domain_index: 0,
        stream_flags: Default::default(),
        avb_interface_index,
        buffer_length: 8,
        current_format: StreamFormat::new(0x0205_0227_0040_0100),
        formats: [StreamFormat::new(0x0205_0227_0040_0100)].into_iter().collect(),
        redundant_streams: redundant_streams.iter().copied().collect(),
    }
}

pub fn dynamic_map_port_descriptor() -> StreamPortDescriptor {
    StreamPortDescriptor {
        clock_domain_index: 0,
        port_flags: Default::default(),
        number_of_controls: 0,
        base_control: 0,
        number_of_clusters: 2,
        base_cluster: 0,
        number_of_maps: 0,
        base_map: 0,
    }
}
