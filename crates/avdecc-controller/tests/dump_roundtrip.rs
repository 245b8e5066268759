// Dump/load round-trips: the JSON document must be lossless for every
// modeled field, and loading must yield a virtual, fully-loaded entity.

mod common;

use std::sync::Arc;
use std::time::Duration;

use avdecc_controller::{
    create_json_dump, load_from_json, AcquireState, CompatibilityFlags, ControlledEntity,
    DeserializationError, InterfaceLinkStatus, SerializationError, SharedLock, DUMP_VERSION,
};
use avdecc_model::descriptor::{
    ClockDomainDescriptor, ControlDescriptor, LocaleDescriptor, StringsDescriptor,
};
use avdecc_model::{
    AvdeccString, DescriptorType, EntityCounterName, MilanInfo, UniqueIdentifier,
};

use common::*;

fn populated_entity() -> ControlledEntity {
    let mut entity = live_entity(true);
    entity.set_entity_descriptor(&entity_descriptor());
    entity.set_configuration_descriptor(
        &configuration_descriptor(&[
            (DescriptorType::StreamInput, 1),
            (DescriptorType::StreamOutput, 1),
            (DescriptorType::Locale, 1),
            (DescriptorType::Control, 1),
            (DescriptorType::ClockDomain, 1),
        ]),
        0,
    );
    entity.set_stream_input_descriptor(&stream_descriptor("In", 0, &[]), 0, 0);
    entity.set_stream_output_descriptor(&stream_descriptor("Out", 0, &[]), 0, 0);
    entity.set_locale_descriptor(
        &LocaleDescriptor {
            locale_id: AvdeccString::new("en-US"),
            number_of_string_descriptors: 1,
            base_string_descriptor_index: 0,
        },
        0,
        0,
    );
    entity.set_selected_locale_strings_indexes_range(0, 0, 1);
    entity.set_strings_descriptor(
        &StringsDescriptor {
            strings: vec![AvdeccString::new("Vendor"), AvdeccString::new("Model")],
        },
        0,
        0,
    );
    entity.set_control_descriptor(&ControlDescriptor::default(), 0, 0);
    entity.set_clock_domain_descriptor(
        &ClockDomainDescriptor {
            object_name: AvdeccString::new("Domain"),
            clock_source_index: 0,
            clock_sources: vec![0],
            ..Default::default()
        },
        0,
        0,
    );

    // Dynamic state beyond the descriptors.
    entity.set_milan_info(MilanInfo {
        protocol_version: 1,
        features_flags: 0,
        certification_version: 0x0100_0000,
    });
    entity.set_compatibility_flags(CompatibilityFlags { ieee17221: true, milan: true });
    entity.set_acquire_state(AcquireState::AcquiredByOther);
    entity.set_owning_controller(UniqueIdentifier::new(0xc0fe));
    entity.set_avb_interface_link_status(0, InterfaceLinkStatus::Up);
    entity.set_subscribed_to_unsolicited_notifications(true);
    entity
        .entity_counters_mut()
        .insert(EntityCounterName::EntitySpecific1, 7);
    entity.statistics_mut().set_aecp_retry_counter(3);
    entity.statistics_mut().update_aecp_response_time_average(Duration::from_millis(12));
    entity.statistics_mut().increment_aem_aecp_unsolicited_counter();

    entity.on_entity_fully_loaded();
    entity.set_advertised(true);
    entity
}

#[test]
fn round_trip_preserves_the_model_and_state() {
    let entity = populated_entity();
    let dump = create_json_dump(&entity).unwrap();

    let loaded = load_from_json(dump, Arc::new(SharedLock::new())).unwrap();

    assert!(loaded.is_virtual());
    assert!(loaded.was_advertised());
    assert!(loaded.enumeration_steps().is_empty());

    assert_eq!(loaded.entity(), entity.entity());
    assert_eq!(loaded.entity_tree().unwrap(), entity.entity_tree().unwrap());
    assert_eq!(loaded.compatibility_flags(), entity.compatibility_flags());
    assert_eq!(loaded.milan_info(), entity.milan_info());
    assert_eq!(loaded.acquire_state(), AcquireState::AcquiredByOther);
    assert_eq!(loaded.owning_controller_id(), UniqueIdentifier::new(0xc0fe));
    assert_eq!(loaded.avb_interface_link_status(0), InterfaceLinkStatus::Up);
    assert!(loaded.is_subscribed_to_unsolicited_notifications());

    assert_eq!(loaded.statistics().aecp_retry_counter(), 3);
    assert_eq!(loaded.statistics().aecp_response_average_time(), Duration::from_millis(12));
    assert_eq!(loaded.statistics().aem_aecp_unsolicited_counter(), 1);

    // Derived structures were rebuilt, not copied.
    assert_eq!(
        loaded.stream_input_dynamic_model(0, 0).unwrap().object_name.as_str(),
        "In"
    );
    assert_eq!(
        loaded
            .configuration_localized_string(0, avdecc_model::LocalizedStringReference::from_parts(1, 0))
            .as_str(),
        "Model"
    );
}

#[test]
fn loaded_entity_is_never_valid_for_caching() {
    let entity = populated_entity();
    assert!(entity.is_entity_model_valid_for_caching());

    let dump = create_json_dump(&entity).unwrap();
    let loaded = load_from_json(dump, Arc::new(SharedLock::new())).unwrap();

    // Virtual entities must not be written back into the cache.
    assert!(!loaded.is_entity_model_valid_for_caching());
}

#[test]
fn unknown_dump_version_is_rejected() {
    let entity = populated_entity();
    let mut dump = create_json_dump(&entity).unwrap();
    dump["dump_version"] = serde_json::json!(DUMP_VERSION + 1);

    let error = load_from_json(dump, Arc::new(SharedLock::new())).unwrap_err();
    assert_eq!(error, DeserializationError::UnsupportedDumpVersion(DUMP_VERSION + 1));
}

#[test]
fn missing_version_is_rejected() {
    let error = load_from_json(serde_json::json!({}), Arc::new(SharedLock::new())).unwrap_err();
    assert_eq!(error, DeserializationError::MissingInformation("dump_version"));
}

#[test]
fn aem_entity_without_a_tree_cannot_be_dumped() {
    let entity = live_entity(true);
    assert_eq!(create_json_dump(&entity).unwrap_err(), SerializationError::NotSupported);
}

#[test]
fn non_aem_entity_dumps_without_a_tree() {
    let entity = live_entity(false);
    let dump = create_json_dump(&entity).unwrap();
    assert!(dump["entity_tree"].is_null());

    let loaded = load_from_json(dump, Arc::new(SharedLock::new())).unwrap();
    assert!(loaded.is_virtual());
    assert!(loaded.entity_tree().is_err());
}

#[test]
fn dangling_identify_control_index_fails_the_dump() {
    let mut entity = populated_entity();
    entity.set_identify_control_index(42);

    assert_eq!(
        create_json_dump(&entity).unwrap_err(),
        SerializationError::InvalidDescriptorIndex
    );
}
