// End-to-end enumeration scenarios, driving the core the way the
// orchestrator does: register expectations, deliver responses, clear
// steps as their expected sets drain.

mod common;

use std::time::{Duration, Instant};

use avdecc_controller::{DynamicInfoType, EnumerationStep, QUERY_RETRY_DELAY};
use avdecc_model::tree::EntityTree;
use avdecc_model::{
    DescriptorType, StreamIdentification, StreamInputConnectionInfo, StreamInputConnectionState,
    UniqueIdentifier,
};

use common::*;

/// Build the cached tree scenario 2/3 preload: one complete
/// configuration with a single stream input.
fn complete_cached_tree() -> EntityTree {
    let mut source = live_entity(true);
    source.set_entity_descriptor(&entity_descriptor());
    source.set_configuration_descriptor(
        &configuration_descriptor(&[(DescriptorType::StreamInput, 1)]),
        0,
    );
    source.set_stream_input_descriptor(&stream_descriptor("Cached Input", 0, &[]), 0, 0);
    source.entity_tree().unwrap().clone()
}

#[test]
fn happy_path_live_enumeration() {
    let mut entity = live_entity(true);
    entity.statistics_mut().set_start_enumeration_time(Instant::now());
    entity.set_enumeration_steps(
        [
            EnumerationStep::RegisterUnsol,
            EnumerationStep::GetStaticModel,
            EnumerationStep::GetDynamicInfo,
        ]
        .into_iter()
        .collect(),
    );

    // Step: RegisterUnsol.
    entity.set_register_unsol_expected();
    assert!(entity.check_and_clear_expected_register_unsol());
    entity.set_subscribed_to_unsolicited_notifications(true);
    assert!(entity.got_expected_register_unsol());
    entity.clear_enumeration_step(EnumerationStep::RegisterUnsol);

    // Step: GetStaticModel, breadth-first from the entity descriptor.
    entity.set_descriptor_expected(0, DescriptorType::Entity, 0);
    assert!(entity.check_and_clear_expected_descriptor(0, DescriptorType::Entity, 0));
    entity.set_entity_descriptor(&entity_descriptor());

    entity.set_descriptor_expected(0, DescriptorType::Configuration, 0);
    assert!(entity.check_and_clear_expected_descriptor(0, DescriptorType::Configuration, 0));
    entity.set_configuration_descriptor(
        &configuration_descriptor(&[(DescriptorType::StreamInput, 1)]),
        0,
    );

    entity.set_descriptor_expected(0, DescriptorType::StreamInput, 0);
    assert!(entity.check_and_clear_expected_descriptor(0, DescriptorType::StreamInput, 0));
    entity.set_stream_input_descriptor(&stream_descriptor("Input 0", 0, &[]), 0, 0);

    assert!(entity.got_all_expected_descriptors());
    entity.clear_enumeration_step(EnumerationStep::GetStaticModel);

    // Step: GetDynamicInfo.
    entity.set_dynamic_info_expected(0, DynamicInfoType::InputStreamState, 0, 0);
    assert!(entity.check_and_clear_expected_dynamic_info(0, DynamicInfoType::InputStreamState, 0, 0));
    entity.set_stream_input_connection_information(
        0,
        StreamInputConnectionInfo {
            talker_stream: StreamIdentification {
                entity_id: UniqueIdentifier::new(0x42),
                stream_index: 3,
            },
            state: StreamInputConnectionState::Connected,
        },
    );
    assert!(entity.got_all_expected_dynamic_info());
    entity.clear_enumeration_step(EnumerationStep::GetDynamicInfo);

    // All steps drained: the entity is fully loaded and advertised.
    assert!(entity.enumeration_steps().is_empty());
    entity.on_entity_fully_loaded();
    entity.set_advertised(true);

    assert!(entity.was_advertised());
    assert!(entity.got_all_expected_milan_info());
    assert!(entity.got_all_expected_descriptors());
    assert!(entity.got_all_expected_dynamic_info());
    assert!(entity.got_all_expected_descriptor_dynamic_info());
    assert_eq!(
        entity.stream_input_dynamic_model(0, 0).unwrap().object_name.as_str(),
        "Input 0"
    );
    assert_eq!(
        entity.sink_connection_information(0).unwrap().state,
        StreamInputConnectionState::Connected
    );
    assert!(entity.is_entity_model_valid_for_caching());
}

#[test]
fn cached_tree_reuse_skips_static_model() {
    let cached = complete_cached_tree();

    let mut entity = live_entity(true);
    entity.set_enumeration_steps(
        [EnumerationStep::GetStaticModel, EnumerationStep::GetDynamicInfo]
            .into_iter()
            .collect(),
    );

    let accepted = entity.set_cached_entity_tree(cached, &entity_descriptor(), true);
    assert!(accepted);

    // The orchestrator swaps the full walk for targeted dynamic reads.
    entity.clear_enumeration_step(EnumerationStep::GetStaticModel);
    entity.add_enumeration_step(EnumerationStep::GetDescriptorDynamicInfo);

    let steps = entity.enumeration_steps();
    assert!(steps.test(EnumerationStep::GetDescriptorDynamicInfo));
    assert!(steps.test(EnumerationStep::GetDynamicInfo));
    assert!(!steps.test(EnumerationStep::GetStaticModel));

    // The cached model is in place, overlaid with the live descriptor.
    assert_eq!(
        entity.stream_input_dynamic_model(0, 0).unwrap().object_name.as_str(),
        "Cached Input"
    );
    assert_eq!(
        entity.entity_dynamic_model().unwrap().entity_name.as_str(),
        "Test Device"
    );
}

#[test]
fn cached_tree_with_mismatched_model_id_is_rejected() {
    let cached = complete_cached_tree();

    let mut entity = live_entity(true);
    entity.set_enumeration_steps(
        [EnumerationStep::GetStaticModel, EnumerationStep::GetDynamicInfo]
            .into_iter()
            .collect(),
    );

    let mut descriptor = entity_descriptor();
    descriptor.entity_model_id = UniqueIdentifier::new(0xfeed_face);

    assert!(!entity.set_cached_entity_tree(cached, &descriptor, true));
    assert!(entity.enumeration_steps().test(EnumerationStep::GetStaticModel));
    assert!(!entity.has_any_configuration_tree());
}

#[test]
fn incomplete_cached_tree_is_rejected() {
    let mut cached = complete_cached_tree();
    cached
        .configuration_trees
        .get_mut(&0)
        .unwrap()
        .stream_input_models
        .clear();

    let mut entity = live_entity(true);
    assert!(!entity.set_cached_entity_tree(cached, &entity_descriptor(), true));
}

#[test]
fn retry_exhaustion_latches_a_fatal_error() {
    let mut entity = live_entity(true);
    entity.set_enumeration_steps([EnumerationStep::GetStaticModel].into_iter().collect());
    entity.set_descriptor_expected(0, DescriptorType::Configuration, 0);

    // The response never arrives: two retries are granted, then the
    // orchestrator gives up.
    assert_eq!(entity.query_descriptor_retry_timer(), (true, QUERY_RETRY_DELAY));
    assert_eq!(entity.query_descriptor_retry_timer(), (true, QUERY_RETRY_DELAY));
    assert_eq!(entity.query_descriptor_retry_timer(), (false, Duration::ZERO));

    entity.set_fatal_enumeration_error();
    entity.set_fatal_enumeration_error(); // idempotent

    assert!(entity.got_fatal_enumeration_error());
    assert!(!entity.was_advertised());
    // Late responses no longer advance the machine.
    assert!(!entity.check_and_clear_expected_descriptor(0, DescriptorType::Configuration, 0));
    // And the model reads as absent.
    assert!(entity.entity_tree().is_err());
}

#[test]
fn unexpected_response_is_counted_not_recorded() {
    let mut entity = live_entity(true);

    let expected =
        entity.check_and_clear_expected_dynamic_info(0, DynamicInfoType::InputStreamInfo, 7, 0);
    assert!(!expected);

    if !expected {
        entity.statistics_mut().increment_aecp_unexpected_response_counter();
    }
    assert_eq!(entity.statistics().aecp_unexpected_response_counter(), 1);
}

#[test]
fn non_aem_entity_has_no_tree() {
    let entity = live_entity(false);
    assert!(entity.entity_tree().is_err());
    assert!(entity.configuration_tree(0).is_err());
    assert!(!entity.has_configuration_tree(0));
    assert!(!entity.is_entity_model_valid_for_caching());
}

#[test]
fn accessors_report_missing_configurations_and_descriptors() {
    let mut entity = live_entity(true);
    entity.set_entity_descriptor(&entity_descriptor());
    entity.set_configuration_descriptor(&configuration_descriptor(&[]), 0);

    use avdecc_controller::EntityError;
    assert_eq!(
        entity.configuration_tree(9).unwrap_err(),
        EntityError::InvalidConfigurationIndex
    );
    assert_eq!(
        entity.stream_input_static_model(0, 4).unwrap_err(),
        EntityError::InvalidDescriptorIndex
    );
    assert!(!entity.has_descriptor(0, DescriptorType::StreamInput, 4));
}

#[test]
fn second_entity_descriptor_after_advertising_is_fatal() {
    let mut entity = live_entity(true);
    entity.set_entity_descriptor(&entity_descriptor());
    entity.set_configuration_descriptor(&configuration_descriptor(&[]), 0);
    entity.on_entity_fully_loaded();
    entity.set_advertised(true);

    entity.set_entity_descriptor(&entity_descriptor());

    assert!(entity.got_fatal_enumeration_error());
    assert!(entity.entity_tree().is_err());
}

#[test]
fn controlled_entity_is_send() {
    fn assert_send<T: Send>(_: T) {}
    // The controller hands entities across orchestrator threads.
    assert_send(live_entity(true));
}
