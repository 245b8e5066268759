// Property-based invariants of the lock, the expected-response sets,
// the retry policy, and tree completeness.

mod common;

use std::time::Duration;

use proptest::prelude::*;

use avdecc_controller::{DynamicInfoType, SharedLock, MAX_QUERY_RETRIES, QUERY_RETRY_DELAY};
use avdecc_model::tree::{ConfigurationTree, StreamInputModels, StreamOutputModels};
use avdecc_model::{DescriptorType, LocalizedStringReference};

use common::*;

fn descriptor_type_strategy() -> impl Strategy<Value = DescriptorType> {
    prop::sample::select(vec![
        DescriptorType::AudioUnit,
        DescriptorType::StreamInput,
        DescriptorType::StreamOutput,
        DescriptorType::AvbInterface,
        DescriptorType::ClockSource,
        DescriptorType::MemoryObject,
        DescriptorType::Control,
        DescriptorType::ClockDomain,
    ])
}

proptest! {
    /// Releasing every held acquisition and re-taking them restores the
    /// exact lock depth and ownership.
    #[test]
    fn unlock_all_then_lock_all_restores_depth(depth in 1u32..16) {
        let lock = SharedLock::new();
        lock.lock_all(depth);
        prop_assert_eq!(lock.locked_count(), depth);

        let released = lock.unlock_all();
        prop_assert_eq!(released, depth);
        prop_assert!(!lock.is_self_locked());

        lock.lock_all(released);
        prop_assert!(lock.is_self_locked());
        prop_assert_eq!(lock.locked_count(), depth);

        lock.unlock_all();
    }

    /// Registering the same expectation twice collapses into one entry:
    /// the first check clears it, the second reports unexpected.
    #[test]
    fn expected_sets_are_idempotent(
        configuration_index in 0u16..4,
        descriptor_type in descriptor_type_strategy(),
        descriptor_index in 0u16..64,
    ) {
        let mut entity = live_entity(true);
        entity.set_descriptor_expected(configuration_index, descriptor_type, descriptor_index);
        entity.set_descriptor_expected(configuration_index, descriptor_type, descriptor_index);

        prop_assert!(entity.check_and_clear_expected_descriptor(
            configuration_index, descriptor_type, descriptor_index));
        prop_assert!(!entity.check_and_clear_expected_descriptor(
            configuration_index, descriptor_type, descriptor_index));
        prop_assert!(entity.got_all_expected_descriptors());
    }

    /// A cleared expectation never affects its siblings.
    #[test]
    fn clearing_one_expectation_keeps_the_rest(
        descriptor_index in 0u16..32,
        sub_index in 0u16..8,
    ) {
        let mut entity = live_entity(true);
        entity.set_dynamic_info_expected(0, DynamicInfoType::InputStreamInfo, descriptor_index, sub_index);
        entity.set_dynamic_info_expected(0, DynamicInfoType::OutputStreamInfo, descriptor_index, sub_index);

        prop_assert!(entity.check_and_clear_expected_dynamic_info(
            0, DynamicInfoType::InputStreamInfo, descriptor_index, sub_index));
        prop_assert!(!entity.got_all_expected_dynamic_info());
        prop_assert!(entity.check_and_clear_expected_dynamic_info(
            0, DynamicInfoType::OutputStreamInfo, descriptor_index, sub_index));
        prop_assert!(entity.got_all_expected_dynamic_info());
    }

    /// Every retry timer grants exactly MAX_QUERY_RETRIES retries at the
    /// fixed delay, then refuses forever.
    #[test]
    fn retry_timers_grant_exactly_the_budget(extra_calls in 1usize..4) {
        let mut entity = live_entity(true);

        for _ in 0..MAX_QUERY_RETRIES {
            prop_assert_eq!(entity.query_dynamic_info_retry_timer(), (true, QUERY_RETRY_DELAY));
        }
        for _ in 0..extra_calls {
            prop_assert_eq!(entity.query_dynamic_info_retry_timer(), (false, Duration::ZERO));
        }
    }

    /// Completeness holds iff the stored per-kind counts match the
    /// promised descriptor counts exactly.
    #[test]
    fn completeness_matches_promised_counts(
        promised_inputs in 0u16..6,
        promised_outputs in 0u16..6,
        missing in 0u16..6,
    ) {
        let mut tree = ConfigurationTree::default();
        tree.static_model.descriptor_counts = [
            (DescriptorType::StreamInput, promised_inputs),
            (DescriptorType::StreamOutput, promised_outputs),
        ]
        .into_iter()
        .collect();

        for index in 0..promised_inputs {
            tree.stream_input_models.insert(index, StreamInputModels::default());
        }
        for index in 0..promised_outputs {
            tree.stream_output_models.insert(index, StreamOutputModels::default());
        }
        prop_assert!(tree.is_complete());

        // Removing any promised descriptor breaks completeness.
        if promised_inputs > 0 {
            let victim = missing % promised_inputs;
            tree.stream_input_models.remove(&victim);
            prop_assert!(!tree.is_complete());
        }
    }

    /// The (offset, strings_index) split survives re-packing.
    #[test]
    fn localized_string_reference_split_round_trips(
        offset in 0u16..(1 << 13) - 1,
        strings_index in 0u16..8,
    ) {
        let reference = LocalizedStringReference::from_parts(offset, strings_index);
        prop_assert!(reference.is_valid());
        prop_assert_eq!(reference.offset(), offset);
        prop_assert_eq!(reference.strings_index(), strings_index);
    }
}
