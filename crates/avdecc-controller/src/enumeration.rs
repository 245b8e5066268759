// ── Enumeration state machine ──
//
// Discovery of an entity walks an ordered set of steps; each step
// registers the responses it expects and the step completes when its
// expected set drains. Responses that arrive without a matching
// expectation are unexpected (the caller counts them). Each step kind
// carries a retry counter feeding a shared retry policy.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Duration;

use avdecc_model::{ConfigurationIndex, DescriptorIndex, DescriptorType};

/// How many times an outstanding query set may be re-issued before the
/// step is considered failed.
pub const MAX_QUERY_RETRIES: u16 = 2;

/// Delay before re-issuing the outstanding queries of a step.
pub const QUERY_RETRY_DELAY: Duration = Duration::from_millis(1000);

// ── Steps ───────────────────────────────────────────────────────────

/// One stage of entity discovery. The numeric values define the
/// mandatory execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EnumerationStep {
    GetMilanInfo = 1 << 0,
    RegisterUnsol = 1 << 1,
    GetStaticModel = 1 << 2,
    /// Per-descriptor dynamic values the wire descriptor also carries;
    /// only queried when the static model came from cache.
    GetDescriptorDynamicInfo = 1 << 3,
    GetDynamicInfo = 1 << 4,
}

impl EnumerationStep {
    const ORDERED: [EnumerationStep; 5] = [
        EnumerationStep::GetMilanInfo,
        EnumerationStep::RegisterUnsol,
        EnumerationStep::GetStaticModel,
        EnumerationStep::GetDescriptorDynamicInfo,
        EnumerationStep::GetDynamicInfo,
    ];
}

/// Bitset of pending [`EnumerationStep`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnumerationSteps(u16);

impl EnumerationSteps {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn test(self, step: EnumerationStep) -> bool {
        self.0 & step as u16 != 0
    }

    pub fn set(&mut self, step: EnumerationStep) {
        self.0 |= step as u16;
    }

    pub fn reset(&mut self, step: EnumerationStep) {
        self.0 &= !(step as u16);
    }

    /// Pending steps in their mandatory execution order.
    pub fn iter(self) -> impl Iterator<Item = EnumerationStep> {
        EnumerationStep::ORDERED
            .into_iter()
            .filter(move |&step| self.test(step))
    }
}

impl FromIterator<EnumerationStep> for EnumerationSteps {
    fn from_iter<I: IntoIterator<Item = EnumerationStep>>(iter: I) -> Self {
        let mut steps = Self::empty();
        for step in iter {
            steps.set(step);
        }
        steps
    }
}

// ── Query kinds ─────────────────────────────────────────────────────

/// Milan vendor-unique queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MilanInfoType {
    /// GET_MILAN_INFO
    MilanInfo,
}

/// Dynamic information always retrieved from the entity, whether the
/// static model was read live or came from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicInfoType {
    AcquiredState,
    LockedState,
    InputStreamAudioMappings,
    OutputStreamAudioMappings,
    InputStreamState,
    OutputStreamState,
    OutputStreamConnection,
    InputStreamInfo,
    OutputStreamInfo,
    GetAvbInfo,
    GetAsPath,
    GetEntityCounters,
    GetAvbInterfaceCounters,
    GetClockDomainCounters,
    GetStreamInputCounters,
    GetStreamOutputCounters,
}

impl fmt::Display for DynamicInfoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AcquiredState => "ACQUIRE_ENTITY",
            Self::LockedState => "LOCK_ENTITY",
            Self::InputStreamAudioMappings => "GET_AUDIO_MAP (STREAM_INPUT)",
            Self::OutputStreamAudioMappings => "GET_AUDIO_MAP (STREAM_OUTPUT)",
            Self::InputStreamState => "GET_RX_STATE",
            Self::OutputStreamState => "GET_TX_STATE",
            Self::OutputStreamConnection => "GET_TX_CONNECTION",
            Self::InputStreamInfo => "GET_STREAM_INFO (STREAM_INPUT)",
            Self::OutputStreamInfo => "GET_STREAM_INFO (STREAM_OUTPUT)",
            Self::GetAvbInfo => "GET_AVB_INFO",
            Self::GetAsPath => "GET_AS_PATH",
            Self::GetEntityCounters => "GET_COUNTERS (ENTITY)",
            Self::GetAvbInterfaceCounters => "GET_COUNTERS (AVB_INTERFACE)",
            Self::GetClockDomainCounters => "GET_COUNTERS (CLOCK_DOMAIN)",
            Self::GetStreamInputCounters => "GET_COUNTERS (STREAM_INPUT)",
            Self::GetStreamOutputCounters => "GET_COUNTERS (STREAM_OUTPUT)",
        };
        f.write_str(name)
    }
}

/// Descriptor-resident dynamic values, queried individually only when
/// the static model was reused from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorDynamicInfoType {
    ConfigurationName,
    AudioUnitName,
    AudioUnitSamplingRate,
    InputStreamName,
    InputStreamFormat,
    OutputStreamName,
    OutputStreamFormat,
    AvbInterfaceName,
    ClockSourceName,
    MemoryObjectName,
    MemoryObjectLength,
    AudioClusterName,
    ControlName,
    ControlValues,
    ClockDomainName,
    ClockDomainSourceIndex,
}

impl fmt::Display for DescriptorDynamicInfoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConfigurationName => "GET_NAME (CONFIGURATION)",
            Self::AudioUnitName => "GET_NAME (AUDIO_UNIT)",
            Self::AudioUnitSamplingRate => "GET_SAMPLING_RATE (AUDIO_UNIT)",
            Self::InputStreamName => "GET_NAME (STREAM_INPUT)",
            Self::InputStreamFormat => "GET_STREAM_FORMAT (STREAM_INPUT)",
            Self::OutputStreamName => "GET_NAME (STREAM_OUTPUT)",
            Self::OutputStreamFormat => "GET_STREAM_FORMAT (STREAM_OUTPUT)",
            Self::AvbInterfaceName => "GET_NAME (AVB_INTERFACE)",
            Self::ClockSourceName => "GET_NAME (CLOCK_SOURCE)",
            Self::MemoryObjectName => "GET_NAME (MEMORY_OBJECT)",
            Self::MemoryObjectLength => "GET_MEMORY_OBJECT_LENGTH",
            Self::AudioClusterName => "GET_NAME (AUDIO_CLUSTER)",
            Self::ControlName => "GET_NAME (CONTROL)",
            Self::ControlValues => "GET_CONTROL",
            Self::ClockDomainName => "GET_NAME (CLOCK_DOMAIN)",
            Self::ClockDomainSourceIndex => "GET_CLOCK_SOURCE",
        };
        f.write_str(name)
    }
}

// ── Expected-response keys ──────────────────────────────────────────
//
// Plain struct keys; the key layout never reaches the public wire or
// dump surface.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorKey {
    pub descriptor_type: DescriptorType,
    pub descriptor_index: DescriptorIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DynamicInfoKey {
    pub info_type: DynamicInfoType,
    pub descriptor_index: DescriptorIndex,
    /// Disambiguates queries issued per sub-resource (e.g. one
    /// GET_TX_CONNECTION per connection index).
    pub sub_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorDynamicInfoKey {
    pub info_type: DescriptorDynamicInfoType,
    pub descriptor_index: DescriptorIndex,
}

// ── Tracker ─────────────────────────────────────────────────────────

/// Retry decision: whether to re-issue the outstanding queries, and
/// after what delay.
pub type RetryTimer = (bool, Duration);

fn next_retry(retry_count: &mut u16) -> RetryTimer {
    if *retry_count < MAX_QUERY_RETRIES {
        *retry_count += 1;
        (true, QUERY_RETRY_DELAY)
    } else {
        (false, Duration::ZERO)
    }
}

/// Bookkeeping for one entity's enumeration: pending steps, per-step
/// expected-response sets, and retry counters.
#[derive(Debug, Default)]
pub(crate) struct EnumerationTracker {
    steps: EnumerationSteps,
    expected_register_unsol: bool,
    expected_milan_info: HashSet<MilanInfoType>,
    expected_descriptors: BTreeMap<ConfigurationIndex, HashSet<DescriptorKey>>,
    expected_dynamic_info: BTreeMap<ConfigurationIndex, HashSet<DynamicInfoKey>>,
    expected_descriptor_dynamic_info: BTreeMap<ConfigurationIndex, HashSet<DescriptorDynamicInfoKey>>,
    register_unsol_retry_count: u16,
    milan_info_retry_count: u16,
    descriptor_retry_count: u16,
    dynamic_info_retry_count: u16,
    descriptor_dynamic_info_retry_count: u16,
}

impl EnumerationTracker {
    // ── Steps ────────────────────────────────────────────────────────

    pub fn steps(&self) -> EnumerationSteps {
        self.steps
    }

    pub fn set_steps(&mut self, steps: EnumerationSteps) {
        debug_assert!(self.steps.is_empty(), "enumeration steps were not empty");
        self.steps = steps;
    }

    pub fn add_step(&mut self, step: EnumerationStep) {
        self.steps.set(step);
    }

    pub fn clear_step(&mut self, step: EnumerationStep) {
        self.steps.reset(step);
    }

    // ── RegisterUnsol ────────────────────────────────────────────────

    pub fn set_register_unsol_expected(&mut self) {
        self.expected_register_unsol = true;
    }

    pub fn check_and_clear_expected_register_unsol(&mut self) -> bool {
        std::mem::take(&mut self.expected_register_unsol)
    }

    pub fn got_expected_register_unsol(&self) -> bool {
        !self.expected_register_unsol
    }

    pub fn register_unsol_retry_timer(&mut self) -> RetryTimer {
        next_retry(&mut self.register_unsol_retry_count)
    }

    // ── Milan info ───────────────────────────────────────────────────

    pub fn set_milan_info_expected(&mut self, info_type: MilanInfoType) {
        self.expected_milan_info.insert(info_type);
    }

    pub fn check_and_clear_expected_milan_info(&mut self, info_type: MilanInfoType) -> bool {
        self.expected_milan_info.remove(&info_type)
    }

    pub fn got_all_expected_milan_info(&self) -> bool {
        self.expected_milan_info.is_empty()
    }

    pub fn query_milan_info_retry_timer(&mut self) -> RetryTimer {
        next_retry(&mut self.milan_info_retry_count)
    }

    // ── Descriptors ──────────────────────────────────────────────────

    pub fn set_descriptor_expected(
        &mut self,
        configuration_index: ConfigurationIndex,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
    ) {
        self.expected_descriptors
            .entry(configuration_index)
            .or_default()
            .insert(DescriptorKey { descriptor_type, descriptor_index });
    }

    pub fn check_and_clear_expected_descriptor(
        &mut self,
        configuration_index: ConfigurationIndex,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
    ) -> bool {
        self.expected_descriptors
            .get_mut(&configuration_index)
            .is_some_and(|set| set.remove(&DescriptorKey { descriptor_type, descriptor_index }))
    }

    pub fn got_all_expected_descriptors(&self) -> bool {
        self.expected_descriptors.values().all(HashSet::is_empty)
    }

    pub fn query_descriptor_retry_timer(&mut self) -> RetryTimer {
        next_retry(&mut self.descriptor_retry_count)
    }

    // ── Dynamic info ─────────────────────────────────────────────────

    pub fn set_dynamic_info_expected(
        &mut self,
        configuration_index: ConfigurationIndex,
        key: DynamicInfoKey,
    ) {
        self.expected_dynamic_info
            .entry(configuration_index)
            .or_default()
            .insert(key);
    }

    pub fn check_and_clear_expected_dynamic_info(
        &mut self,
        configuration_index: ConfigurationIndex,
        key: DynamicInfoKey,
    ) -> bool {
        self.expected_dynamic_info
            .get_mut(&configuration_index)
            .is_some_and(|set| set.remove(&key))
    }

    pub fn got_all_expected_dynamic_info(&self) -> bool {
        self.expected_dynamic_info.values().all(HashSet::is_empty)
    }

    pub fn query_dynamic_info_retry_timer(&mut self) -> RetryTimer {
        next_retry(&mut self.dynamic_info_retry_count)
    }

    // ── Descriptor dynamic info ──────────────────────────────────────

    pub fn set_descriptor_dynamic_info_expected(
        &mut self,
        configuration_index: ConfigurationIndex,
        key: DescriptorDynamicInfoKey,
    ) {
        self.expected_descriptor_dynamic_info
            .entry(configuration_index)
            .or_default()
            .insert(key);
    }

    pub fn check_and_clear_expected_descriptor_dynamic_info(
        &mut self,
        configuration_index: ConfigurationIndex,
        key: DescriptorDynamicInfoKey,
    ) -> bool {
        self.expected_descriptor_dynamic_info
            .get_mut(&configuration_index)
            .is_some_and(|set| set.remove(&key))
    }

    pub fn clear_all_expected_descriptor_dynamic_info(&mut self) {
        self.expected_descriptor_dynamic_info.clear();
    }

    pub fn got_all_expected_descriptor_dynamic_info(&self) -> bool {
        self.expected_descriptor_dynamic_info
            .values()
            .all(HashSet::is_empty)
    }

    pub fn query_descriptor_dynamic_info_retry_timer(&mut self) -> RetryTimer {
        next_retry(&mut self.descriptor_dynamic_info_retry_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_iterate_in_numeric_order() {
        let steps: EnumerationSteps = [
            EnumerationStep::GetDynamicInfo,
            EnumerationStep::GetMilanInfo,
            EnumerationStep::GetStaticModel,
        ]
        .into_iter()
        .collect();

        let ordered: Vec<_> = steps.iter().collect();
        assert_eq!(
            ordered,
            vec![
                EnumerationStep::GetMilanInfo,
                EnumerationStep::GetStaticModel,
                EnumerationStep::GetDynamicInfo,
            ]
        );
    }

    #[test]
    fn expected_descriptor_set_is_idempotent() {
        let mut tracker = EnumerationTracker::default();
        tracker.set_descriptor_expected(0, DescriptorType::StreamInput, 0);
        tracker.set_descriptor_expected(0, DescriptorType::StreamInput, 0);

        assert!(tracker.check_and_clear_expected_descriptor(0, DescriptorType::StreamInput, 0));
        assert!(!tracker.check_and_clear_expected_descriptor(0, DescriptorType::StreamInput, 0));
        assert!(tracker.got_all_expected_descriptors());
    }

    #[test]
    fn unexpected_descriptor_is_not_cleared() {
        let mut tracker = EnumerationTracker::default();
        assert!(!tracker.check_and_clear_expected_descriptor(0, DescriptorType::AudioUnit, 3));
    }

    #[test]
    fn retry_timer_allows_two_retries_then_gives_up() {
        let mut tracker = EnumerationTracker::default();
        assert_eq!(tracker.query_descriptor_retry_timer(), (true, QUERY_RETRY_DELAY));
        assert_eq!(tracker.query_descriptor_retry_timer(), (true, QUERY_RETRY_DELAY));
        assert_eq!(tracker.query_descriptor_retry_timer(), (false, Duration::ZERO));
        assert_eq!(tracker.query_descriptor_retry_timer(), (false, Duration::ZERO));
    }

    #[test]
    fn dynamic_info_keys_distinguish_sub_index() {
        let mut tracker = EnumerationTracker::default();
        let key = |sub_index| DynamicInfoKey {
            info_type: DynamicInfoType::OutputStreamConnection,
            descriptor_index: 1,
            sub_index,
        };
        tracker.set_dynamic_info_expected(0, key(0));
        tracker.set_dynamic_info_expected(0, key(1));

        assert!(tracker.check_and_clear_expected_dynamic_info(0, key(1)));
        assert!(!tracker.got_all_expected_dynamic_info());
        assert!(tracker.check_and_clear_expected_dynamic_info(0, key(0)));
        assert!(tracker.got_all_expected_dynamic_info());
    }

    #[test]
    fn milan_info_expectation_round_trip() {
        let mut tracker = EnumerationTracker::default();
        assert!(tracker.got_all_expected_milan_info());

        tracker.set_milan_info_expected(MilanInfoType::MilanInfo);
        assert!(!tracker.got_all_expected_milan_info());
        assert!(tracker.check_and_clear_expected_milan_info(MilanInfoType::MilanInfo));
        assert!(!tracker.check_and_clear_expected_milan_info(MilanInfoType::MilanInfo));
    }

    #[test]
    fn register_unsol_flag_round_trip() {
        let mut tracker = EnumerationTracker::default();
        assert!(tracker.got_expected_register_unsol());

        tracker.set_register_unsol_expected();
        assert!(!tracker.got_expected_register_unsol());
        assert!(tracker.check_and_clear_expected_register_unsol());
        assert!(!tracker.check_and_clear_expected_register_unsol());
    }
}
