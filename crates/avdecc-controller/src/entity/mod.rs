// ── ControlledEntity ──
//
// The in-memory record a controller keeps for one discovered entity:
// the ADP record, the descriptor tree and its derived graph, ownership
// and subscription state, enumeration bookkeeping, and statistics.
//
// The entity itself is passive. All mutation happens through the
// setters below, invoked by the orchestrator on response receipt while
// holding the shared lock; readers take the same lock for the duration
// of their read.

mod accessors;
mod setters;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use avdecc_model::tree::EntityTree;
use avdecc_model::{
    AvbInterfaceIndex, ConfigurationIndex, ControlIndex, DescriptorIndex, DescriptorType, Entity,
    MilanInfo, StreamIndex, UniqueIdentifier,
};

use crate::enumeration::{
    DescriptorDynamicInfoKey, DescriptorDynamicInfoType, DynamicInfoKey, DynamicInfoType,
    EnumerationStep, EnumerationSteps, EnumerationTracker, MilanInfoType, RetryTimer,
};
use crate::graph::{EntityNodeGraph, RedundancyIndex};
use crate::lock::SharedLock;
use crate::ownership::{AcquireState, LockState};
use crate::statistics::Statistics;

/// Which standards the entity has so far behaved consistently with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityFlags {
    pub ieee17221: bool,
    pub milan: bool,
}

impl Default for CompatibilityFlags {
    fn default() -> Self {
        // Every discovered entity starts as plain IEEE 1722.1.
        Self { ieee17221: true, milan: false }
    }
}

/// Link status of one AVB interface, as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceLinkStatus {
    Unknown,
    Up,
    Down,
}

impl Default for InterfaceLinkStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Per-entity model and state, owned by the controller.
#[derive(Debug)]
pub struct ControlledEntity {
    pub(crate) shared_lock: Arc<SharedLock>,
    is_virtual: bool,
    ignore_cached_entity_model: bool,
    identify_control_index: Option<ControlIndex>,
    pub(crate) tracker: EnumerationTracker,
    compatibility_flags: CompatibilityFlags,
    pub(crate) got_fatal_enumeration_error: bool,
    subscribed_to_unsolicited_notifications: bool,
    pub(crate) advertised: bool,
    avb_interface_link_status: BTreeMap<AvbInterfaceIndex, InterfaceLinkStatus>,
    acquire_state: AcquireState,
    owning_controller_id: UniqueIdentifier,
    lock_state: LockState,
    locking_controller_id: UniqueIdentifier,
    milan_info: Option<MilanInfo>,
    pub(crate) entity: Entity,
    pub(crate) entity_tree: EntityTree,
    pub(crate) graph: EntityNodeGraph,
    pub(crate) redundancy: RedundancyIndex,
    statistics: Statistics,
}

impl ControlledEntity {
    /// Create the record for a freshly discovered (or cache-restored)
    /// entity. The tree starts empty; enumeration fills it.
    pub fn new(entity: Entity, shared_lock: Arc<SharedLock>, is_virtual: bool) -> Self {
        Self {
            shared_lock,
            is_virtual,
            ignore_cached_entity_model: false,
            identify_control_index: None,
            tracker: EnumerationTracker::default(),
            compatibility_flags: CompatibilityFlags::default(),
            got_fatal_enumeration_error: false,
            subscribed_to_unsolicited_notifications: false,
            advertised: false,
            avb_interface_link_status: BTreeMap::new(),
            acquire_state: AcquireState::default(),
            owning_controller_id: UniqueIdentifier::NULL,
            lock_state: LockState::default(),
            locking_controller_id: UniqueIdentifier::NULL,
            milan_info: None,
            entity,
            entity_tree: EntityTree::default(),
            graph: EntityNodeGraph::default(),
            redundancy: RedundancyIndex::default(),
            statistics: Statistics::default(),
        }
    }

    // ── Shared lock ──────────────────────────────────────────────────

    pub fn lock(&self) {
        self.shared_lock.lock();
    }

    pub fn unlock(&self) {
        self.shared_lock.unlock();
    }

    /// The lock shared by every entity of the owning controller.
    pub fn shared_lock(&self) -> &Arc<SharedLock> {
        &self.shared_lock
    }

    // ── Identity and global state ────────────────────────────────────

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn compatibility_flags(&self) -> CompatibilityFlags {
        self.compatibility_flags
    }

    pub fn set_compatibility_flags(&mut self, flags: CompatibilityFlags) {
        self.compatibility_flags = flags;
    }

    pub fn got_fatal_enumeration_error(&self) -> bool {
        self.got_fatal_enumeration_error
    }

    /// Terminal: enumeration of this entity is abandoned and it will
    /// never be advertised. Idempotent.
    pub fn set_fatal_enumeration_error(&mut self) {
        if !self.got_fatal_enumeration_error {
            tracing::error!(entity = %self.entity.entity_id, "fatal enumeration error");
        }
        self.got_fatal_enumeration_error = true;
    }

    pub fn is_subscribed_to_unsolicited_notifications(&self) -> bool {
        self.subscribed_to_unsolicited_notifications
    }

    pub fn set_subscribed_to_unsolicited_notifications(&mut self, subscribed: bool) {
        self.subscribed_to_unsolicited_notifications = subscribed;
    }

    pub fn was_advertised(&self) -> bool {
        self.advertised
    }

    pub fn set_advertised(&mut self, advertised: bool) {
        self.advertised = advertised;
    }

    pub fn milan_info(&self) -> Option<MilanInfo> {
        self.milan_info
    }

    pub fn set_milan_info(&mut self, info: MilanInfo) {
        self.milan_info = Some(info);
    }

    pub fn identify_control_index(&self) -> Option<ControlIndex> {
        self.identify_control_index
    }

    pub fn set_identify_control_index(&mut self, index: ControlIndex) {
        self.identify_control_index = Some(index);
    }

    pub fn should_ignore_cached_entity_model(&self) -> bool {
        self.ignore_cached_entity_model
    }

    pub fn set_ignore_cached_entity_model(&mut self) {
        self.ignore_cached_entity_model = true;
    }

    // ── Acquire / lock ownership ─────────────────────────────────────

    pub fn acquire_state(&self) -> AcquireState {
        self.acquire_state
    }

    pub fn set_acquire_state(&mut self, state: AcquireState) {
        self.acquire_state = state;
    }

    /// EID of the controller currently owning this entity; valid when
    /// acquired (by us or another controller).
    pub fn owning_controller_id(&self) -> UniqueIdentifier {
        self.owning_controller_id
    }

    pub fn set_owning_controller(&mut self, controller_id: UniqueIdentifier) {
        self.owning_controller_id = controller_id;
    }

    pub fn is_acquired(&self) -> bool {
        self.acquire_state == AcquireState::Acquired
    }

    pub fn is_acquired_by_other(&self) -> bool {
        self.acquire_state == AcquireState::AcquiredByOther
    }

    pub fn is_acquire_command_in_progress(&self) -> bool {
        matches!(
            self.acquire_state,
            AcquireState::AcquireInProgress | AcquireState::ReleaseInProgress
        )
    }

    pub fn lock_state(&self) -> LockState {
        self.lock_state
    }

    pub fn set_lock_state(&mut self, state: LockState) {
        self.lock_state = state;
    }

    pub fn locking_controller_id(&self) -> UniqueIdentifier {
        self.locking_controller_id
    }

    pub fn set_locking_controller(&mut self, controller_id: UniqueIdentifier) {
        self.locking_controller_id = controller_id;
    }

    pub fn is_locked(&self) -> bool {
        self.lock_state == LockState::Locked
    }

    pub fn is_locked_by_other(&self) -> bool {
        self.lock_state == LockState::LockedByOther
    }

    pub fn is_lock_command_in_progress(&self) -> bool {
        matches!(
            self.lock_state,
            LockState::LockInProgress | LockState::UnlockInProgress
        )
    }

    // ── Link status ──────────────────────────────────────────────────

    pub fn avb_interface_link_status(
        &self,
        avb_interface_index: AvbInterfaceIndex,
    ) -> InterfaceLinkStatus {
        if !self.entity.aem_supported() {
            return InterfaceLinkStatus::Unknown;
        }
        self.avb_interface_link_status
            .get(&avb_interface_index)
            .copied()
            .unwrap_or(InterfaceLinkStatus::Unknown)
    }

    /// Record a new link status; returns the previous one.
    pub fn set_avb_interface_link_status(
        &mut self,
        avb_interface_index: AvbInterfaceIndex,
        status: InterfaceLinkStatus,
    ) -> InterfaceLinkStatus {
        self.avb_interface_link_status
            .insert(avb_interface_index, status)
            .unwrap_or(InterfaceLinkStatus::Unknown)
    }

    pub(crate) fn link_statuses(&self) -> &BTreeMap<AvbInterfaceIndex, InterfaceLinkStatus> {
        &self.avb_interface_link_status
    }

    // ── Statistics ───────────────────────────────────────────────────

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.statistics
    }

    // ── Enumeration steps ────────────────────────────────────────────

    pub fn enumeration_steps(&self) -> EnumerationSteps {
        self.tracker.steps()
    }

    pub fn set_enumeration_steps(&mut self, steps: EnumerationSteps) {
        self.tracker.set_steps(steps);
    }

    pub fn add_enumeration_step(&mut self, step: EnumerationStep) {
        self.tracker.add_step(step);
    }

    pub fn clear_enumeration_step(&mut self, step: EnumerationStep) {
        self.tracker.clear_step(step);
    }

    // ── Expected responses ───────────────────────────────────────────
    //
    // The check-and-clear calls answer false once a fatal enumeration
    // error is latched: late responses must not advance the machine.

    pub fn set_register_unsol_expected(&mut self) {
        self.tracker.set_register_unsol_expected();
    }

    pub fn check_and_clear_expected_register_unsol(&mut self) -> bool {
        if self.got_fatal_enumeration_error {
            return false;
        }
        self.tracker.check_and_clear_expected_register_unsol()
    }

    pub fn got_expected_register_unsol(&self) -> bool {
        self.tracker.got_expected_register_unsol()
    }

    pub fn register_unsol_retry_timer(&mut self) -> RetryTimer {
        self.tracker.register_unsol_retry_timer()
    }

    pub fn set_milan_info_expected(&mut self, info_type: MilanInfoType) {
        self.tracker.set_milan_info_expected(info_type);
    }

    pub fn check_and_clear_expected_milan_info(&mut self, info_type: MilanInfoType) -> bool {
        if self.got_fatal_enumeration_error {
            return false;
        }
        self.tracker.check_and_clear_expected_milan_info(info_type)
    }

    pub fn got_all_expected_milan_info(&self) -> bool {
        self.tracker.got_all_expected_milan_info()
    }

    pub fn query_milan_info_retry_timer(&mut self) -> RetryTimer {
        self.tracker.query_milan_info_retry_timer()
    }

    pub fn set_descriptor_expected(
        &mut self,
        configuration_index: ConfigurationIndex,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
    ) {
        self.tracker
            .set_descriptor_expected(configuration_index, descriptor_type, descriptor_index);
    }

    pub fn check_and_clear_expected_descriptor(
        &mut self,
        configuration_index: ConfigurationIndex,
        descriptor_type: DescriptorType,
        descriptor_index: DescriptorIndex,
    ) -> bool {
        if self.got_fatal_enumeration_error {
            return false;
        }
        self.tracker
            .check_and_clear_expected_descriptor(configuration_index, descriptor_type, descriptor_index)
    }

    pub fn got_all_expected_descriptors(&self) -> bool {
        self.tracker.got_all_expected_descriptors()
    }

    pub fn query_descriptor_retry_timer(&mut self) -> RetryTimer {
        self.tracker.query_descriptor_retry_timer()
    }

    pub fn set_dynamic_info_expected(
        &mut self,
        configuration_index: ConfigurationIndex,
        info_type: DynamicInfoType,
        descriptor_index: DescriptorIndex,
        sub_index: u16,
    ) {
        self.tracker.set_dynamic_info_expected(
            configuration_index,
            DynamicInfoKey { info_type, descriptor_index, sub_index },
        );
    }

    pub fn check_and_clear_expected_dynamic_info(
        &mut self,
        configuration_index: ConfigurationIndex,
        info_type: DynamicInfoType,
        descriptor_index: DescriptorIndex,
        sub_index: u16,
    ) -> bool {
        if self.got_fatal_enumeration_error {
            return false;
        }
        self.tracker.check_and_clear_expected_dynamic_info(
            configuration_index,
            DynamicInfoKey { info_type, descriptor_index, sub_index },
        )
    }

    pub fn got_all_expected_dynamic_info(&self) -> bool {
        self.tracker.got_all_expected_dynamic_info()
    }

    pub fn query_dynamic_info_retry_timer(&mut self) -> RetryTimer {
        self.tracker.query_dynamic_info_retry_timer()
    }

    pub fn set_descriptor_dynamic_info_expected(
        &mut self,
        configuration_index: ConfigurationIndex,
        info_type: DescriptorDynamicInfoType,
        descriptor_index: DescriptorIndex,
    ) {
        self.tracker.set_descriptor_dynamic_info_expected(
            configuration_index,
            DescriptorDynamicInfoKey { info_type, descriptor_index },
        );
    }

    pub fn check_and_clear_expected_descriptor_dynamic_info(
        &mut self,
        configuration_index: ConfigurationIndex,
        info_type: DescriptorDynamicInfoType,
        descriptor_index: DescriptorIndex,
    ) -> bool {
        if self.got_fatal_enumeration_error {
            return false;
        }
        self.tracker.check_and_clear_expected_descriptor_dynamic_info(
            configuration_index,
            DescriptorDynamicInfoKey { info_type, descriptor_index },
        )
    }

    pub fn clear_all_expected_descriptor_dynamic_info(&mut self) {
        self.tracker.clear_all_expected_descriptor_dynamic_info();
    }

    pub fn got_all_expected_descriptor_dynamic_info(&self) -> bool {
        self.tracker.got_all_expected_descriptor_dynamic_info()
    }

    pub fn query_descriptor_dynamic_info_retry_timer(&mut self) -> RetryTimer {
        self.tracker.query_descriptor_dynamic_info_retry_timer()
    }

    // ── Redundancy ───────────────────────────────────────────────────

    /// True for the primary stream of a redundant input pair; false for
    /// secondaries and non-redundant streams.
    pub fn is_redundant_primary_stream_input(&self, stream_index: StreamIndex) -> bool {
        self.redundancy.primary_stream_inputs.contains(&stream_index)
    }

    pub fn is_redundant_primary_stream_output(&self, stream_index: StreamIndex) -> bool {
        self.redundancy.primary_stream_outputs.contains(&stream_index)
    }

    pub fn is_redundant_secondary_stream_input(&self, stream_index: StreamIndex) -> bool {
        self.redundancy.secondary_stream_inputs.contains(&stream_index)
    }

    pub fn is_redundant_secondary_stream_output(&self, stream_index: StreamIndex) -> bool {
        self.redundancy.secondary_stream_outputs.contains(&stream_index)
    }

    // ── Caching ──────────────────────────────────────────────────────

    /// True iff the tree is worth caching: fully enumerated, complete
    /// for every configuration, and not itself restored from a cache.
    pub fn is_entity_model_valid_for_caching(&self) -> bool {
        if self.got_fatal_enumeration_error
            || self.is_virtual
            || self.entity_tree.configuration_trees.is_empty()
        {
            return false;
        }
        self.entity_tree
            .is_complete(self.entity_tree.configuration_trees.len() as u16)
    }

    // ── Load completion ──────────────────────────────────────────────

    /// Called once every enumeration step has drained: stamps the
    /// enumeration time and derives the model graph and redundancy
    /// classification. The orchestrator advertises the entity afterwards.
    pub fn on_entity_fully_loaded(&mut self) {
        self.statistics.set_end_enumeration_time(Instant::now());

        if self.entity.aem_supported() {
            self.rebuild_graph();
        }
    }

    pub(crate) fn rebuild_graph(&mut self) {
        let (graph, redundancy) =
            EntityNodeGraph::build(self.entity.entity_id, &self.entity_tree);
        self.graph = graph;
        self.redundancy = redundancy;
    }
}
