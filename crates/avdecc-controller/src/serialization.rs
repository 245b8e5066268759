// ── Cached-model serialization ──
//
// One JSON document per entity, carrying everything the in-memory
// record holds minus live bookkeeping (enumeration steps, expected
// sets, retry counters). The envelope is versioned; loaders reject
// versions they do not understand. Loading produces a *virtual* entity:
// same model, same state, but not backed by a live device.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use avdecc_model::tree::{
    ConfigurationNodeDynamicModel, ConfigurationNodeStaticModel, ConfigurationTree,
    EntityNodeDynamicModel, EntityNodeStaticModel, EntityTree, Models,
};
use avdecc_model::{
    AvbInterfaceIndex, ConfigurationIndex, ControlIndex, DescriptorIndex, Entity, MilanInfo,
    UniqueIdentifier,
};

use crate::entity::{CompatibilityFlags, ControlledEntity, InterfaceLinkStatus};
use crate::error::{DeserializationError, SerializationError};
use crate::lock::SharedLock;
use crate::ownership::{AcquireState, LockState};

/// Format version of the dump envelope.
pub const DUMP_VERSION: u32 = 1;

// ── Dump shapes ─────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct OwnershipDump {
    acquire_state: AcquireState,
    owning_controller_id: UniqueIdentifier,
    lock_state: LockState,
    locking_controller_id: UniqueIdentifier,
    subscribed_to_unsolicited_notifications: bool,
    identify_control_index: Option<ControlIndex>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatisticsDump {
    aecp_retry_counter: u64,
    aecp_timeout_counter: u64,
    aecp_unexpected_response_counter: u64,
    aecp_response_average_time_ms: u64,
    aem_aecp_unsolicited_counter: u64,
    enumeration_time_ms: u64,
}

/// One descriptor entry: the index made explicit so the per-kind lists
/// stay self-describing.
#[derive(Debug, Serialize, Deserialize)]
struct DescriptorDump<S, D> {
    descriptor_index: DescriptorIndex,
    static_model: S,
    dynamic_model: D,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigurationTreeDump {
    static_model: ConfigurationNodeStaticModel,
    dynamic_model: ConfigurationNodeDynamicModel,
    audio_units: Vec<DescriptorDump<avdecc_model::tree::AudioUnitNodeStaticModel, avdecc_model::tree::AudioUnitNodeDynamicModel>>,
    stream_inputs: Vec<DescriptorDump<avdecc_model::tree::StreamNodeStaticModel, avdecc_model::tree::StreamInputNodeDynamicModel>>,
    stream_outputs: Vec<DescriptorDump<avdecc_model::tree::StreamNodeStaticModel, avdecc_model::tree::StreamOutputNodeDynamicModel>>,
    avb_interfaces: Vec<DescriptorDump<avdecc_model::tree::AvbInterfaceNodeStaticModel, avdecc_model::tree::AvbInterfaceNodeDynamicModel>>,
    clock_sources: Vec<DescriptorDump<avdecc_model::tree::ClockSourceNodeStaticModel, avdecc_model::tree::ClockSourceNodeDynamicModel>>,
    memory_objects: Vec<DescriptorDump<avdecc_model::tree::MemoryObjectNodeStaticModel, avdecc_model::tree::MemoryObjectNodeDynamicModel>>,
    locales: Vec<DescriptorDump<avdecc_model::tree::LocaleNodeStaticModel, avdecc_model::tree::LocaleNodeDynamicModel>>,
    strings: Vec<DescriptorDump<avdecc_model::tree::StringsNodeStaticModel, avdecc_model::tree::StringsNodeDynamicModel>>,
    stream_port_inputs: Vec<DescriptorDump<avdecc_model::tree::StreamPortNodeStaticModel, avdecc_model::tree::StreamPortNodeDynamicModel>>,
    stream_port_outputs: Vec<DescriptorDump<avdecc_model::tree::StreamPortNodeStaticModel, avdecc_model::tree::StreamPortNodeDynamicModel>>,
    audio_clusters: Vec<DescriptorDump<avdecc_model::tree::AudioClusterNodeStaticModel, avdecc_model::tree::AudioClusterNodeDynamicModel>>,
    audio_maps: Vec<DescriptorDump<avdecc_model::tree::AudioMapNodeStaticModel, avdecc_model::tree::AudioMapNodeDynamicModel>>,
    controls: Vec<DescriptorDump<avdecc_model::tree::ControlNodeStaticModel, avdecc_model::tree::ControlNodeDynamicModel>>,
    clock_domains: Vec<DescriptorDump<avdecc_model::tree::ClockDomainNodeStaticModel, avdecc_model::tree::ClockDomainNodeDynamicModel>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntityTreeDump {
    static_model: EntityNodeStaticModel,
    dynamic_model: EntityNodeDynamicModel,
    configurations: BTreeMap<ConfigurationIndex, ConfigurationTreeDump>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntityDump {
    dump_version: u32,
    entity: Entity,
    entity_model_id: UniqueIdentifier,
    compatibility_flags: CompatibilityFlags,
    milan_info: Option<MilanInfo>,
    state: OwnershipDump,
    avb_interface_link_status: BTreeMap<AvbInterfaceIndex, InterfaceLinkStatus>,
    statistics: StatisticsDump,
    entity_tree: Option<EntityTreeDump>,
    is_virtual: bool,
}

// ── Map <-> list conversion ─────────────────────────────────────────

fn dump_models<S: Clone, D: Clone>(
    models: &BTreeMap<DescriptorIndex, Models<S, D>>,
) -> Vec<DescriptorDump<S, D>> {
    models
        .iter()
        .map(|(&descriptor_index, models)| DescriptorDump {
            descriptor_index,
            static_model: models.static_model.clone(),
            dynamic_model: models.dynamic_model.clone(),
        })
        .collect()
}

fn restore_models<S, D>(
    dumps: Vec<DescriptorDump<S, D>>,
) -> BTreeMap<DescriptorIndex, Models<S, D>> {
    dumps
        .into_iter()
        .map(|dump| {
            (
                dump.descriptor_index,
                Models { static_model: dump.static_model, dynamic_model: dump.dynamic_model },
            )
        })
        .collect()
}

fn dump_configuration(tree: &ConfigurationTree) -> ConfigurationTreeDump {
    ConfigurationTreeDump {
        static_model: tree.static_model.clone(),
        dynamic_model: tree.dynamic_model.clone(),
        audio_units: dump_models(&tree.audio_unit_models),
        stream_inputs: dump_models(&tree.stream_input_models),
        stream_outputs: dump_models(&tree.stream_output_models),
        avb_interfaces: dump_models(&tree.avb_interface_models),
        clock_sources: dump_models(&tree.clock_source_models),
        memory_objects: dump_models(&tree.memory_object_models),
        locales: dump_models(&tree.locale_models),
        strings: dump_models(&tree.strings_models),
        stream_port_inputs: dump_models(&tree.stream_port_input_models),
        stream_port_outputs: dump_models(&tree.stream_port_output_models),
        audio_clusters: dump_models(&tree.audio_cluster_models),
        audio_maps: dump_models(&tree.audio_map_models),
        controls: dump_models(&tree.control_models),
        clock_domains: dump_models(&tree.clock_domain_models),
    }
}

fn restore_configuration(dump: ConfigurationTreeDump) -> ConfigurationTree {
    ConfigurationTree {
        static_model: dump.static_model,
        dynamic_model: dump.dynamic_model,
        audio_unit_models: restore_models(dump.audio_units),
        stream_input_models: restore_models(dump.stream_inputs),
        stream_output_models: restore_models(dump.stream_outputs),
        avb_interface_models: restore_models(dump.avb_interfaces),
        clock_source_models: restore_models(dump.clock_sources),
        memory_object_models: restore_models(dump.memory_objects),
        locale_models: restore_models(dump.locales),
        strings_models: restore_models(dump.strings),
        stream_port_input_models: restore_models(dump.stream_port_inputs),
        stream_port_output_models: restore_models(dump.stream_port_outputs),
        audio_cluster_models: restore_models(dump.audio_clusters),
        audio_map_models: restore_models(dump.audio_maps),
        control_models: restore_models(dump.controls),
        clock_domain_models: restore_models(dump.clock_domains),
    }
}

// ── Serialize ───────────────────────────────────────────────────────

/// Produce the JSON dump of one entity. Reads under the caller-held
/// shared lock and retains nothing.
pub fn create_json_dump(entity: &ControlledEntity) -> Result<serde_json::Value, SerializationError> {
    let aem_supported = entity.entity().aem_supported();

    if aem_supported && !entity.has_any_configuration_tree() {
        return Err(SerializationError::NotSupported);
    }

    // The identify control must exist in the model it points into.
    if let Some(control_index) = entity.identify_control_index() {
        if aem_supported
            && entity
                .control_static_model(entity.current_configuration_index(), control_index)
                .is_err()
        {
            return Err(SerializationError::InvalidDescriptorIndex);
        }
    }

    let entity_tree = aem_supported.then(|| {
        let tree = &entity.entity_tree;
        EntityTreeDump {
            static_model: tree.static_model.clone(),
            dynamic_model: tree.dynamic_model.clone(),
            configurations: tree
                .configuration_trees
                .iter()
                .map(|(&index, tree)| (index, dump_configuration(tree)))
                .collect(),
        }
    });

    let statistics = entity.statistics();
    let dump = EntityDump {
        dump_version: DUMP_VERSION,
        entity: entity.entity().clone(),
        entity_model_id: entity.entity().entity_model_id,
        compatibility_flags: entity.compatibility_flags(),
        milan_info: entity.milan_info(),
        state: OwnershipDump {
            acquire_state: entity.acquire_state(),
            owning_controller_id: entity.owning_controller_id(),
            lock_state: entity.lock_state(),
            locking_controller_id: entity.locking_controller_id(),
            subscribed_to_unsolicited_notifications: entity
                .is_subscribed_to_unsolicited_notifications(),
            identify_control_index: entity.identify_control_index(),
        },
        avb_interface_link_status: entity.link_statuses().clone(),
        statistics: StatisticsDump {
            aecp_retry_counter: statistics.aecp_retry_counter(),
            aecp_timeout_counter: statistics.aecp_timeout_counter(),
            aecp_unexpected_response_counter: statistics.aecp_unexpected_response_counter(),
            aecp_response_average_time_ms: statistics.aecp_response_average_time().as_millis()
                as u64,
            aem_aecp_unsolicited_counter: statistics.aem_aecp_unsolicited_counter(),
            enumeration_time_ms: statistics.enumeration_time().as_millis() as u64,
        },
        entity_tree,
        is_virtual: entity.is_virtual(),
    };

    serde_json::to_value(&dump).map_err(|e| SerializationError::Internal(e.to_string()))
}

// ── Deserialize ─────────────────────────────────────────────────────

/// Rebuild an entity from its JSON dump. The result is virtual, fully
/// loaded (model graph built, no pending enumeration steps), and ready
/// to advertise.
pub fn load_from_json(
    value: serde_json::Value,
    shared_lock: Arc<SharedLock>,
) -> Result<ControlledEntity, DeserializationError> {
    let version = value
        .get("dump_version")
        .and_then(serde_json::Value::as_u64)
        .ok_or(DeserializationError::MissingInformation("dump_version"))?;
    if version != u64::from(DUMP_VERSION) {
        return Err(DeserializationError::UnsupportedDumpVersion(version as u32));
    }

    let dump: EntityDump =
        serde_json::from_value(value).map_err(|e| DeserializationError::Parse(e.to_string()))?;

    let mut entity = ControlledEntity::new(dump.entity, shared_lock, true);
    entity.set_compatibility_flags(dump.compatibility_flags);
    if let Some(info) = dump.milan_info {
        entity.set_milan_info(info);
    }

    entity.set_acquire_state(dump.state.acquire_state);
    entity.set_owning_controller(dump.state.owning_controller_id);
    entity.set_lock_state(dump.state.lock_state);
    entity.set_locking_controller(dump.state.locking_controller_id);
    entity.set_subscribed_to_unsolicited_notifications(
        dump.state.subscribed_to_unsolicited_notifications,
    );
    if let Some(index) = dump.state.identify_control_index {
        entity.set_identify_control_index(index);
    }

    for (interface_index, status) in dump.avb_interface_link_status {
        entity.set_avb_interface_link_status(interface_index, status);
    }

    let statistics = entity.statistics_mut();
    statistics.set_aecp_retry_counter(dump.statistics.aecp_retry_counter);
    statistics.set_aecp_timeout_counter(dump.statistics.aecp_timeout_counter);
    statistics
        .set_aecp_unexpected_response_counter(dump.statistics.aecp_unexpected_response_counter);
    statistics.set_aecp_response_average_time(Duration::from_millis(
        dump.statistics.aecp_response_average_time_ms,
    ));
    statistics.set_aem_aecp_unsolicited_counter(dump.statistics.aem_aecp_unsolicited_counter);
    statistics.set_enumeration_time(Duration::from_millis(dump.statistics.enumeration_time_ms));

    if entity.entity().aem_supported() {
        let tree_dump = dump
            .entity_tree
            .ok_or(DeserializationError::MissingInformation("entity_tree"))?;
        entity.set_entity_tree(EntityTree {
            static_model: tree_dump.static_model,
            dynamic_model: tree_dump.dynamic_model,
            configuration_trees: tree_dump
                .configurations
                .into_iter()
                .map(|(index, tree)| (index, restore_configuration(tree)))
                .collect(),
        });
        entity.rebuild_graph();
    }

    entity.set_advertised(true);
    Ok(entity)
}
