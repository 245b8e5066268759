// ── Write surface ──
//
// Invoked by the orchestrator on response receipt, under the shared
// lock. Descriptor setters default-construct their node when absent and
// follow the merge policy: static fields overwrite unconditionally,
// dynamic fields overwrite only where the wire descriptor is
// authoritative (initial current values); dynamic state populated by
// targeted queries is never touched here.

use avdecc_model::descriptor::*;
use avdecc_model::tree::*;
use avdecc_model::{
    AsPath, AudioMappings, AudioUnitIndex, AvbInterfaceIndex, AvbInterfaceInfo, AvdeccString,
    ClockDomainIndex, ClockSourceIndex, ClusterIndex, ConfigurationIndex, ControlIndex,
    ControlValues, DescriptorType, Entity, LocaleIndex, MapIndex, MemoryObjectIndex, SamplingRate,
    StreamIdentification, StreamIndex, StreamInputConnectionInfo, StreamPortIndex, StringsIndex,
};
use avdecc_model::{
    AvbInterfaceCounters, ClockDomainCounters, EntityCounters, StreamInputCounters,
    StreamOutputCounters,
};

use crate::entity::ControlledEntity;

/// Generates the get-or-create mutable model lookup for one descriptor
/// kind.
macro_rules! models_mut {
    ($fn_name:ident, $field:ident, $index:ty, $s:ty, $d:ty) => {
        fn $fn_name(
            &mut self,
            configuration_index: ConfigurationIndex,
            index: $index,
        ) -> &mut Models<$s, $d> {
            self.config_tree_mut(configuration_index)
                .$field
                .entry(index)
                .or_default()
        }
    };
}

impl ControlledEntity {
    fn config_tree_mut(
        &mut self,
        configuration_index: ConfigurationIndex,
    ) -> &mut ConfigurationTree {
        self.entity_tree
            .configuration_trees
            .entry(configuration_index)
            .or_default()
    }

    models_mut!(audio_unit_models_mut, audio_unit_models, AudioUnitIndex,
        AudioUnitNodeStaticModel, AudioUnitNodeDynamicModel);
    models_mut!(stream_input_models_mut, stream_input_models, StreamIndex,
        StreamNodeStaticModel, StreamInputNodeDynamicModel);
    models_mut!(stream_output_models_mut, stream_output_models, StreamIndex,
        StreamNodeStaticModel, StreamOutputNodeDynamicModel);
    models_mut!(avb_interface_models_mut, avb_interface_models, AvbInterfaceIndex,
        AvbInterfaceNodeStaticModel, AvbInterfaceNodeDynamicModel);
    models_mut!(clock_source_models_mut, clock_source_models, ClockSourceIndex,
        ClockSourceNodeStaticModel, ClockSourceNodeDynamicModel);
    models_mut!(memory_object_models_mut, memory_object_models, MemoryObjectIndex,
        MemoryObjectNodeStaticModel, MemoryObjectNodeDynamicModel);
    models_mut!(locale_models_mut, locale_models, LocaleIndex,
        LocaleNodeStaticModel, LocaleNodeDynamicModel);
    models_mut!(strings_models_mut, strings_models, StringsIndex,
        StringsNodeStaticModel, StringsNodeDynamicModel);
    models_mut!(stream_port_input_models_mut, stream_port_input_models, StreamPortIndex,
        StreamPortNodeStaticModel, StreamPortNodeDynamicModel);
    models_mut!(stream_port_output_models_mut, stream_port_output_models, StreamPortIndex,
        StreamPortNodeStaticModel, StreamPortNodeDynamicModel);
    models_mut!(audio_cluster_models_mut, audio_cluster_models, ClusterIndex,
        AudioClusterNodeStaticModel, AudioClusterNodeDynamicModel);
    models_mut!(audio_map_models_mut, audio_map_models, MapIndex,
        AudioMapNodeStaticModel, AudioMapNodeDynamicModel);
    models_mut!(control_models_mut, control_models, ControlIndex,
        ControlNodeStaticModel, ControlNodeDynamicModel);
    models_mut!(clock_domain_models_mut, clock_domain_models, ClockDomainIndex,
        ClockDomainNodeStaticModel, ClockDomainNodeDynamicModel);

    // ── Global state ─────────────────────────────────────────────────

    /// Refresh the ADP record (available-index bumps, capability
    /// changes).
    pub fn set_entity(&mut self, entity: Entity) {
        self.entity = entity;
    }

    // ── Whole-tree setters ───────────────────────────────────────────

    /// Replace the whole tree in one step (dump loading).
    pub fn set_entity_tree(&mut self, entity_tree: EntityTree) {
        self.entity_tree = entity_tree;
    }

    /// Adopt a cached tree for this entity. Accepted iff the live
    /// EntityDescriptor matches the model the tree was cached under and
    /// the cached tree is complete for the required configurations; on
    /// acceptance the live descriptor's entity-specific fields replace
    /// the cached ones.
    pub fn set_cached_entity_tree(
        &mut self,
        cached_tree: EntityTree,
        descriptor: &EntityDescriptor,
        for_all_configurations: bool,
    ) -> bool {
        if descriptor.entity_model_id != self.entity.entity_model_id {
            tracing::warn!(
                entity = %self.entity.entity_id,
                advertised = %self.entity.entity_model_id,
                descriptor = %descriptor.entity_model_id,
                "entity model id in EntityDescriptor does not match the advertised one, not using cached model"
            );
            return false;
        }

        let cached_static = &cached_tree.static_model;
        if cached_static.vendor_name_string != descriptor.vendor_name_string
            || cached_static.model_name_string != descriptor.model_name_string
        {
            tracing::warn!(
                entity = %self.entity.entity_id,
                "cached model has inconsistent EntityDescriptor strings, not using cached model"
            );
            return false;
        }

        let complete = if for_all_configurations {
            cached_tree.is_complete(descriptor.configurations_count)
        } else {
            cached_tree
                .configuration_trees
                .get(&descriptor.current_configuration)
                .is_some_and(ConfigurationTree::is_complete)
        };
        if !complete {
            tracing::warn!(
                entity = %self.entity.entity_id,
                configuration = descriptor.current_configuration,
                "cached model does not provide a complete tree, not using cached model"
            );
            return false;
        }

        // The static information matches; nothing more can be verified,
        // so adopt the model and overlay this entity's own fields.
        self.entity_tree = cached_tree;
        self.set_entity_descriptor(descriptor);
        true
    }

    // ── Descriptor setters ───────────────────────────────────────────

    pub fn set_entity_descriptor(&mut self, descriptor: &EntityDescriptor) {
        if self.advertised {
            // The EntityDescriptor must only ever be set while
            // enumerating; a second one indicates a misbehaving entity.
            tracing::error!(
                entity = %self.entity.entity_id,
                "EntityDescriptor set twice, discarding model"
            );
            self.entity_tree = EntityTree::default();
            self.graph = Default::default();
            self.redundancy = Default::default();
            self.set_fatal_enumeration_error();
            return;
        }

        let static_model = &mut self.entity_tree.static_model;
        static_model.vendor_name_string = descriptor.vendor_name_string;
        static_model.model_name_string = descriptor.model_name_string;

        let dynamic_model = &mut self.entity_tree.dynamic_model;
        dynamic_model.firmware_version = descriptor.firmware_version.clone();
        dynamic_model.serial_number = descriptor.serial_number.clone();
        dynamic_model.entity_name = descriptor.entity_name.clone();
        dynamic_model.group_name = descriptor.group_name.clone();
        dynamic_model.current_configuration = descriptor.current_configuration;
    }

    pub fn set_configuration_descriptor(
        &mut self,
        descriptor: &ConfigurationDescriptor,
        configuration_index: ConfigurationIndex,
    ) {
        let current_configuration = self.entity_tree.dynamic_model.current_configuration;
        let tree = self.config_tree_mut(configuration_index);

        tree.static_model.localized_description = descriptor.localized_description;
        tree.static_model.descriptor_counts = descriptor.descriptor_counts.clone();

        tree.dynamic_model.is_active_configuration =
            configuration_index == current_configuration;
        tree.dynamic_model.object_name = descriptor.object_name.clone();
    }

    pub fn set_audio_unit_descriptor(
        &mut self,
        descriptor: &AudioUnitDescriptor,
        configuration_index: ConfigurationIndex,
        audio_unit_index: AudioUnitIndex,
    ) {
        let models = self.audio_unit_models_mut(configuration_index, audio_unit_index);

        let s = &mut models.static_model;
        s.localized_description = descriptor.localized_description;
        s.clock_domain_index = descriptor.clock_domain_index;
        s.number_of_stream_input_ports = descriptor.number_of_stream_input_ports;
        s.base_stream_input_port = descriptor.base_stream_input_port;
        s.number_of_stream_output_ports = descriptor.number_of_stream_output_ports;
        s.base_stream_output_port = descriptor.base_stream_output_port;
        s.number_of_controls = descriptor.number_of_controls;
        s.base_control = descriptor.base_control;
        s.sampling_rates = descriptor.sampling_rates.clone();

        let d = &mut models.dynamic_model;
        d.object_name = descriptor.object_name.clone();
        d.current_sampling_rate = descriptor.current_sampling_rate;
    }

    pub fn set_stream_input_descriptor(
        &mut self,
        descriptor: &StreamDescriptor,
        configuration_index: ConfigurationIndex,
        stream_index: StreamIndex,
    ) {
        let models = self.stream_input_models_mut(configuration_index, stream_index);
        copy_stream_static(&mut models.static_model, descriptor);

        let d = &mut models.dynamic_model;
        d.object_name = descriptor.object_name.clone();
        d.stream_format = descriptor.current_format;
    }

    pub fn set_stream_output_descriptor(
        &mut self,
        descriptor: &StreamDescriptor,
        configuration_index: ConfigurationIndex,
        stream_index: StreamIndex,
    ) {
        let models = self.stream_output_models_mut(configuration_index, stream_index);
        copy_stream_static(&mut models.static_model, descriptor);

        let d = &mut models.dynamic_model;
        d.object_name = descriptor.object_name.clone();
        d.stream_format = descriptor.current_format;
    }

    pub fn set_avb_interface_descriptor(
        &mut self,
        descriptor: &AvbInterfaceDescriptor,
        configuration_index: ConfigurationIndex,
        interface_index: AvbInterfaceIndex,
    ) {
        let models = self.avb_interface_models_mut(configuration_index, interface_index);

        let s = &mut models.static_model;
        s.localized_description = descriptor.localized_description;
        s.mac_address = descriptor.mac_address;
        s.interface_flags = descriptor.interface_flags;
        s.clock_identity = descriptor.clock_identity;
        s.priority1 = descriptor.priority1;
        s.clock_class = descriptor.clock_class;
        s.offset_scaled_log_variance = descriptor.offset_scaled_log_variance;
        s.clock_accuracy = descriptor.clock_accuracy;
        s.priority2 = descriptor.priority2;
        s.domain_number = descriptor.domain_number;
        s.log_sync_interval = descriptor.log_sync_interval;
        s.log_announce_interval = descriptor.log_announce_interval;
        s.log_pdelay_interval = descriptor.log_pdelay_interval;
        s.port_number = descriptor.port_number;

        models.dynamic_model.object_name = descriptor.object_name.clone();
    }

    pub fn set_clock_source_descriptor(
        &mut self,
        descriptor: &ClockSourceDescriptor,
        configuration_index: ConfigurationIndex,
        clock_source_index: ClockSourceIndex,
    ) {
        let models = self.clock_source_models_mut(configuration_index, clock_source_index);

        let s = &mut models.static_model;
        s.localized_description = descriptor.localized_description;
        s.clock_source_type = descriptor.clock_source_type;
        s.clock_source_location_type = descriptor.clock_source_location_type;
        s.clock_source_location_index = descriptor.clock_source_location_index;

        let d = &mut models.dynamic_model;
        d.clock_source_flags = descriptor.clock_source_flags;
        d.clock_source_identifier = descriptor.clock_source_identifier;
        d.object_name = descriptor.object_name.clone();
    }

    pub fn set_memory_object_descriptor(
        &mut self,
        descriptor: &MemoryObjectDescriptor,
        configuration_index: ConfigurationIndex,
        memory_object_index: MemoryObjectIndex,
    ) {
        let models = self.memory_object_models_mut(configuration_index, memory_object_index);

        let s = &mut models.static_model;
        s.localized_description = descriptor.localized_description;
        s.memory_object_type = descriptor.memory_object_type;
        s.target_descriptor_type = descriptor.target_descriptor_type;
        s.target_descriptor_index = descriptor.target_descriptor_index;
        s.start_address = descriptor.start_address;
        s.maximum_length = descriptor.maximum_length;

        let d = &mut models.dynamic_model;
        d.object_name = descriptor.object_name.clone();
        d.length = descriptor.length;
    }

    pub fn set_locale_descriptor(
        &mut self,
        descriptor: &LocaleDescriptor,
        configuration_index: ConfigurationIndex,
        locale_index: LocaleIndex,
    ) {
        let models = self.locale_models_mut(configuration_index, locale_index);

        let s = &mut models.static_model;
        s.locale_id = descriptor.locale_id.clone();
        s.number_of_string_descriptors = descriptor.number_of_string_descriptors;
        s.base_string_descriptor_index = descriptor.base_string_descriptor_index;
    }

    pub fn set_strings_descriptor(
        &mut self,
        descriptor: &StringsDescriptor,
        configuration_index: ConfigurationIndex,
        strings_index: StringsIndex,
    ) {
        let models = self.strings_models_mut(configuration_index, strings_index);
        models.static_model.strings = descriptor.strings.clone();

        // Feed the resolved-strings store when this descriptor belongs
        // to the selected locale.
        let dynamic_model = &self.config_tree_mut(configuration_index).dynamic_model;
        let base = dynamic_model.selected_locale_base_index;
        let count = dynamic_model.selected_locale_count;
        if count > 0 && strings_index >= base && strings_index < base + count {
            self.set_localized_strings(
                configuration_index,
                strings_index - base,
                descriptor.strings.clone(),
            );
        }
    }

    /// Store the strings of one strings descriptor of the selected
    /// locale, keyed by its absolute index (`base + relative`).
    pub fn set_localized_strings(
        &mut self,
        configuration_index: ConfigurationIndex,
        relative_strings_index: StringsIndex,
        strings: Vec<AvdeccString>,
    ) {
        let dynamic_model = &mut self.config_tree_mut(configuration_index).dynamic_model;
        let absolute_index = dynamic_model.selected_locale_base_index + relative_strings_index;
        dynamic_model.localized_strings.insert(absolute_index, strings);
    }

    pub fn set_stream_port_input_descriptor(
        &mut self,
        descriptor: &StreamPortDescriptor,
        configuration_index: ConfigurationIndex,
        stream_port_index: StreamPortIndex,
    ) {
        let models = self.stream_port_input_models_mut(configuration_index, stream_port_index);
        copy_stream_port_static(&mut models.static_model, descriptor);
    }

    pub fn set_stream_port_output_descriptor(
        &mut self,
        descriptor: &StreamPortDescriptor,
        configuration_index: ConfigurationIndex,
        stream_port_index: StreamPortIndex,
    ) {
        let models = self.stream_port_output_models_mut(configuration_index, stream_port_index);
        copy_stream_port_static(&mut models.static_model, descriptor);
    }

    pub fn set_audio_cluster_descriptor(
        &mut self,
        descriptor: &AudioClusterDescriptor,
        configuration_index: ConfigurationIndex,
        cluster_index: ClusterIndex,
    ) {
        let models = self.audio_cluster_models_mut(configuration_index, cluster_index);

        let s = &mut models.static_model;
        s.localized_description = descriptor.localized_description;
        s.signal_type = descriptor.signal_type;
        s.signal_index = descriptor.signal_index;
        s.signal_output = descriptor.signal_output;
        s.path_latency = descriptor.path_latency;
        s.block_latency = descriptor.block_latency;
        s.channel_count = descriptor.channel_count;
        s.format = descriptor.format;

        models.dynamic_model.object_name = descriptor.object_name.clone();
    }

    pub fn set_audio_map_descriptor(
        &mut self,
        descriptor: &AudioMapDescriptor,
        configuration_index: ConfigurationIndex,
        map_index: MapIndex,
    ) {
        let models = self.audio_map_models_mut(configuration_index, map_index);
        models.static_model.mappings = descriptor.mappings.clone();
    }

    pub fn set_control_descriptor(
        &mut self,
        descriptor: &ControlDescriptor,
        configuration_index: ConfigurationIndex,
        control_index: ControlIndex,
    ) {
        let models = self.control_models_mut(configuration_index, control_index);

        let s = &mut models.static_model;
        s.localized_description = descriptor.localized_description;
        s.block_latency = descriptor.block_latency;
        s.control_latency = descriptor.control_latency;
        s.control_domain = descriptor.control_domain;
        s.control_type = descriptor.control_type;
        s.reset_time = descriptor.reset_time;
        s.signal_type = descriptor.signal_type;
        s.signal_index = descriptor.signal_index;
        s.signal_output = descriptor.signal_output;
        s.control_value_type = descriptor.control_value_type;
        s.values = descriptor.values_static.clone();

        let d = &mut models.dynamic_model;
        d.object_name = descriptor.object_name.clone();
        d.values = descriptor.values_dynamic.clone();
    }

    pub fn set_clock_domain_descriptor(
        &mut self,
        descriptor: &ClockDomainDescriptor,
        configuration_index: ConfigurationIndex,
        clock_domain_index: ClockDomainIndex,
    ) {
        let models = self.clock_domain_models_mut(configuration_index, clock_domain_index);

        let s = &mut models.static_model;
        s.localized_description = descriptor.localized_description;
        s.clock_sources = descriptor.clock_sources.clone();

        let d = &mut models.dynamic_model;
        d.object_name = descriptor.object_name.clone();
        d.clock_source_index = descriptor.clock_source_index;
    }

    // ── Dynamic-state setters ────────────────────────────────────────

    pub fn set_entity_name(&mut self, name: AvdeccString) {
        self.entity_tree.dynamic_model.entity_name = name;
    }

    pub fn set_entity_group_name(&mut self, name: AvdeccString) {
        self.entity_tree.dynamic_model.group_name = name;
    }

    pub fn set_current_configuration(&mut self, configuration_index: ConfigurationIndex) {
        self.entity_tree.dynamic_model.current_configuration = configuration_index;
        for (&index, tree) in &mut self.entity_tree.configuration_trees {
            tree.dynamic_model.is_active_configuration = index == configuration_index;
        }
    }

    pub fn set_configuration_name(
        &mut self,
        configuration_index: ConfigurationIndex,
        name: AvdeccString,
    ) {
        self.config_tree_mut(configuration_index).dynamic_model.object_name = name;
    }

    /// GET_NAME result for a named descriptor kind. Kinds without an
    /// object name are ignored with a diagnostic.
    pub fn set_object_name(
        &mut self,
        configuration_index: ConfigurationIndex,
        descriptor_type: DescriptorType,
        index: avdecc_model::DescriptorIndex,
        name: AvdeccString,
    ) {
        use DescriptorType as T;
        match descriptor_type {
            T::Configuration => self.set_configuration_name(configuration_index, name),
            T::AudioUnit => {
                self.audio_unit_models_mut(configuration_index, index).dynamic_model.object_name =
                    name;
            }
            T::StreamInput => {
                self.stream_input_models_mut(configuration_index, index).dynamic_model.object_name =
                    name;
            }
            T::StreamOutput => {
                self.stream_output_models_mut(configuration_index, index)
                    .dynamic_model
                    .object_name = name;
            }
            T::AvbInterface => {
                self.avb_interface_models_mut(configuration_index, index)
                    .dynamic_model
                    .object_name = name;
            }
            T::ClockSource => {
                self.clock_source_models_mut(configuration_index, index)
                    .dynamic_model
                    .object_name = name;
            }
            T::MemoryObject => {
                self.memory_object_models_mut(configuration_index, index)
                    .dynamic_model
                    .object_name = name;
            }
            T::AudioCluster => {
                self.audio_cluster_models_mut(configuration_index, index)
                    .dynamic_model
                    .object_name = name;
            }
            T::Control => {
                self.control_models_mut(configuration_index, index).dynamic_model.object_name =
                    name;
            }
            T::ClockDomain => {
                self.clock_domain_models_mut(configuration_index, index)
                    .dynamic_model
                    .object_name = name;
            }
            other => {
                tracing::warn!(
                    entity = %self.entity.entity_id,
                    descriptor = ?other,
                    "GET_NAME for a descriptor kind without an object name"
                );
            }
        }
    }

    /// GET_SAMPLING_RATE result; current configuration.
    pub fn set_sampling_rate(&mut self, audio_unit_index: AudioUnitIndex, rate: SamplingRate) {
        let configuration_index = self.current_configuration_index();
        self.audio_unit_models_mut(configuration_index, audio_unit_index)
            .dynamic_model
            .current_sampling_rate = rate;
    }

    /// Record a sink connection change; returns the previous state.
    pub fn set_stream_input_connection_information(
        &mut self,
        stream_index: StreamIndex,
        info: StreamInputConnectionInfo,
    ) -> StreamInputConnectionInfo {
        let configuration_index = self.current_configuration_index();
        let dynamic_model =
            &mut self.stream_input_models_mut(configuration_index, stream_index).dynamic_model;
        std::mem::replace(&mut dynamic_model.connection_info, info)
    }

    pub fn clear_stream_output_connections(&mut self, stream_index: StreamIndex) {
        let configuration_index = self.current_configuration_index();
        self.stream_output_models_mut(configuration_index, stream_index)
            .dynamic_model
            .connections
            .clear();
    }

    /// Returns true when the listener was not already recorded.
    pub fn add_stream_output_connection(
        &mut self,
        stream_index: StreamIndex,
        listener_stream: StreamIdentification,
    ) -> bool {
        let configuration_index = self.current_configuration_index();
        self.stream_output_models_mut(configuration_index, stream_index)
            .dynamic_model
            .connections
            .insert(listener_stream)
    }

    /// Returns true when the listener was present and removed.
    pub fn del_stream_output_connection(
        &mut self,
        stream_index: StreamIndex,
        listener_stream: &StreamIdentification,
    ) -> bool {
        let configuration_index = self.current_configuration_index();
        self.stream_output_models_mut(configuration_index, stream_index)
            .dynamic_model
            .connections
            .remove(listener_stream)
    }

    /// GET_AVB_INFO result; returns the previous info.
    pub fn set_avb_interface_info(
        &mut self,
        avb_interface_index: AvbInterfaceIndex,
        info: AvbInterfaceInfo,
    ) -> AvbInterfaceInfo {
        let configuration_index = self.current_configuration_index();
        let dynamic_model = &mut self
            .avb_interface_models_mut(configuration_index, avb_interface_index)
            .dynamic_model;
        dynamic_model.avb_interface_info.replace(info).unwrap_or_default()
    }

    /// GET_AS_PATH result; returns the previous path.
    pub fn set_as_path(&mut self, avb_interface_index: AvbInterfaceIndex, as_path: AsPath) -> AsPath {
        let configuration_index = self.current_configuration_index();
        let dynamic_model = &mut self
            .avb_interface_models_mut(configuration_index, avb_interface_index)
            .dynamic_model;
        dynamic_model.as_path.replace(as_path).unwrap_or_default()
    }

    /// Record which strings descriptors the selected locale covers.
    pub fn set_selected_locale_strings_indexes_range(
        &mut self,
        configuration_index: ConfigurationIndex,
        base_index: StringsIndex,
        count: StringsIndex,
    ) {
        let dynamic_model = &mut self.config_tree_mut(configuration_index).dynamic_model;
        dynamic_model.selected_locale_base_index = base_index;
        dynamic_model.selected_locale_count = count;
    }

    // ── Dynamic audio mappings ───────────────────────────────────────

    pub fn clear_stream_port_input_audio_mappings(&mut self, stream_port_index: StreamPortIndex) {
        let configuration_index = self.current_configuration_index();
        self.stream_port_input_models_mut(configuration_index, stream_port_index)
            .dynamic_model
            .dynamic_audio_map
            .clear();
    }

    pub fn add_stream_port_input_audio_mappings(
        &mut self,
        stream_port_index: StreamPortIndex,
        mappings: AudioMappings,
    ) {
        let entity_id = self.entity.entity_id;
        let configuration_index = self.current_configuration_index();
        let dynamic_map = &mut self
            .stream_port_input_models_mut(configuration_index, stream_port_index)
            .dynamic_model
            .dynamic_audio_map;

        for mapping in mappings {
            // A cluster slot normally carries a single source; the one
            // allowed exception is the redundant pair (same stream
            // channel on a different stream).
            let existing = dynamic_map.iter_mut().find(|m| {
                m.cluster_offset == mapping.cluster_offset
                    && m.cluster_channel == mapping.cluster_channel
            });
            match existing {
                None => dynamic_map.push(mapping),
                Some(existing) => {
                    if existing.stream_index != mapping.stream_index
                        && existing.stream_channel == mapping.stream_channel
                    {
                        dynamic_map.push(mapping);
                    } else if *existing != mapping {
                        tracing::warn!(
                            entity = %entity_id,
                            previous = ?existing,
                            replacement = ?mapping,
                            "duplicate stream port input audio mapping replaced"
                        );
                        existing.stream_index = mapping.stream_index;
                        existing.stream_channel = mapping.stream_channel;
                    }
                }
            }
        }
    }

    pub fn remove_stream_port_input_audio_mappings(
        &mut self,
        stream_port_index: StreamPortIndex,
        mappings: &AudioMappings,
    ) {
        let entity_id = self.entity.entity_id;
        let configuration_index = self.current_configuration_index();
        let dynamic_map = &mut self
            .stream_port_input_models_mut(configuration_index, stream_port_index)
            .dynamic_model
            .dynamic_audio_map;

        for mapping in mappings {
            match dynamic_map.iter().position(|m| m == mapping) {
                Some(position) => {
                    dynamic_map.remove(position);
                }
                None => tracing::warn!(
                    entity = %entity_id,
                    mapping = ?mapping,
                    "removing a stream port input audio mapping that does not exist"
                ),
            }
        }
    }

    pub fn clear_stream_port_output_audio_mappings(&mut self, stream_port_index: StreamPortIndex) {
        let configuration_index = self.current_configuration_index();
        self.stream_port_output_models_mut(configuration_index, stream_port_index)
            .dynamic_model
            .dynamic_audio_map
            .clear();
    }

    pub fn add_stream_port_output_audio_mappings(
        &mut self,
        stream_port_index: StreamPortIndex,
        mappings: AudioMappings,
    ) {
        let entity_id = self.entity.entity_id;
        let configuration_index = self.current_configuration_index();
        let dynamic_map = &mut self
            .stream_port_output_models_mut(configuration_index, stream_port_index)
            .dynamic_model
            .dynamic_audio_map;

        for mapping in mappings {
            // A stream channel carries a single source cluster.
            let existing = dynamic_map.iter_mut().find(|m| {
                m.stream_index == mapping.stream_index
                    && m.stream_channel == mapping.stream_channel
            });
            match existing {
                None => dynamic_map.push(mapping),
                Some(existing) => {
                    if *existing != mapping {
                        tracing::warn!(
                            entity = %entity_id,
                            previous = ?existing,
                            replacement = ?mapping,
                            "duplicate stream port output audio mapping replaced"
                        );
                        existing.cluster_offset = mapping.cluster_offset;
                        existing.cluster_channel = mapping.cluster_channel;
                    }
                }
            }
        }
    }

    pub fn remove_stream_port_output_audio_mappings(
        &mut self,
        stream_port_index: StreamPortIndex,
        mappings: &AudioMappings,
    ) {
        let entity_id = self.entity.entity_id;
        let configuration_index = self.current_configuration_index();
        let dynamic_map = &mut self
            .stream_port_output_models_mut(configuration_index, stream_port_index)
            .dynamic_model
            .dynamic_audio_map;

        for mapping in mappings {
            match dynamic_map.iter().position(|m| m == mapping) {
                Some(position) => {
                    dynamic_map.remove(position);
                }
                None => tracing::warn!(
                    entity = %entity_id,
                    mapping = ?mapping,
                    "removing a stream port output audio mapping that does not exist"
                ),
            }
        }
    }

    // ── Remaining dynamic values ─────────────────────────────────────

    /// GET_CLOCK_SOURCE result; current configuration.
    pub fn set_clock_source(
        &mut self,
        clock_domain_index: ClockDomainIndex,
        clock_source_index: ClockSourceIndex,
    ) {
        let configuration_index = self.current_configuration_index();
        self.clock_domain_models_mut(configuration_index, clock_domain_index)
            .dynamic_model
            .clock_source_index = clock_source_index;
    }

    /// GET_CONTROL result; current configuration.
    pub fn set_control_values(&mut self, control_index: ControlIndex, values: ControlValues) {
        let configuration_index = self.current_configuration_index();
        self.control_models_mut(configuration_index, control_index).dynamic_model.values = values;
    }

    pub fn set_memory_object_length(
        &mut self,
        configuration_index: ConfigurationIndex,
        memory_object_index: MemoryObjectIndex,
        length: u64,
    ) {
        self.memory_object_models_mut(configuration_index, memory_object_index)
            .dynamic_model
            .length = length;
    }

    // ── Counter stores (created on demand) ───────────────────────────

    pub fn entity_counters_mut(&mut self) -> &mut EntityCounters {
        self.entity_tree.dynamic_model.counters.get_or_insert_with(Default::default)
    }

    pub fn avb_interface_counters_mut(
        &mut self,
        avb_interface_index: AvbInterfaceIndex,
    ) -> &mut AvbInterfaceCounters {
        let configuration_index = self.current_configuration_index();
        self.avb_interface_models_mut(configuration_index, avb_interface_index)
            .dynamic_model
            .counters
            .get_or_insert_with(Default::default)
    }

    pub fn clock_domain_counters_mut(
        &mut self,
        clock_domain_index: ClockDomainIndex,
    ) -> &mut ClockDomainCounters {
        let configuration_index = self.current_configuration_index();
        self.clock_domain_models_mut(configuration_index, clock_domain_index)
            .dynamic_model
            .counters
            .get_or_insert_with(Default::default)
    }

    pub fn stream_input_counters_mut(
        &mut self,
        stream_index: StreamIndex,
    ) -> &mut StreamInputCounters {
        let configuration_index = self.current_configuration_index();
        self.stream_input_models_mut(configuration_index, stream_index)
            .dynamic_model
            .counters
            .get_or_insert_with(Default::default)
    }

    pub fn stream_output_counters_mut(
        &mut self,
        stream_index: StreamIndex,
    ) -> &mut StreamOutputCounters {
        let configuration_index = self.current_configuration_index();
        self.stream_output_models_mut(configuration_index, stream_index)
            .dynamic_model
            .counters
            .get_or_insert_with(Default::default)
    }
}

fn copy_stream_static(static_model: &mut StreamNodeStaticModel, descriptor: &StreamDescriptor) {
    static_model.localized_description = descriptor.localized_description;
    static_model.clock_domain_index = descriptor.clock_domain_index;
    static_model.stream_flags = descriptor.stream_flags;
    static_model.avb_interface_index = descriptor.avb_interface_index;
    static_model.buffer_length = descriptor.buffer_length;
    static_model.formats = descriptor.formats.clone();
    static_model.redundant_streams = descriptor.redundant_streams.clone();
}

fn copy_stream_port_static(
    static_model: &mut StreamPortNodeStaticModel,
    descriptor: &StreamPortDescriptor,
) {
    static_model.clock_domain_index = descriptor.clock_domain_index;
    static_model.port_flags = descriptor.port_flags;
    static_model.number_of_controls = descriptor.number_of_controls;
    static_model.base_control = descriptor.base_control;
    static_model.number_of_clusters = descriptor.number_of_clusters;
    static_model.base_cluster = descriptor.base_cluster;
    static_model.number_of_maps = descriptor.number_of_maps;
    static_model.base_map = descriptor.base_map;
    // No fixed maps means the port takes dynamic mappings.
    static_model.has_dynamic_audio_map = descriptor.number_of_maps == 0;
}
