// ── Read surface ──
//
// Fallible accessors over the descriptor tree and the derived graph.
// Everything here returns `Result` per the accessor contract:
// NotSupported when the entity has no AEM (or enumeration failed
// fatally), InvalidConfigurationIndex / InvalidDescriptorIndex when the
// requested node is absent.

use avdecc_model::tree::*;
use avdecc_model::{
    AudioMappings, AudioUnitIndex, AvdeccString, ClockDomainIndex, ClockSourceIndex, ClusterIndex,
    ConfigurationIndex, ControlIndex, LocaleIndex, LocalizedStringReference, MapIndex,
    MemoryObjectIndex, StreamIdentification, StreamIndex, StreamInputConnectionInfo,
    StreamPortIndex, StringsIndex, VirtualIndex,
};
use std::collections::BTreeSet;

use crate::entity::ControlledEntity;
use crate::error::EntityError;
use crate::graph::{AudioUnitNode, ConfigurationNode, RedundantStreamNode, StreamPortNode};

/// Generates the paired static/dynamic read accessors for one
/// descriptor kind, all following the same lookup-or-fail shape.
macro_rules! model_accessors {
    ($static_fn:ident, $dynamic_fn:ident, $field:ident, $index:ty, $s:ty, $d:ty) => {
        pub fn $static_fn(
            &self,
            configuration_index: ConfigurationIndex,
            index: $index,
        ) -> Result<&$s, EntityError> {
            self.configuration_tree(configuration_index)?
                .$field
                .get(&index)
                .map(|models| &models.static_model)
                .ok_or(EntityError::InvalidDescriptorIndex)
        }

        pub fn $dynamic_fn(
            &self,
            configuration_index: ConfigurationIndex,
            index: $index,
        ) -> Result<&$d, EntityError> {
            self.configuration_tree(configuration_index)?
                .$field
                .get(&index)
                .map(|models| &models.dynamic_model)
                .ok_or(EntityError::InvalidDescriptorIndex)
        }
    };
}

impl ControlledEntity {
    // ── Tree access ──────────────────────────────────────────────────

    /// The full descriptor tree. Fails with `NotSupported` when the
    /// entity does not advertise AEM or its enumeration failed fatally.
    pub fn entity_tree(&self) -> Result<&EntityTree, EntityError> {
        if self.got_fatal_enumeration_error || !self.entity.aem_supported() {
            return Err(EntityError::NotSupported);
        }
        Ok(&self.entity_tree)
    }

    pub fn configuration_tree(
        &self,
        configuration_index: ConfigurationIndex,
    ) -> Result<&ConfigurationTree, EntityError> {
        self.entity_tree()?
            .configuration_trees
            .get(&configuration_index)
            .ok_or(EntityError::InvalidConfigurationIndex)
    }

    pub fn current_configuration_index(&self) -> ConfigurationIndex {
        self.entity_tree.dynamic_model.current_configuration
    }

    pub fn entity_static_model(&self) -> Result<&EntityNodeStaticModel, EntityError> {
        Ok(&self.entity_tree()?.static_model)
    }

    pub fn entity_dynamic_model(&self) -> Result<&EntityNodeDynamicModel, EntityError> {
        Ok(&self.entity_tree()?.dynamic_model)
    }

    pub fn configuration_static_model(
        &self,
        configuration_index: ConfigurationIndex,
    ) -> Result<&ConfigurationNodeStaticModel, EntityError> {
        Ok(&self.configuration_tree(configuration_index)?.static_model)
    }

    pub fn configuration_dynamic_model(
        &self,
        configuration_index: ConfigurationIndex,
    ) -> Result<&ConfigurationNodeDynamicModel, EntityError> {
        Ok(&self.configuration_tree(configuration_index)?.dynamic_model)
    }

    // ── Existence checks (non-failing) ───────────────────────────────

    pub fn has_any_configuration_tree(&self) -> bool {
        !self.entity_tree.configuration_trees.is_empty()
    }

    pub fn has_configuration_tree(&self, configuration_index: ConfigurationIndex) -> bool {
        self.configuration_tree(configuration_index).is_ok()
    }

    /// True iff a descriptor of `kind` with `index` is present in the
    /// configuration, without failing on missing prerequisites.
    pub fn has_descriptor(
        &self,
        configuration_index: ConfigurationIndex,
        kind: avdecc_model::DescriptorType,
        index: avdecc_model::DescriptorIndex,
    ) -> bool {
        use avdecc_model::DescriptorType as T;
        let Ok(tree) = self.configuration_tree(configuration_index) else {
            return false;
        };
        match kind {
            T::AudioUnit => tree.audio_unit_models.contains_key(&index),
            T::StreamInput => tree.stream_input_models.contains_key(&index),
            T::StreamOutput => tree.stream_output_models.contains_key(&index),
            T::AvbInterface => tree.avb_interface_models.contains_key(&index),
            T::ClockSource => tree.clock_source_models.contains_key(&index),
            T::MemoryObject => tree.memory_object_models.contains_key(&index),
            T::Locale => tree.locale_models.contains_key(&index),
            T::Strings => tree.strings_models.contains_key(&index),
            T::StreamPortInput => tree.stream_port_input_models.contains_key(&index),
            T::StreamPortOutput => tree.stream_port_output_models.contains_key(&index),
            T::AudioCluster => tree.audio_cluster_models.contains_key(&index),
            T::AudioMap => tree.audio_map_models.contains_key(&index),
            T::Control => tree.control_models.contains_key(&index),
            T::ClockDomain => tree.clock_domain_models.contains_key(&index),
            T::Entity | T::Configuration => false,
        }
    }

    // ── Per-kind model accessors ─────────────────────────────────────

    model_accessors!(
        audio_unit_static_model, audio_unit_dynamic_model,
        audio_unit_models, AudioUnitIndex,
        AudioUnitNodeStaticModel, AudioUnitNodeDynamicModel
    );
    model_accessors!(
        stream_input_static_model, stream_input_dynamic_model,
        stream_input_models, StreamIndex,
        StreamNodeStaticModel, StreamInputNodeDynamicModel
    );
    model_accessors!(
        stream_output_static_model, stream_output_dynamic_model,
        stream_output_models, StreamIndex,
        StreamNodeStaticModel, StreamOutputNodeDynamicModel
    );
    model_accessors!(
        avb_interface_static_model, avb_interface_dynamic_model,
        avb_interface_models, avdecc_model::AvbInterfaceIndex,
        AvbInterfaceNodeStaticModel, AvbInterfaceNodeDynamicModel
    );
    model_accessors!(
        clock_source_static_model, clock_source_dynamic_model,
        clock_source_models, ClockSourceIndex,
        ClockSourceNodeStaticModel, ClockSourceNodeDynamicModel
    );
    model_accessors!(
        memory_object_static_model, memory_object_dynamic_model,
        memory_object_models, MemoryObjectIndex,
        MemoryObjectNodeStaticModel, MemoryObjectNodeDynamicModel
    );
    model_accessors!(
        locale_static_model, locale_dynamic_model,
        locale_models, LocaleIndex,
        LocaleNodeStaticModel, LocaleNodeDynamicModel
    );
    model_accessors!(
        strings_static_model, strings_dynamic_model,
        strings_models, StringsIndex,
        StringsNodeStaticModel, StringsNodeDynamicModel
    );
    model_accessors!(
        stream_port_input_static_model, stream_port_input_dynamic_model,
        stream_port_input_models, StreamPortIndex,
        StreamPortNodeStaticModel, StreamPortNodeDynamicModel
    );
    model_accessors!(
        stream_port_output_static_model, stream_port_output_dynamic_model,
        stream_port_output_models, StreamPortIndex,
        StreamPortNodeStaticModel, StreamPortNodeDynamicModel
    );
    model_accessors!(
        audio_cluster_static_model, audio_cluster_dynamic_model,
        audio_cluster_models, ClusterIndex,
        AudioClusterNodeStaticModel, AudioClusterNodeDynamicModel
    );
    model_accessors!(
        audio_map_static_model, audio_map_dynamic_model,
        audio_map_models, MapIndex,
        AudioMapNodeStaticModel, AudioMapNodeDynamicModel
    );
    model_accessors!(
        control_static_model, control_dynamic_model,
        control_models, ControlIndex,
        ControlNodeStaticModel, ControlNodeDynamicModel
    );
    model_accessors!(
        clock_domain_static_model, clock_domain_dynamic_model,
        clock_domain_models, ClockDomainIndex,
        ClockDomainNodeStaticModel, ClockDomainNodeDynamicModel
    );

    // ── Graph access ─────────────────────────────────────────────────

    pub fn configuration_node(
        &self,
        configuration_index: ConfigurationIndex,
    ) -> Result<&ConfigurationNode, EntityError> {
        if self.got_fatal_enumeration_error || !self.entity.aem_supported() {
            return Err(EntityError::NotSupported);
        }
        self.graph
            .configurations
            .get(&configuration_index)
            .ok_or(EntityError::InvalidConfigurationIndex)
    }

    pub fn audio_unit_node(
        &self,
        configuration_index: ConfigurationIndex,
        audio_unit_index: AudioUnitIndex,
    ) -> Result<&AudioUnitNode, EntityError> {
        self.configuration_node(configuration_index)?
            .audio_units
            .get(&audio_unit_index)
            .ok_or(EntityError::InvalidDescriptorIndex)
    }

    /// Stream port input node; searched across every audio unit since
    /// the port index space is configuration-wide.
    pub fn stream_port_input_node(
        &self,
        configuration_index: ConfigurationIndex,
        stream_port_index: StreamPortIndex,
    ) -> Result<&StreamPortNode, EntityError> {
        self.configuration_node(configuration_index)?
            .audio_units
            .values()
            .find_map(|unit| unit.stream_port_inputs.get(&stream_port_index))
            .ok_or(EntityError::InvalidDescriptorIndex)
    }

    pub fn stream_port_output_node(
        &self,
        configuration_index: ConfigurationIndex,
        stream_port_index: StreamPortIndex,
    ) -> Result<&StreamPortNode, EntityError> {
        self.configuration_node(configuration_index)?
            .audio_units
            .values()
            .find_map(|unit| unit.stream_port_outputs.get(&stream_port_index))
            .ok_or(EntityError::InvalidDescriptorIndex)
    }

    pub fn redundant_stream_input_node(
        &self,
        configuration_index: ConfigurationIndex,
        virtual_index: VirtualIndex,
    ) -> Result<&RedundantStreamNode, EntityError> {
        self.configuration_node(configuration_index)?
            .redundant_stream_inputs
            .get(&virtual_index)
            .ok_or(EntityError::InvalidDescriptorIndex)
    }

    pub fn redundant_stream_output_node(
        &self,
        configuration_index: ConfigurationIndex,
        virtual_index: VirtualIndex,
    ) -> Result<&RedundantStreamNode, EntityError> {
        self.configuration_node(configuration_index)?
            .redundant_stream_outputs
            .get(&virtual_index)
            .ok_or(EntityError::InvalidDescriptorIndex)
    }

    // ── Stream state ─────────────────────────────────────────────────

    /// A stream whose running state was never reported reads as running.
    pub fn is_stream_input_running(
        &self,
        configuration_index: ConfigurationIndex,
        stream_index: StreamIndex,
    ) -> Result<bool, EntityError> {
        Ok(self
            .stream_input_dynamic_model(configuration_index, stream_index)?
            .is_stream_running
            .unwrap_or(true))
    }

    pub fn is_stream_output_running(
        &self,
        configuration_index: ConfigurationIndex,
        stream_index: StreamIndex,
    ) -> Result<bool, EntityError> {
        Ok(self
            .stream_output_dynamic_model(configuration_index, stream_index)?
            .is_stream_running
            .unwrap_or(true))
    }

    /// Connection state of an input (sink) stream in the current
    /// configuration.
    pub fn sink_connection_information(
        &self,
        stream_index: StreamIndex,
    ) -> Result<&StreamInputConnectionInfo, EntityError> {
        Ok(&self
            .stream_input_dynamic_model(self.current_configuration_index(), stream_index)?
            .connection_info)
    }

    /// Listener streams connected to an output (talker) stream in the
    /// current configuration.
    pub fn stream_output_connections(
        &self,
        stream_index: StreamIndex,
    ) -> Result<&BTreeSet<StreamIdentification>, EntityError> {
        Ok(&self
            .stream_output_dynamic_model(self.current_configuration_index(), stream_index)?
            .connections)
    }

    // ── Audio mappings ───────────────────────────────────────────────

    pub fn stream_port_input_audio_mappings(
        &self,
        stream_port_index: StreamPortIndex,
    ) -> Result<&AudioMappings, EntityError> {
        let configuration_index = self.current_configuration_index();
        let static_model =
            self.stream_port_input_static_model(configuration_index, stream_port_index)?;
        if !static_model.has_dynamic_audio_map {
            return Err(EntityError::NotSupported);
        }
        Ok(&self
            .stream_port_input_dynamic_model(configuration_index, stream_port_index)?
            .dynamic_audio_map)
    }

    /// The input mappings with every mapping bound to a redundant
    /// *secondary* stream removed; the primary carries the pair.
    pub fn stream_port_input_non_redundant_audio_mappings(
        &self,
        stream_port_index: StreamPortIndex,
    ) -> Result<AudioMappings, EntityError> {
        let mappings = self.stream_port_input_audio_mappings(stream_port_index)?;
        Ok(mappings
            .iter()
            .filter(|mapping| !self.is_redundant_secondary_stream_input(mapping.stream_index))
            .copied()
            .collect())
    }

    pub fn stream_port_output_audio_mappings(
        &self,
        stream_port_index: StreamPortIndex,
    ) -> Result<&AudioMappings, EntityError> {
        let configuration_index = self.current_configuration_index();
        let static_model =
            self.stream_port_output_static_model(configuration_index, stream_port_index)?;
        if !static_model.has_dynamic_audio_map {
            return Err(EntityError::NotSupported);
        }
        Ok(&self
            .stream_port_output_dynamic_model(configuration_index, stream_port_index)?
            .dynamic_audio_map)
    }

    pub fn stream_port_output_non_redundant_audio_mappings(
        &self,
        stream_port_index: StreamPortIndex,
    ) -> Result<AudioMappings, EntityError> {
        let mappings = self.stream_port_output_audio_mappings(stream_port_index)?;
        Ok(mappings
            .iter()
            .filter(|mapping| !self.is_redundant_secondary_stream_output(mapping.stream_index))
            .copied()
            .collect())
    }

    // ── Locales and strings ──────────────────────────────────────────

    /// The locale to resolve strings against. Currently the first
    /// declared locale.
    pub fn find_locale_node(
        &self,
        configuration_index: ConfigurationIndex,
    ) -> Result<&LocaleNodeStaticModel, EntityError> {
        self.configuration_tree(configuration_index)?
            .locale_models
            .values()
            .next()
            .map(|models| &models.static_model)
            .ok_or(EntityError::InvalidLocaleName)
    }

    /// Resolve a localized string in the current configuration; empty
    /// when unresolvable.
    pub fn localized_string(&self, reference: LocalizedStringReference) -> AvdeccString {
        self.configuration_localized_string(self.current_configuration_index(), reference)
    }

    /// Resolve a localized string against one configuration's selected
    /// locale. Returns the empty string when the reference is invalid,
    /// out of the selected range, or not (yet) loaded.
    pub fn configuration_localized_string(
        &self,
        configuration_index: ConfigurationIndex,
        reference: LocalizedStringReference,
    ) -> AvdeccString {
        if !reference.is_valid() {
            return AvdeccString::default();
        }
        let Ok(dynamic_model) = self.configuration_dynamic_model(configuration_index) else {
            return AvdeccString::default();
        };
        if reference.strings_index() >= dynamic_model.selected_locale_count {
            return AvdeccString::default();
        }
        let absolute_index = dynamic_model.selected_locale_base_index + reference.strings_index();
        dynamic_model
            .localized_strings
            .get(&absolute_index)
            .and_then(|strings| strings.get(reference.offset() as usize))
            .cloned()
            .unwrap_or_default()
    }

    // ── Identify ─────────────────────────────────────────────────────

    /// True while the entity reports its identify control active (the
    /// linear u8 value reads 255).
    pub fn is_identifying(&self) -> bool {
        let Some(control_index) = self.identify_control_index() else {
            return false;
        };
        let Ok(dynamic_model) =
            self.control_dynamic_model(self.current_configuration_index(), control_index)
        else {
            return false;
        };
        match dynamic_model.values.values.as_slice() {
            [value] => *value == 255,
            _ => false,
        }
    }
}
