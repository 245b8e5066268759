// ── Model traversal ──
//
// Deterministic visitor over the entity model: one callback per node
// kind, with enough parent context to rebuild the hierarchy. All
// methods default to no-ops so visitors implement only what they need.

use avdecc_model::tree::*;
use avdecc_model::{AudioUnitIndex, ConfigurationIndex, DescriptorIndex, StreamPortIndex};

use crate::entity::ControlledEntity;
use crate::graph::RedundantStreamNode;

/// Receiver for [`ControlledEntity::accept`]. Called in a fixed order:
/// entity, configuration, then per configuration: audio units, stream
/// inputs, stream outputs, AVB interfaces, clock sources, memory
/// objects, locales, stream ports (inputs then outputs), audio
/// clusters, audio maps, controls, clock domains, and finally the
/// redundant stream pairs. Ascending descriptor index within each kind.
#[allow(unused_variables)]
pub trait EntityModelVisitor {
    fn visit_entity(
        &mut self,
        static_model: &EntityNodeStaticModel,
        dynamic_model: &EntityNodeDynamicModel,
    ) {
    }

    fn visit_configuration(
        &mut self,
        configuration_index: ConfigurationIndex,
        static_model: &ConfigurationNodeStaticModel,
        dynamic_model: &ConfigurationNodeDynamicModel,
    ) {
    }

    fn visit_audio_unit(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &AudioUnitNodeStaticModel,
        dynamic_model: &AudioUnitNodeDynamicModel,
    ) {
    }

    fn visit_stream_input(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &StreamNodeStaticModel,
        dynamic_model: &StreamInputNodeDynamicModel,
    ) {
    }

    fn visit_stream_output(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &StreamNodeStaticModel,
        dynamic_model: &StreamOutputNodeDynamicModel,
    ) {
    }

    fn visit_avb_interface(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &AvbInterfaceNodeStaticModel,
        dynamic_model: &AvbInterfaceNodeDynamicModel,
    ) {
    }

    fn visit_clock_source(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &ClockSourceNodeStaticModel,
        dynamic_model: &ClockSourceNodeDynamicModel,
    ) {
    }

    fn visit_memory_object(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &MemoryObjectNodeStaticModel,
        dynamic_model: &MemoryObjectNodeDynamicModel,
    ) {
    }

    fn visit_locale(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &LocaleNodeStaticModel,
    ) {
    }

    fn visit_stream_port_input(
        &mut self,
        configuration_index: ConfigurationIndex,
        audio_unit_index: AudioUnitIndex,
        index: StreamPortIndex,
        static_model: &StreamPortNodeStaticModel,
        dynamic_model: &StreamPortNodeDynamicModel,
    ) {
    }

    fn visit_stream_port_output(
        &mut self,
        configuration_index: ConfigurationIndex,
        audio_unit_index: AudioUnitIndex,
        index: StreamPortIndex,
        static_model: &StreamPortNodeStaticModel,
        dynamic_model: &StreamPortNodeDynamicModel,
    ) {
    }

    fn visit_audio_cluster(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &AudioClusterNodeStaticModel,
        dynamic_model: &AudioClusterNodeDynamicModel,
    ) {
    }

    fn visit_audio_map(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &AudioMapNodeStaticModel,
    ) {
    }

    fn visit_control(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &ControlNodeStaticModel,
        dynamic_model: &ControlNodeDynamicModel,
    ) {
    }

    fn visit_clock_domain(
        &mut self,
        configuration_index: ConfigurationIndex,
        index: DescriptorIndex,
        static_model: &ClockDomainNodeStaticModel,
        dynamic_model: &ClockDomainNodeDynamicModel,
    ) {
    }

    fn visit_redundant_stream_input(
        &mut self,
        configuration_index: ConfigurationIndex,
        node: &RedundantStreamNode,
    ) {
    }

    fn visit_redundant_stream_output(
        &mut self,
        configuration_index: ConfigurationIndex,
        node: &RedundantStreamNode,
    ) {
    }
}

impl ControlledEntity {
    /// Walk the model in the documented order. Silently does nothing
    /// when the entity has no AEM or failed enumeration; only the
    /// active configuration's contents are visited unless
    /// `visit_all_configurations` is set.
    pub fn accept(&self, visitor: &mut dyn EntityModelVisitor, visit_all_configurations: bool) {
        if self.got_fatal_enumeration_error() || !self.entity().aem_supported() {
            return;
        }

        let tree = &self.entity_tree;
        visitor.visit_entity(&tree.static_model, &tree.dynamic_model);

        for (&configuration_index, config_tree) in &tree.configuration_trees {
            visitor.visit_configuration(
                configuration_index,
                &config_tree.static_model,
                &config_tree.dynamic_model,
            );

            if !visit_all_configurations && !config_tree.dynamic_model.is_active_configuration {
                continue;
            }

            for (&index, models) in &config_tree.audio_unit_models {
                visitor.visit_audio_unit(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }
            for (&index, models) in &config_tree.stream_input_models {
                visitor.visit_stream_input(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }
            for (&index, models) in &config_tree.stream_output_models {
                visitor.visit_stream_output(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }
            for (&index, models) in &config_tree.avb_interface_models {
                visitor.visit_avb_interface(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }
            for (&index, models) in &config_tree.clock_source_models {
                visitor.visit_clock_source(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }
            for (&index, models) in &config_tree.memory_object_models {
                visitor.visit_memory_object(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }
            // Strings are not visited on their own: they surface
            // through localized-string resolution.
            for (&index, models) in &config_tree.locale_models {
                visitor.visit_locale(configuration_index, index, &models.static_model);
            }

            self.visit_stream_ports(visitor, configuration_index, config_tree);

            for (&index, models) in &config_tree.audio_cluster_models {
                visitor.visit_audio_cluster(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }
            for (&index, models) in &config_tree.audio_map_models {
                visitor.visit_audio_map(configuration_index, index, &models.static_model);
            }
            for (&index, models) in &config_tree.control_models {
                visitor.visit_control(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }
            for (&index, models) in &config_tree.clock_domain_models {
                visitor.visit_clock_domain(
                    configuration_index,
                    index,
                    &models.static_model,
                    &models.dynamic_model,
                );
            }

            if let Some(config_node) = self.graph.configurations.get(&configuration_index) {
                for node in config_node.redundant_stream_inputs.values() {
                    visitor.visit_redundant_stream_input(configuration_index, node);
                }
                for node in config_node.redundant_stream_outputs.values() {
                    visitor.visit_redundant_stream_output(configuration_index, node);
                }
            }
        }
    }

    /// Stream ports are visited through the graph to recover their
    /// parent audio unit; index order is ascending because port ranges
    /// per unit do not interleave.
    fn visit_stream_ports(
        &self,
        visitor: &mut dyn EntityModelVisitor,
        configuration_index: ConfigurationIndex,
        config_tree: &ConfigurationTree,
    ) {
        let Some(config_node) = self.graph.configurations.get(&configuration_index) else {
            return;
        };

        for unit in config_node.audio_units.values() {
            for &port_index in unit.stream_port_inputs.keys() {
                if let Some(models) = config_tree.stream_port_input_models.get(&port_index) {
                    visitor.visit_stream_port_input(
                        configuration_index,
                        unit.audio_unit_index,
                        port_index,
                        &models.static_model,
                        &models.dynamic_model,
                    );
                }
            }
        }
        for unit in config_node.audio_units.values() {
            for &port_index in unit.stream_port_outputs.keys() {
                if let Some(models) = config_tree.stream_port_output_models.get(&port_index) {
                    visitor.visit_stream_port_output(
                        configuration_index,
                        unit.audio_unit_index,
                        port_index,
                        &models.static_model,
                        &models.dynamic_model,
                    );
                }
            }
        }
    }
}
