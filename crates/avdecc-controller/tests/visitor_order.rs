// The model visitor must walk kinds in a fixed order, ascending by
// descriptor index within each kind, and skip inactive configurations
// unless asked for all of them.

mod common;

use avdecc_controller::{ControlledEntity, EntityModelVisitor, RedundantStreamNode};
use avdecc_model::descriptor::AudioUnitDescriptor;
use avdecc_model::tree::*;
use avdecc_model::{AudioUnitIndex, ConfigurationIndex, DescriptorIndex, StreamPortIndex};

use common::*;

#[derive(Default)]
struct Recorder {
    visits: Vec<String>,
}

impl EntityModelVisitor for Recorder {
    fn visit_entity(&mut self, _: &EntityNodeStaticModel, _: &EntityNodeDynamicModel) {
        self.visits.push("entity".into());
    }

    fn visit_configuration(
        &mut self,
        configuration_index: ConfigurationIndex,
        _: &ConfigurationNodeStaticModel,
        _: &ConfigurationNodeDynamicModel,
    ) {
        self.visits.push(format!("configuration:{configuration_index}"));
    }

    fn visit_audio_unit(
        &mut self,
        _: ConfigurationIndex,
        index: DescriptorIndex,
        _: &AudioUnitNodeStaticModel,
        _: &AudioUnitNodeDynamicModel,
    ) {
        self.visits.push(format!("audio_unit:{index}"));
    }

    fn visit_stream_input(
        &mut self,
        _: ConfigurationIndex,
        index: DescriptorIndex,
        _: &StreamNodeStaticModel,
        _: &StreamInputNodeDynamicModel,
    ) {
        self.visits.push(format!("stream_input:{index}"));
    }

    fn visit_stream_output(
        &mut self,
        _: ConfigurationIndex,
        index: DescriptorIndex,
        _: &StreamNodeStaticModel,
        _: &StreamOutputNodeDynamicModel,
    ) {
        self.visits.push(format!("stream_output:{index}"));
    }

    fn visit_stream_port_input(
        &mut self,
        _: ConfigurationIndex,
        audio_unit_index: AudioUnitIndex,
        index: StreamPortIndex,
        _: &StreamPortNodeStaticModel,
        _: &StreamPortNodeDynamicModel,
    ) {
        self.visits.push(format!("stream_port_input:{audio_unit_index}/{index}"));
    }

    fn visit_redundant_stream_input(
        &mut self,
        _: ConfigurationIndex,
        node: &RedundantStreamNode,
    ) {
        self.visits.push(format!("redundant_stream_input:{}", node.virtual_index));
    }
}

fn visited_entity() -> ControlledEntity {
    let mut entity = live_entity(true);
    entity.set_entity_descriptor(&entity_descriptor());
    entity.set_configuration_descriptor(&configuration_descriptor(&[]), 0);
    entity.set_audio_unit_descriptor(
        &AudioUnitDescriptor {
            number_of_stream_input_ports: 1,
            base_stream_input_port: 0,
            ..Default::default()
        },
        0,
        0,
    );
    entity.set_stream_port_input_descriptor(&dynamic_map_port_descriptor(), 0, 0);
    // Inserted out of order on purpose.
    entity.set_stream_input_descriptor(&stream_descriptor("B", 1, &[0]), 0, 1);
    entity.set_stream_input_descriptor(&stream_descriptor("A", 0, &[1]), 0, 0);
    entity.set_stream_output_descriptor(&stream_descriptor("Out", 0, &[]), 0, 0);
    entity.on_entity_fully_loaded();
    entity.set_advertised(true);
    entity
}

#[test]
fn traversal_follows_the_documented_order() {
    let entity = visited_entity();
    let mut recorder = Recorder::default();
    entity.accept(&mut recorder, false);

    assert_eq!(
        recorder.visits,
        vec![
            "entity",
            "configuration:0",
            "audio_unit:0",
            "stream_input:0",
            "stream_input:1",
            "stream_output:0",
            "stream_port_input:0/0",
            "redundant_stream_input:0",
        ]
    );
}

#[test]
fn inactive_configurations_are_announced_but_not_descended() {
    let mut entity = live_entity(true);
    entity.set_entity_descriptor(&entity_descriptor());
    entity.set_configuration_descriptor(&configuration_descriptor(&[]), 0);
    entity.set_configuration_descriptor(&configuration_descriptor(&[]), 1);
    entity.set_stream_input_descriptor(&stream_descriptor("Active", 0, &[]), 0, 0);
    entity.set_stream_input_descriptor(&stream_descriptor("Inactive", 0, &[]), 1, 0);
    entity.on_entity_fully_loaded();

    let mut recorder = Recorder::default();
    entity.accept(&mut recorder, false);
    assert_eq!(
        recorder.visits,
        vec!["entity", "configuration:0", "stream_input:0", "configuration:1"]
    );

    let mut recorder = Recorder::default();
    entity.accept(&mut recorder, true);
    assert_eq!(
        recorder.visits,
        vec![
            "entity",
            "configuration:0",
            "stream_input:0",
            "configuration:1",
            "stream_input:0",
        ]
    );
}

#[test]
fn entities_without_aem_are_not_visited() {
    let entity = live_entity(false);
    let mut recorder = Recorder::default();
    entity.accept(&mut recorder, true);
    assert!(recorder.visits.is_empty());
}

#[test]
fn fatal_enumeration_errors_suppress_traversal() {
    let mut entity = visited_entity();
    entity.set_fatal_enumeration_error();

    let mut recorder = Recorder::default();
    entity.accept(&mut recorder, true);
    assert!(recorder.visits.is_empty());
}
