// ── Derived entity-model graph ──
//
// The descriptor tree is the source of truth; this graph is a parallel
// structure of *indices* rebuilt after the tree changes, capturing the
// relationships the flat tree does not encode: which stream ports hang
// off which audio unit, which clusters and maps belong to a port, which
// strings belong to a locale, which clock sources a domain may select,
// and the synthesized redundant stream pairs. Index-based on purpose:
// nothing here can dangle when the tree is replaced.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use avdecc_model::tree::{ConfigurationTree, EntityTree, Models, StreamNodeStaticModel};
use avdecc_model::{
    AudioUnitIndex, AvbInterfaceIndex, ClockDomainIndex, ClockSourceIndex, ClusterIndex,
    ConfigurationIndex, DescriptorType, LocaleIndex, MapIndex, StreamIndex, StreamPortIndex,
    StringsIndex, UniqueIdentifier, VirtualIndex,
};

// ── Nodes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct StreamPortNode {
    pub stream_port_index: StreamPortIndex,
    pub audio_clusters: Vec<ClusterIndex>,
    pub audio_maps: Vec<MapIndex>,
}

#[derive(Debug, Clone, Default)]
pub struct AudioUnitNode {
    pub audio_unit_index: AudioUnitIndex,
    pub stream_port_inputs: BTreeMap<StreamPortIndex, StreamPortNode>,
    pub stream_port_outputs: BTreeMap<StreamPortIndex, StreamPortNode>,
}

#[derive(Debug, Clone, Default)]
pub struct StreamNode {
    pub stream_index: StreamIndex,
    /// Set when the stream is a member of a valid redundant association.
    pub is_redundant: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LocaleNode {
    pub locale_index: LocaleIndex,
    pub strings: Vec<StringsIndex>,
}

#[derive(Debug, Clone, Default)]
pub struct ClockDomainNode {
    pub clock_domain_index: ClockDomainIndex,
    /// Clock sources the domain declares and the tree actually holds.
    pub clock_sources: Vec<ClockSourceIndex>,
}

/// Virtual node for one redundant stream pair. Carries a virtual index
/// rather than a descriptor index: it has no wire counterpart.
#[derive(Debug, Clone, Default)]
pub struct RedundantStreamNode {
    pub virtual_index: VirtualIndex,
    pub redundant_streams: BTreeSet<StreamIndex>,
    pub primary_stream: StreamIndex,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigurationNode {
    pub configuration_index: ConfigurationIndex,
    pub audio_units: BTreeMap<AudioUnitIndex, AudioUnitNode>,
    pub stream_inputs: BTreeMap<StreamIndex, StreamNode>,
    pub stream_outputs: BTreeMap<StreamIndex, StreamNode>,
    pub locales: BTreeMap<LocaleIndex, LocaleNode>,
    pub clock_domains: BTreeMap<ClockDomainIndex, ClockDomainNode>,
    pub redundant_stream_inputs: BTreeMap<VirtualIndex, RedundantStreamNode>,
    pub redundant_stream_outputs: BTreeMap<VirtualIndex, RedundantStreamNode>,
}

#[derive(Debug, Clone, Default)]
pub struct EntityNodeGraph {
    pub configurations: BTreeMap<ConfigurationIndex, ConfigurationNode>,
}

/// Cached redundant-stream classification, one set per category.
/// Non-redundant streams appear in none of them.
#[derive(Debug, Clone, Default)]
pub(crate) struct RedundancyIndex {
    pub primary_stream_inputs: HashSet<StreamIndex>,
    pub primary_stream_outputs: HashSet<StreamIndex>,
    pub secondary_stream_inputs: HashSet<StreamIndex>,
    pub secondary_stream_outputs: HashSet<StreamIndex>,
}

// ── Build ───────────────────────────────────────────────────────────

impl EntityNodeGraph {
    /// Rebuild the graph and the redundancy classification from the
    /// tree.
    pub(crate) fn build(
        entity_id: UniqueIdentifier,
        tree: &EntityTree,
    ) -> (Self, RedundancyIndex) {
        let mut graph = Self::default();
        let mut redundancy = RedundancyIndex::default();

        for (&configuration_index, config_tree) in &tree.configuration_trees {
            let mut node = ConfigurationNode {
                configuration_index,
                ..Default::default()
            };

            build_audio_units(config_tree, &mut node);
            build_locales(config_tree, &mut node);
            build_clock_domains(config_tree, &mut node);

            node.stream_inputs = config_tree
                .stream_input_models
                .keys()
                .map(|&stream_index| (stream_index, StreamNode { stream_index, is_redundant: false }))
                .collect();
            node.stream_outputs = config_tree
                .stream_output_models
                .keys()
                .map(|&stream_index| (stream_index, StreamNode { stream_index, is_redundant: false }))
                .collect();

            classify_redundant_streams(
                entity_id,
                DescriptorType::StreamInput,
                &config_tree.stream_input_models,
                &mut node.stream_inputs,
                &mut node.redundant_stream_inputs,
                &mut redundancy.primary_stream_inputs,
                &mut redundancy.secondary_stream_inputs,
            );
            classify_redundant_streams(
                entity_id,
                DescriptorType::StreamOutput,
                &config_tree.stream_output_models,
                &mut node.stream_outputs,
                &mut node.redundant_stream_outputs,
                &mut redundancy.primary_stream_outputs,
                &mut redundancy.secondary_stream_outputs,
            );

            graph.configurations.insert(configuration_index, node);
        }

        (graph, redundancy)
    }
}

fn build_audio_units(config_tree: &ConfigurationTree, node: &mut ConfigurationNode) {
    for (&audio_unit_index, models) in &config_tree.audio_unit_models {
        let static_model = &models.static_model;
        let mut audio_unit = AudioUnitNode {
            audio_unit_index,
            ..Default::default()
        };

        audio_unit.stream_port_inputs = build_ports(
            &config_tree.stream_port_input_models,
            static_model.number_of_stream_input_ports,
            static_model.base_stream_input_port,
        );
        audio_unit.stream_port_outputs = build_ports(
            &config_tree.stream_port_output_models,
            static_model.number_of_stream_output_ports,
            static_model.base_stream_output_port,
        );

        node.audio_units.insert(audio_unit_index, audio_unit);
    }
}

fn build_ports(
    port_models: &BTreeMap<StreamPortIndex, avdecc_model::tree::StreamPortModels>,
    count: u16,
    base: StreamPortIndex,
) -> BTreeMap<StreamPortIndex, StreamPortNode> {
    (0..count)
        .map(|offset| {
            let stream_port_index = base + offset;
            let (clusters, maps) = match port_models.get(&stream_port_index) {
                Some(models) => {
                    let s = &models.static_model;
                    (
                        (0..s.number_of_clusters).map(|o| s.base_cluster + o).collect(),
                        (0..s.number_of_maps).map(|o| s.base_map + o).collect(),
                    )
                }
                None => (Vec::new(), Vec::new()),
            };
            (
                stream_port_index,
                StreamPortNode {
                    stream_port_index,
                    audio_clusters: clusters,
                    audio_maps: maps,
                },
            )
        })
        .collect()
}

fn build_locales(config_tree: &ConfigurationTree, node: &mut ConfigurationNode) {
    for (&locale_index, models) in &config_tree.locale_models {
        let static_model = &models.static_model;
        let strings = (0..static_model.number_of_string_descriptors)
            .map(|offset| static_model.base_string_descriptor_index + offset)
            .collect();
        node.locales.insert(locale_index, LocaleNode { locale_index, strings });
    }
}

fn build_clock_domains(config_tree: &ConfigurationTree, node: &mut ConfigurationNode) {
    for (&clock_domain_index, models) in &config_tree.clock_domain_models {
        let clock_sources = models
            .static_model
            .clock_sources
            .iter()
            .copied()
            .filter(|index| config_tree.clock_source_models.contains_key(index))
            .collect();
        node.clock_domains.insert(
            clock_domain_index,
            ClockDomainNode { clock_domain_index, clock_sources },
        );
    }
}

// ── Redundancy classification ───────────────────────────────────────

/// Validate every redundant-stream association of one direction and
/// synthesize the virtual pair nodes. Invalid associations are dropped
/// with a diagnostic; their members stay non-redundant.
fn classify_redundant_streams<D>(
    entity_id: UniqueIdentifier,
    descriptor_type: DescriptorType,
    streams: &BTreeMap<StreamIndex, Models<StreamNodeStaticModel, D>>,
    nodes: &mut BTreeMap<StreamIndex, StreamNode>,
    redundant_nodes: &mut BTreeMap<VirtualIndex, RedundantStreamNode>,
    primary: &mut HashSet<StreamIndex>,
    secondary: &mut HashSet<StreamIndex>,
) {
    for (&stream_index, models) in streams {
        let association = &models.static_model.redundant_streams;
        if association.is_empty() {
            continue;
        }

        // Already synthesized through a pair member seen earlier.
        if redundant_nodes
            .values()
            .any(|node| node.redundant_streams.contains(&stream_index))
        {
            continue;
        }

        // Members keyed by AVB interface: orders the pair (lowest
        // interface is the primary) and rejects interface reuse.
        let mut members: BTreeMap<AvbInterfaceIndex, StreamIndex> = BTreeMap::new();
        members.insert(models.static_model.avb_interface_index, stream_index);

        let mut valid = true;
        for &other_index in association {
            if other_index == stream_index {
                tracing::error!(
                    entity = %entity_id,
                    descriptor = ?descriptor_type,
                    stream = stream_index,
                    "redundant association references itself"
                );
                valid = false;
                break;
            }
            let Some(other) = streams.get(&other_index) else {
                tracing::error!(
                    entity = %entity_id,
                    descriptor = ?descriptor_type,
                    stream = stream_index,
                    missing = other_index,
                    "redundant association references a stream that does not exist"
                );
                valid = false;
                break;
            };
            if !other.static_model.redundant_streams.contains(&stream_index) {
                tracing::error!(
                    entity = %entity_id,
                    descriptor = ?descriptor_type,
                    stream = stream_index,
                    other = other_index,
                    "redundant association is not reciprocal"
                );
                valid = false;
                break;
            }
            let other_interface = other.static_model.avb_interface_index;
            if members.contains_key(&other_interface) {
                tracing::error!(
                    entity = %entity_id,
                    descriptor = ?descriptor_type,
                    stream = stream_index,
                    other = other_index,
                    "redundant association reuses an AVB interface"
                );
                valid = false;
                break;
            }
            members.insert(other_interface, other_index);
        }

        if !valid {
            continue;
        }

        let virtual_index = redundant_nodes.len() as VirtualIndex;
        let mut member_iter = members.values().copied();
        let primary_stream = member_iter
            .next()
            .unwrap_or(stream_index);

        primary.insert(primary_stream);
        for member in member_iter {
            secondary.insert(member);
        }

        for member in members.values() {
            if let Some(node) = nodes.get_mut(member) {
                node.is_redundant = true;
            }
        }

        redundant_nodes.insert(
            virtual_index,
            RedundantStreamNode {
                virtual_index,
                redundant_streams: members.values().copied().collect(),
                primary_stream,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avdecc_model::tree::StreamInputModels;

    fn stream(avb_interface_index: AvbInterfaceIndex, pair: &[StreamIndex]) -> StreamInputModels {
        StreamInputModels {
            static_model: StreamNodeStaticModel {
                avb_interface_index,
                redundant_streams: pair.iter().copied().collect(),
                ..Default::default()
            },
            dynamic_model: Default::default(),
        }
    }

    fn classify(
        streams: BTreeMap<StreamIndex, StreamInputModels>,
    ) -> (BTreeMap<VirtualIndex, RedundantStreamNode>, HashSet<StreamIndex>, HashSet<StreamIndex>) {
        let mut nodes: BTreeMap<StreamIndex, StreamNode> = streams
            .keys()
            .map(|&i| (i, StreamNode { stream_index: i, is_redundant: false }))
            .collect();
        let mut redundant = BTreeMap::new();
        let mut primary = HashSet::new();
        let mut secondary = HashSet::new();
        classify_redundant_streams(
            UniqueIdentifier::new(1),
            DescriptorType::StreamInput,
            &streams,
            &mut nodes,
            &mut redundant,
            &mut primary,
            &mut secondary,
        );
        (redundant, primary, secondary)
    }

    #[test]
    fn valid_pair_is_classified() {
        let streams: BTreeMap<_, _> =
            [(0, stream(0, &[1])), (1, stream(1, &[0])), (2, stream(0, &[]))]
                .into_iter()
                .collect();
        let (redundant, primary, secondary) = classify(streams);

        assert_eq!(redundant.len(), 1);
        let node = &redundant[&0];
        assert_eq!(node.virtual_index, 0);
        assert_eq!(node.primary_stream, 0);
        assert!(node.redundant_streams.contains(&0) && node.redundant_streams.contains(&1));

        assert!(primary.contains(&0));
        assert!(secondary.contains(&1));
        assert!(!primary.contains(&2) && !secondary.contains(&2));
    }

    #[test]
    fn primary_is_the_lowest_avb_interface() {
        // Stream 4 rides interface 0, so it is the primary even though
        // stream 3 sorts first by descriptor index.
        let streams: BTreeMap<_, _> = [(3, stream(1, &[4])), (4, stream(0, &[3]))]
            .into_iter()
            .collect();
        let (redundant, primary, secondary) = classify(streams);

        assert_eq!(redundant[&0].primary_stream, 4);
        assert!(primary.contains(&4));
        assert!(secondary.contains(&3));
    }

    #[test]
    fn non_reciprocal_association_is_rejected() {
        let streams: BTreeMap<_, _> = [(0, stream(0, &[1])), (1, stream(1, &[]))]
            .into_iter()
            .collect();
        let (redundant, primary, secondary) = classify(streams);

        assert!(redundant.is_empty());
        assert!(primary.is_empty() && secondary.is_empty());
    }

    #[test]
    fn interface_reuse_is_rejected() {
        let streams: BTreeMap<_, _> = [(0, stream(0, &[1])), (1, stream(0, &[0]))]
            .into_iter()
            .collect();
        let (redundant, ..) = classify(streams);
        assert!(redundant.is_empty());
    }

    #[test]
    fn self_reference_is_rejected() {
        let streams: BTreeMap<_, _> = [(0, stream(0, &[0]))].into_iter().collect();
        let (redundant, ..) = classify(streams);
        assert!(redundant.is_empty());
    }
}
