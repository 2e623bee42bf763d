//! Zone tree construction: declarative [`ZoneConfig`] in, [`PanelTree`] out.

use serde_json::json;

use crate::config::{FlowDirection, LayerConfig, SectionConfig, ZoneConfig};
use crate::logging::{LogLevel, Logger, TARGET_LAYOUT, emit, json_kv};

use super::core::{Layer, PanelTree, Section, SectionStyle};

pub struct ZoneTreeBuilder<'a> {
    config: &'a ZoneConfig,
    logger: Option<&'a Logger>,
}

impl<'a> ZoneTreeBuilder<'a> {
    pub fn new(config: &'a ZoneConfig) -> Self {
        Self {
            config,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Option<&'a Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Materialise the configured layout.
    ///
    /// A missing or non-positive layer count yields the single default
    /// container. Otherwise layers `1..=count` are created, each with its
    /// configured sections; a layer without settings gets a column flow and
    /// no sections.
    pub fn build(&self) -> PanelTree {
        let layer_count = match self.config.layer_count {
            Some(count) if count > 0 => clamp_count(count),
            _ => {
                emit(
                    self.logger,
                    LogLevel::Debug,
                    TARGET_LAYOUT,
                    "default_container",
                    std::iter::empty(),
                );
                return PanelTree::default_container();
            }
        };

        let layers: Vec<Layer> = (1..=layer_count)
            .map(|id| build_layer(id, self.config.layer(id)))
            .collect();

        let tree = PanelTree::layered(layers);
        emit(
            self.logger,
            LogLevel::Debug,
            TARGET_LAYOUT,
            "layers_built",
            [
                json_kv("layers", json!(tree.layers().len())),
                json_kv("sections", json!(tree.section_count())),
            ],
        );
        tree
    }

    /// Build into `tree` unless it is already rendered. Returns whether a
    /// build happened.
    pub fn build_into(&self, tree: &mut PanelTree) -> bool {
        if tree.is_built() {
            return false;
        }
        *tree = self.build();
        true
    }
}

/// Counts beyond `u32::MAX` saturate instead of wrapping.
fn clamp_count(count: i64) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn build_layer(id: u32, config: Option<&LayerConfig>) -> Layer {
    let direction = config.and_then(|c| c.direction).unwrap_or_default();
    let mut layer = Layer::new(id, direction);

    let Some(config) = config else {
        return layer;
    };
    let section_count = match config.section_count {
        Some(count) if count > 0 => clamp_count(count),
        _ => return layer,
    };

    layer.sections = (1..=section_count)
        .map(|section_id| build_section(section_id, direction, config.section(section_id)))
        .collect();
    layer
}

fn build_section(
    id: u32,
    layer_direction: FlowDirection,
    config: Option<&SectionConfig>,
) -> Section {
    let mut section = Section::new(id, layer_direction.inverted());
    if let Some(config) = config {
        if config.separator {
            section.push = Some(layer_direction);
        }
        section.style = SectionStyle {
            height: config.height.clone(),
            width: config.width.clone(),
            align_items: config.align_items.clone(),
            justify_content: config.justify_content.clone(),
            flex_grow: config.flex_grow,
        };
    }
    section
}
