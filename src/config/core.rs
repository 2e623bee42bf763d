use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;
use crate::logging::Logger;

pub const DEFAULT_SETTLE_MS: u64 = 300;
pub const DEFAULT_POINTER_DWELL_MS: u64 = 2000;
pub const DEFAULT_TOUCH_DWELL_MS: u64 = 3000;

/// Flow direction of a layer or section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    Row,
    #[default]
    Column,
}

impl FlowDirection {
    /// The crosswise direction (sections flow across their layer).
    pub fn inverted(self) -> Self {
        match self {
            Self::Row => Self::Column,
            Self::Column => Self::Row,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

/// Primary input modality of the device hosting the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    #[default]
    Pointer,
    Touch,
}

/// Style hints for a single section. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfig {
    pub id: u32,
    #[serde(default)]
    pub separator: bool,
    pub height: Option<String>,
    pub width: Option<String>,
    pub align_items: Option<String>,
    pub justify_content: Option<String>,
    pub flex_grow: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    pub id: u32,
    #[serde(rename = "flexDirection")]
    pub direction: Option<FlowDirection>,
    #[serde(rename = "sectionsQuantity")]
    pub section_count: Option<i64>,
    #[serde(rename = "sectionsConfig", default)]
    pub sections: Vec<SectionConfig>,
}

impl LayerConfig {
    pub fn section(&self, id: u32) -> Option<&SectionConfig> {
        self.sections.iter().find(|section| section.id == id)
    }
}

/// Declarative zone layout. Ids are 1-based; absent entries take defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ZoneConfig {
    #[serde(rename = "layersQuantity")]
    pub layer_count: Option<i64>,
    #[serde(rename = "layersConfig", default)]
    pub layers: Vec<LayerConfig>,
}

impl ZoneConfig {
    pub fn layered(layer_count: u32) -> Self {
        Self {
            layer_count: Some(i64::from(layer_count)),
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: LayerConfig) -> Self {
        self.layers.retain(|existing| existing.id != layer.id);
        self.layers.push(layer);
        self
    }

    pub fn layer(&self, id: u32) -> Option<&LayerConfig> {
        self.layers.iter().find(|layer| layer.id == id)
    }
}

/// Address override applied on top of a widget's own declaration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WidgetOverride {
    pub layer: Option<u32>,
    pub section: Option<u32>,
    pub position: Option<serde_json::Value>,
    pub separator: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingConfig {
    pub settle_ms: u64,
    pub pointer_dwell_ms: u64,
    pub touch_dwell_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: DEFAULT_SETTLE_MS,
            pointer_dwell_ms: DEFAULT_POINTER_DWELL_MS,
            touch_dwell_ms: DEFAULT_TOUCH_DWELL_MS,
        }
    }
}

impl TimingConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn dwell(&self, device: DeviceProfile) -> Duration {
        match device {
            DeviceProfile::Pointer => Duration::from_millis(self.pointer_dwell_ms),
            DeviceProfile::Touch => Duration::from_millis(self.touch_dwell_ms),
        }
    }
}

/// Full option object handed to the panel by the host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    #[serde(flatten)]
    pub zones: ZoneConfig,
    #[serde(rename = "disableBeforeVideoStarts", default)]
    pub suppress_until_start: bool,
    #[serde(default)]
    pub device: DeviceProfile,
    #[serde(default)]
    pub timings: TimingConfig,
    #[serde(rename = "components", default)]
    pub widget_overrides: HashMap<String, WidgetOverride>,
    /// Optional structured logger shared by all subsystems.
    #[serde(skip)]
    pub logger: Option<Logger>,
}

impl PanelConfig {
    pub fn new(zones: ZoneConfig) -> Self {
        Self {
            zones,
            ..Self::default()
        }
    }

    /// Parse the host's JSON option object.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_device(mut self, device: DeviceProfile) -> Self {
        self.device = device;
        self
    }

    pub fn suppress_until_start(mut self, enabled: bool) -> Self {
        self.suppress_until_start = enabled;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_override(mut self, widget: impl Into<String>, value: WidgetOverride) -> Self {
        self.widget_overrides.insert(widget.into(), value);
        self
    }

    pub fn widget_override(&self, widget: &str) -> Option<&WidgetOverride> {
        self.widget_overrides.get(widget)
    }

    pub fn dwell(&self) -> Duration {
        self.timings.dwell(self.device)
    }
}
