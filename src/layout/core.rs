use blake3::Hash;

use crate::config::FlowDirection;
use crate::placement::OrderingKey;
use crate::widget::WidgetId;

/// Shape of the realised surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Nothing built yet.
    Unbuilt,
    /// No layered layout was configured; a single plain container.
    Default,
    /// Layers and sections were materialised from the zone config.
    Layered,
}

/// Resolved style hints carried by a section container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionStyle {
    pub height: Option<String>,
    pub width: Option<String>,
    pub align_items: Option<String>,
    pub justify_content: Option<String>,
    pub flex_grow: Option<f32>,
}

/// A placed widget's root element inside a section.
#[derive(Debug, Clone)]
pub struct WidgetSlot {
    pub widget: WidgetId,
    pub name: String,
    pub sort_key: Option<OrderingKey>,
    /// Set when the widget is a separator: its element is pushed to the far
    /// end of this flow direction.
    pub push: Option<FlowDirection>,
    content: String,
    hash: Option<Hash>,
    dirty: bool,
}

impl WidgetSlot {
    pub fn new(widget: WidgetId, name: impl Into<String>) -> Self {
        Self {
            widget,
            name: name.into(),
            sort_key: None,
            push: None,
            content: String::new(),
            hash: None,
            dirty: false,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_positioned(&self) -> bool {
        self.sort_key.is_some()
    }

    /// Returns `true` when the content actually changed.
    fn update_content(&mut self, content: String) -> bool {
        let new_hash = blake3::hash(content.as_bytes());
        if self.hash.map(|h| h != new_hash).unwrap_or(true) {
            self.content = content;
            self.hash = Some(new_hash);
            self.dirty = true;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone)]
pub struct Section {
    pub id: u32,
    pub direction: FlowDirection,
    pub style: SectionStyle,
    /// Separator sections are pushed to the trailing edge of the layer's flow.
    pub push: Option<FlowDirection>,
    pub(crate) slots: Vec<WidgetSlot>,
}

impl Section {
    pub fn new(id: u32, direction: FlowDirection) -> Self {
        Self {
            id,
            direction,
            style: SectionStyle::default(),
            push: None,
            slots: Vec::new(),
        }
    }

    pub fn slots(&self) -> &[WidgetSlot] {
        &self.slots
    }

    pub fn widget_ids(&self) -> Vec<WidgetId> {
        self.slots.iter().map(|slot| slot.widget).collect()
    }

    pub fn widget_names(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.name.as_str()).collect()
    }

    /// Number of leading slots that carry a sort key.
    pub fn positioned_len(&self) -> usize {
        self.slots.iter().take_while(|slot| slot.is_positioned()).count()
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    pub id: u32,
    pub direction: FlowDirection,
    pub(crate) sections: Vec<Section>,
}

impl Layer {
    pub fn new(id: u32, direction: FlowDirection) -> Self {
        Self {
            id,
            direction,
            sections: Vec::new(),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: u32) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }
}

/// Realised panel hierarchy: layers → sections → widget slots.
#[derive(Debug, Clone)]
pub struct PanelTree {
    kind: SurfaceKind,
    pub(crate) layers: Vec<Layer>,
}

impl Default for PanelTree {
    fn default() -> Self {
        Self::unbuilt()
    }
}

impl PanelTree {
    pub fn unbuilt() -> Self {
        Self {
            kind: SurfaceKind::Unbuilt,
            layers: Vec::new(),
        }
    }

    pub(crate) fn default_container() -> Self {
        Self {
            kind: SurfaceKind::Default,
            layers: Vec::new(),
        }
    }

    pub(crate) fn layered(layers: Vec<Layer>) -> Self {
        Self {
            kind: SurfaceKind::Layered,
            layers,
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    pub fn is_built(&self) -> bool {
        self.kind != SurfaceKind::Unbuilt
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: u32) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn section(&self, layer: u32, section: u32) -> Option<&Section> {
        self.layer(layer).and_then(|l| l.section(section))
    }

    pub(crate) fn section_mut(&mut self, layer: u32, section: u32) -> Option<&mut Section> {
        self.layers
            .iter_mut()
            .find(|l| l.id == layer)?
            .sections
            .iter_mut()
            .find(|s| s.id == section)
    }

    pub fn section_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.sections.len()).sum()
    }

    pub fn slot(&self, widget: WidgetId) -> Option<&WidgetSlot> {
        self.slots().find(|slot| slot.widget == widget)
    }

    pub fn contains(&self, widget: WidgetId) -> bool {
        self.slot(widget).is_some()
    }

    pub fn content_of(&self, widget: WidgetId) -> Option<&str> {
        self.slot(widget).map(WidgetSlot::content)
    }

    /// Replace a widget's rendered content. Returns `true` if it changed.
    pub fn set_content(&mut self, widget: WidgetId, content: impl Into<String>) -> bool {
        match self.slots_mut().find(|slot| slot.widget == widget) {
            Some(slot) => slot.update_content(content.into()),
            None => false,
        }
    }

    /// Drain the set of slots whose content changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<(WidgetId, String)> {
        self.slots_mut()
            .filter(|slot| slot.dirty)
            .map(|slot| {
                slot.dirty = false;
                (slot.widget, slot.content.clone())
            })
            .collect()
    }

    fn slots(&self) -> impl Iterator<Item = &WidgetSlot> {
        self.layers
            .iter()
            .flat_map(|layer| layer.sections.iter())
            .flat_map(|section| section.slots.iter())
    }

    fn slots_mut(&mut self) -> impl Iterator<Item = &mut WidgetSlot> {
        self.layers
            .iter_mut()
            .flat_map(|layer| layer.sections.iter_mut())
            .flat_map(|section| section.slots.iter_mut())
    }
}
