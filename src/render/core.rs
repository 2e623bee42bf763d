use crate::layout::{PanelTree, Section, SurfaceKind, WidgetSlot};
use crate::runtime::MediaControl;
use crate::visibility::VisibilityState;

use super::width::{display_width, pad_to, truncate_to};

/// Outline renderer parameters.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Lines longer than this are cut.
    pub max_width: Option<usize>,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            indent: 2,
            max_width: None,
        }
    }
}

/// Renders the panel as an indented outline, one line per layer, section and
/// widget slot.
#[derive(Debug, Clone, Default)]
pub struct OutlineRenderer {
    settings: RendererSettings,
}

impl OutlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    pub fn render(&self, panel: &MediaControl) -> String {
        let mut lines = vec![format!(
            "{} {}",
            panel.name(),
            visibility_label(panel.visibility())
        )];
        self.render_tree(panel.tree(), &mut lines);

        if let Some(width) = self.settings.max_width {
            for line in &mut lines {
                truncate_to(line, width);
            }
        }
        lines.join("\n")
    }

    fn render_tree(&self, tree: &PanelTree, lines: &mut Vec<String>) {
        match tree.kind() {
            SurfaceKind::Unbuilt => lines.push(self.indented(1, "(not rendered)")),
            SurfaceKind::Default => lines.push(self.indented(1, "(default container)")),
            SurfaceKind::Layered => {
                let name_width = name_column(tree);
                for layer in tree.layers() {
                    lines.push(self.indented(
                        1,
                        &format!("layer {} ({})", layer.id, layer.direction.as_str()),
                    ));
                    for section in layer.sections() {
                        lines.push(self.indented(2, &section_label(section)));
                        for slot in section.slots() {
                            lines.push(self.indented(3, &slot_label(slot, name_width)));
                        }
                    }
                }
            }
        }
    }

    fn indented(&self, depth: usize, text: &str) -> String {
        format!("{}{}", " ".repeat(depth * self.settings.indent), text)
    }
}

fn visibility_label(state: VisibilityState) -> &'static str {
    match state {
        VisibilityState::Hidden => "[hidden]",
        VisibilityState::Visible => "[visible]",
        VisibilityState::VisibleKeptAlive => "[visible, kept alive]",
    }
}

fn section_label(section: &Section) -> String {
    let mut label = format!("section {} ({})", section.id, section.direction.as_str());
    if let Some(push) = section.push {
        label.push_str(&format!(" push={}", push.as_str()));
    }
    label
}

fn slot_label(slot: &WidgetSlot, name_width: usize) -> String {
    let mut label = slot.name.clone();
    if let Some(push) = slot.push {
        label.push_str(&format!(" push={}", push.as_str()));
    }
    if slot.content().is_empty() {
        return label;
    }
    pad_to(&mut label, name_width + 2);
    label.push_str(slot.content());
    label
}

fn name_column(tree: &PanelTree) -> usize {
    tree.layers()
        .iter()
        .flat_map(|layer| layer.sections())
        .flat_map(|section| section.slots())
        .map(|slot| {
            let push = slot
                .push
                .map(|push| " push=".len() + push.as_str().len())
                .unwrap_or(0);
            display_width(&slot.name) + push
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlowDirection, LayerConfig, PanelConfig, SectionConfig, ZoneConfig};
    use crate::runtime::PlayerHost;
    use crate::widget::WidgetAddress;
    use crate::widgets::LabelWidget;

    fn config() -> PanelConfig {
        PanelConfig::new(ZoneConfig::layered(1).with_layer(LayerConfig {
            id: 1,
            direction: Some(FlowDirection::Row),
            section_count: Some(2),
            sections: vec![SectionConfig {
                id: 2,
                separator: true,
                ..SectionConfig::default()
            }],
        }))
    }

    #[test]
    fn unrendered_panel_has_placeholder() {
        let host = PlayerHost::new(config());
        let outline = host.outline();
        assert_eq!(outline, "media_control [visible]\n  (not rendered)");
    }

    #[test]
    fn outline_lists_layers_sections_and_widgets() {
        let mut host = PlayerHost::new(config());
        host.attach(LabelWidget::new("title", WidgetAddress::new(1, 1).at(1), "Big Buck Bunny"));
        host.attach(LabelWidget::new("hd", WidgetAddress::new(1, 2), "HD"));
        host.render();

        let expected = [
            "media_control [visible]",
            "  layer 1 (row)",
            "    section 1 (column)",
            "      title  Big Buck Bunny",
            "    section 2 (column) push=row",
            "      hd     HD",
        ]
        .join("\n");
        assert_eq!(host.outline(), expected);
    }

    #[test]
    fn long_lines_are_cut() {
        let mut host = PlayerHost::new(config());
        host.attach(LabelWidget::new("title", WidgetAddress::new(1, 1), "Big Buck Bunny"));
        host.render();

        let renderer = OutlineRenderer::with_settings(RendererSettings {
            indent: 1,
            max_width: Some(12),
        });
        let outline = renderer.render(host.media_control());
        assert!(outline.lines().all(|line| display_width(line) <= 12));
        assert!(outline.contains("   title  B"));
    }
}
