use crate::error::Result;
use crate::widget::{PanelWidget, WidgetAddress, WidgetContext};

/// Static text at a fixed address.
#[derive(Debug, Clone)]
pub struct LabelWidget {
    name: String,
    address: WidgetAddress,
    text: String,
}

impl LabelWidget {
    pub fn new(name: impl Into<String>, address: WidgetAddress, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address,
            text: text.into(),
        }
    }
}

impl PanelWidget for LabelWidget {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> WidgetAddress {
        self.address.clone()
    }

    fn render(&mut self, ctx: &mut WidgetContext<'_>) -> Result<()> {
        ctx.set_content(self.text.clone());
        Ok(())
    }
}
