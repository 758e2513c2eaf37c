//! Tool system for the reference canvas.

use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    /// Click on empty canvas to place a text note.
    Text,
    /// Drag a rectangle to create a canvas group.
    CanvasGroup,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Text => "Text",
            ToolKind::CanvasGroup => "Canvas",
        }
    }

    /// Whether the tool goes back to Select after one use.
    pub fn is_one_shot(self) -> bool {
        !matches!(self, ToolKind::Select)
    }
}

/// Holds the current tool.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    pub current_tool: ToolKind,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.current_tool != tool {
            log::debug!("Tool changed to {}", tool.name());
        }
        self.current_tool = tool;
    }

    /// Revert a one-shot tool to Select after it was used.
    pub fn finish_use(&mut self) {
        if self.current_tool.is_one_shot() {
            self.set_tool(ToolKind::Select);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_tools_revert() {
        let mut tools = ToolManager::new();
        tools.set_tool(ToolKind::Text);
        tools.finish_use();
        assert_eq!(tools.current_tool, ToolKind::Select);
        tools.finish_use();
        assert_eq!(tools.current_tool, ToolKind::Select);
    }
}
