//! Keyboard shortcut registry and command resolution.

use crate::input::{KeyPress, is_space};
use crate::tools::ToolKind;

/// Editor command bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetTool(ToolKind),
    DeleteSelection,
    Escape,
    SelectAll,
    Copy,
    Paste,
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: Command,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, command: Command) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
        }
    }

    fn matches(&self, press: &KeyPress) -> bool {
        if !self.key.eq_ignore_ascii_case(&press.key) || self.ctrl != press.modifiers.command() {
            return false;
        }
        // Shift only matters where a binding distinguishes it
        !self.shift || press.modifiers.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// All shortcuts, most specific first.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("v", false, false, Command::SetTool(ToolKind::Select)),
            Shortcut::new("t", false, false, Command::SetTool(ToolKind::Text)),
            Shortcut::new("c", false, false, Command::SetTool(ToolKind::CanvasGroup)),
            Shortcut::new("Delete", false, false, Command::DeleteSelection),
            Shortcut::new("Backspace", false, false, Command::DeleteSelection),
            Shortcut::new("Escape", false, false, Command::Escape),
            Shortcut::new("a", true, false, Command::SelectAll),
            Shortcut::new("c", true, false, Command::Copy),
            Shortcut::new("v", true, false, Command::Paste),
            Shortcut::new("z", true, true, Command::Redo),
            Shortcut::new("z", true, false, Command::Undo),
            Shortcut::new("y", true, false, Command::Redo),
            Shortcut::new("+", true, false, Command::ZoomIn),
            Shortcut::new("=", true, false, Command::ZoomIn),
            Shortcut::new("-", true, false, Command::ZoomOut),
            Shortcut::new("0", true, false, Command::ZoomReset),
        ]
    }

    /// Resolve a key press to a command.
    ///
    /// Nothing resolves while a text field has focus, except Escape which
    /// ends the edit.
    pub fn resolve(press: &KeyPress) -> Option<Command> {
        if press.text_field_focused {
            return (press.key == "Escape").then_some(Command::Escape);
        }
        if is_space(&press.key) {
            return None;
        }
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(press))
            .map(|shortcut| shortcut.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn press(key: &str, modifiers: Modifiers) -> KeyPress {
        KeyPress::new(key).with_modifiers(modifiers)
    }

    #[test]
    fn test_tool_keys() {
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::new("t")),
            Some(Command::SetTool(ToolKind::Text))
        );
        assert_eq!(
            ShortcutRegistry::resolve(&press("c", Modifiers::ctrl())),
            Some(Command::Copy)
        );
    }

    #[test]
    fn test_undo_redo_keys() {
        let ctrl_shift = Modifiers {
            ctrl: true,
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutRegistry::resolve(&press("z", Modifiers::ctrl())), Some(Command::Undo));
        assert_eq!(ShortcutRegistry::resolve(&press("Z", ctrl_shift)), Some(Command::Redo));
        assert_eq!(ShortcutRegistry::resolve(&press("y", Modifiers::ctrl())), Some(Command::Redo));
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutRegistry::resolve(&press("z", cmd)), Some(Command::Undo));
    }

    #[test]
    fn test_text_field_blocks_shortcuts() {
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::new("Delete").in_text_field()), None);
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::new("Escape").in_text_field()),
            Some(Command::Escape)
        );
    }

    #[test]
    fn test_every_tool_has_a_key() {
        let tools: Vec<ToolKind> = ShortcutRegistry::all()
            .into_iter()
            .filter_map(|shortcut| match shortcut.command {
                Command::SetTool(tool) if !shortcut.ctrl => Some(tool),
                _ => None,
            })
            .collect();
        assert_eq!(tools, vec![ToolKind::Select, ToolKind::Text, ToolKind::CanvasGroup]);
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::new("V")),
            Some(Command::SetTool(ToolKind::Select))
        );
    }
}
