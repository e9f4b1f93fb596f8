use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub label: &'static str,
    pub description: &'static str,
}

impl KeyBinding {
    pub fn new(
        key: KeyCode,
        modifiers: KeyModifiers,
        label: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            modifiers,
            label,
            description,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code && self.modifiers == event.modifiers
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: KeyBinding,
    pub help: KeyBinding,
    pub submit: KeyBinding,
    pub newline: KeyBinding,
    pub newline_alt: KeyBinding,
    pub next_sample: KeyBinding,
    pub scroll_up: KeyBinding,
    pub scroll_down: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: KeyBinding::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                "Ctrl+C",
                "Quit application",
            ),
            help: KeyBinding::new(
                KeyCode::Char('g'),
                KeyModifiers::CONTROL,
                "Ctrl+G",
                "Show/hide help",
            ),
            submit: KeyBinding::new(
                KeyCode::Enter,
                KeyModifiers::NONE,
                "Enter",
                "Send message (or the selected sample question)",
            ),
            newline: KeyBinding::new(
                KeyCode::Enter,
                KeyModifiers::SHIFT,
                "Shift+Enter",
                "Insert a line break",
            ),
            newline_alt: KeyBinding::new(
                KeyCode::Enter,
                KeyModifiers::ALT,
                "Alt+Enter",
                "Insert a line break",
            ),
            next_sample: KeyBinding::new(
                KeyCode::Tab,
                KeyModifiers::NONE,
                "Tab",
                "Select next sample question",
            ),
            scroll_up: KeyBinding::new(
                KeyCode::PageUp,
                KeyModifiers::NONE,
                "PgUp",
                "Scroll history up",
            ),
            scroll_down: KeyBinding::new(
                KeyCode::PageDown,
                KeyModifiers::NONE,
                "PgDn",
                "Scroll history down",
            ),
        }
    }
}

impl KeyMap {
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.quit.matches(event)
    }

    pub fn should_show_help(&self, event: &KeyEvent) -> bool {
        self.help.matches(event)
    }

    pub fn is_submit(&self, event: &KeyEvent) -> bool {
        self.submit.matches(event)
    }

    pub fn is_newline(&self, event: &KeyEvent) -> bool {
        self.newline.matches(event) || self.newline_alt.matches(event)
    }

    fn bindings(&self) -> [&KeyBinding; 8] {
        [
            &self.submit,
            &self.newline,
            &self.newline_alt,
            &self.next_sample,
            &self.scroll_up,
            &self.scroll_down,
            &self.help,
            &self.quit,
        ]
    }

    /// Get help text for all key bindings
    pub fn help_text(&self) -> String {
        self.bindings()
            .iter()
            .map(|b| format!("{:<12} {}", b.label, b.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_variants() {
        let keys = KeyMap::default();
        let plain = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        let shifted = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        let alt = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);

        assert!(keys.is_submit(&plain));
        assert!(!keys.is_newline(&plain));
        assert!(keys.is_newline(&shifted));
        assert!(keys.is_newline(&alt));
        assert!(!keys.is_submit(&shifted));
    }

    #[test]
    fn test_quit_needs_control() {
        let keys = KeyMap::default();
        assert!(keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!keys.should_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_help_text_lists_every_binding() {
        let text = KeyMap::default().help_text();
        assert_eq!(text.lines().count(), 8);
        assert!(text.contains("Ctrl+C"));
        assert!(text.contains("Shift+Enter"));
    }
}
