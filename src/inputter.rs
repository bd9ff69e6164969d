use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// What the form should do after a key was fed into the field editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Edited,
    NextField,
    PrevField,
    Submit,
    Cancel,
}

/// Single line editor for one form field.
#[derive(Debug, Default)]
pub struct Inputter {
    current_input: String,
    cursor_pos: usize, // In chars, not bytes
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputAction {
        let action = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => InputAction::Submit,
            (KeyCode::Esc, _) => InputAction::Cancel,
            (KeyCode::Tab, _) | (KeyCode::Down, _) => InputAction::NextField,
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => InputAction::PrevField,
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (kc, km) => self.key(kc, km),
        };
        trace!("Input {:?} => {action:?} \"{}\"", key.code, self.current_input);
        action
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.cursor_pos = self.current_input.chars().count();
    }

    pub fn get(&self) -> &str {
        &self.current_input
    }

    pub fn cursor(&self) -> usize {
        self.cursor_pos
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.cursor_pos = 0;
    }

    fn backspace(&mut self) -> InputAction {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let at = self.byte_pos();
            self.current_input.remove(at);
        }
        InputAction::Edited
    }

    fn delete(&mut self) -> InputAction {
        if self.cursor_pos < self.current_input.chars().count() {
            let at = self.byte_pos();
            self.current_input.remove(at);
        }
        InputAction::Edited
    }

    fn left(&mut self) -> InputAction {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
        InputAction::Edited
    }

    fn right(&mut self) -> InputAction {
        if self.cursor_pos < self.current_input.chars().count() {
            self.cursor_pos += 1;
        }
        InputAction::Edited
    }

    fn home(&mut self) -> InputAction {
        self.cursor_pos = 0;
        InputAction::Edited
    }

    fn end(&mut self) -> InputAction {
        self.cursor_pos = self.current_input.chars().count();
        InputAction::Edited
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputAction {
        if modifier.contains(KeyModifiers::CONTROL) {
            return InputAction::Edited;
        }
        if let Some(chr) = code.as_char() {
            let at = self.byte_pos();
            self.current_input.insert(at, chr);
            self.cursor_pos += 1;
        }
        InputAction::Edited
    }

    fn byte_pos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputAction {
        inputter.read(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(inputter: &mut Inputter, s: &str) {
        for c in s.chars() {
            press(inputter, KeyCode::Char(c));
        }
    }

    #[test]
    fn inserts_at_cursor() {
        let mut input = Inputter::default();
        type_str(&mut input, "Bb");
        press(&mut input, KeyCode::Left);
        type_str(&mut input, "o");
        assert_eq!(input.get(), "Bob");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_removes_before_cursor() {
        let mut input = Inputter::default();
        input.set("Müller");
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.get(), "Müllr");
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Backspace);
        press(&mut input, KeyCode::Delete);
        assert_eq!(input.get(), "üllr");
    }

    #[test]
    fn navigation_keys_map_to_actions() {
        let mut input = Inputter::default();
        assert_eq!(press(&mut input, KeyCode::Tab), InputAction::NextField);
        assert_eq!(press(&mut input, KeyCode::Up), InputAction::PrevField);
        assert_eq!(press(&mut input, KeyCode::Enter), InputAction::Submit);
        assert_eq!(press(&mut input, KeyCode::Esc), InputAction::Cancel);
    }

    #[test]
    fn clear_resets_cursor() {
        let mut input = Inputter::default();
        input.set("abc");
        input.clear();
        assert_eq!(input.get(), "");
        assert_eq!(input.cursor(), 0);
    }
}
