//! Key bindings.

use afetch::session::Intent;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Decode a key press into a session intent.
pub fn map_key(key: KeyEvent) -> Option<Intent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Intent::Interrupt)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(Intent::Interrupt),
        KeyCode::Up | KeyCode::Char('k') => Some(Intent::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Intent::Down),
        KeyCode::Enter => Some(Intent::Select),
        KeyCode::Char(' ') => Some(Intent::Toggle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(map_key(press(KeyCode::Up)), Some(Intent::Up));
        assert_eq!(map_key(press(KeyCode::Char('k'))), Some(Intent::Up));
        assert_eq!(map_key(press(KeyCode::Down)), Some(Intent::Down));
        assert_eq!(map_key(press(KeyCode::Char('j'))), Some(Intent::Down));
        assert_eq!(map_key(press(KeyCode::Enter)), Some(Intent::Select));
        assert_eq!(map_key(press(KeyCode::Char(' '))), Some(Intent::Toggle));
    }

    #[test]
    fn test_interrupt_keys() {
        assert_eq!(map_key(press(KeyCode::Char('q'))), Some(Intent::Interrupt));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Intent::Interrupt)
        );
        assert_eq!(map_key(press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut key = press(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key), None);
    }
}
