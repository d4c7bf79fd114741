use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Left,
    Right,
    Enter,
    Escape,
    Backspace,
    Char(char),
    ToggleWatch,
    ShowLogs,
    Describe,
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return map_control_key(key.code);
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Up => Some(Action::Up),
        KeyCode::Down => Some(Action::Down),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::Home => Some(Action::Top),
        KeyCode::End => Some(Action::Bottom),
        KeyCode::Left => Some(Action::Left),
        KeyCode::Right => Some(Action::Right),
        KeyCode::Enter => Some(Action::Enter),
        KeyCode::Esc => Some(Action::Escape),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => Some(Action::Char(c)),
        _ => None,
    }
}

fn map_control_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') => Some(Action::Quit),
        KeyCode::Char('w') => Some(Action::ToggleWatch),
        KeyCode::Char('l') => Some(Action::ShowLogs),
        KeyCode::Char('d') => Some(Action::Describe),
        KeyCode::Char('e') => Some(Action::Edit),
        _ => None,
    }
}

// Vim-style letters double as cursor keys wherever a list or viewer owns navigation.
pub fn motion(action: Action) -> Option<Motion> {
    match action {
        Action::Up | Action::Char('k') => Some(Motion::Up),
        Action::Down | Action::Char('j') => Some(Motion::Down),
        Action::PageUp => Some(Motion::PageUp),
        Action::PageDown => Some(Motion::PageDown),
        Action::Top | Action::Char('g') => Some(Motion::Top),
        Action::Bottom | Action::Char('G') => Some(Motion::Bottom),
        _ => None,
    }
}
