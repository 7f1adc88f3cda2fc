use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Up,
    Down,
    Open,
    Back,
    Refresh,
    FocusInput,
    InputChar(char),
    InputBackspace,
    InputSubmit,
    InputCancel,
    Quit,
    None,
}

pub fn map_key(key: KeyEvent, input_focused: bool) -> Command {
    if input_focused {
        return match key.code {
            KeyCode::Esc => Command::InputCancel,
            KeyCode::Enter => Command::InputSubmit,
            KeyCode::Backspace => Command::InputBackspace,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
            KeyCode::Char(c) => Command::InputChar(c),
            _ => Command::None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Char('j') | KeyCode::Down => Command::Down,
        KeyCode::Char('k') | KeyCode::Up => Command::Up,
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => Command::Open,
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace | KeyCode::Esc => Command::Back,
        KeyCode::Char('r') => Command::Refresh,
        KeyCode::Char('/') => Command::FocusInput,
        _ => Command::None,
    }
}
