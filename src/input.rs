use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    Pause,
    Resume,
    NextSymbol,
    PrevSymbol,
    SwitchBucket(&'static str),
}

pub fn parse_main_command(key_code: &KeyCode) -> Option<UiCommand> {
    match key_code {
        KeyCode::Tab | KeyCode::Right => Some(UiCommand::NextSymbol),
        KeyCode::BackTab | KeyCode::Left => Some(UiCommand::PrevSymbol),
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'q' => Some(UiCommand::Quit),
            'p' => Some(UiCommand::Pause),
            'r' => Some(UiCommand::Resume),
            '1' => Some(UiCommand::SwitchBucket("15s")),
            '2' => Some(UiCommand::SwitchBucket("1m")),
            '3' => Some(UiCommand::SwitchBucket("5m")),
            _ => None,
        },
        _ => None,
    }
}
