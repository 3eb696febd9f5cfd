//! 键盘事件映射 (Input -> Action)
//!
//! 将按键事件转换为 Action

use std::io;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::actions::Action;
use super::state::{App, AppMode, InputField, Screen};

/// 根据当前页面、模式和按键获取对应的 Action
pub fn get_action(screen: Screen, mode: &AppMode, field: &InputField, key: KeyEvent) -> Option<Action> {
    match mode {
        AppMode::Normal => match screen {
            Screen::Setup => match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelectionDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelectionUp),
                KeyCode::Enter => Some(Action::StartExercise),
                KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::SpeedUp),
                KeyCode::Char('-') => Some(Action::SpeedDown),
                KeyCode::Char('>') | KeyCode::Char('.') => Some(Action::DelayUp),
                KeyCode::Char('<') | KeyCode::Char(',') => Some(Action::DelayDown),
                KeyCode::Char('r') => Some(Action::ToggleShuffle),
                KeyCode::Char('l') => Some(Action::ShowLists),
                KeyCode::Char('o') => Some(Action::StartSelectFolder),
                _ => None,
            },
            Screen::Lists => match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Esc => Some(Action::ShowSetup),
                KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveSelectionDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveSelectionUp),
                KeyCode::Char('a') => Some(Action::StartAddList),
                KeyCode::Char('e') => Some(Action::StartEditList),
                KeyCode::Char('d') => Some(Action::StartDeleteList),
                KeyCode::Char('i') => Some(Action::StartImport),
                KeyCode::Char('x') => Some(Action::StartExport),
                KeyCode::Char('o') => Some(Action::StartSelectFolder),
                _ => None,
            },
            Screen::Exercise => match key.code {
                KeyCode::Char(' ') => Some(Action::TogglePause),
                KeyCode::Right => Some(Action::NextWord),
                KeyCode::Esc => Some(Action::StopExercise),
                _ => None,
            },
        },
        AppMode::EditingList(_) => match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Submit)
            }
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => match field {
                InputField::Name => Some(Action::Submit),
                InputField::Words => Some(Action::NewLine),
            },
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::PathPrompt(_) => match key.code {
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        AppMode::Confirm(_) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Submit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
    }
}

/// 处理按键事件
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> io::Result<bool> {
    if let Some(action) = get_action(app.screen, &app.mode, &app.input_field, key) {
        Ok(app.dispatch(action))
    } else {
        Ok(false)
    }
}
