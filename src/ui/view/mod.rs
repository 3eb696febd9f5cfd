//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件

pub mod components;
pub mod layouts;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
};

use super::state::{App, AppMode, ConfirmAction, InputField, PathPurpose, Screen};
use super::surface::PanelContent;
use crate::exercise::SchedulerState;
use components::{render_dialog_framework, render_hint, render_input_widget, setting_line};
use layouts::{centered_rect, centered_rows};

const PREVIEW_WORDS: usize = 10;

/// 渲染 UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Min(10),   // 主体
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    render_title(frame, app, chunks[0]);
    match app.screen {
        Screen::Setup => render_setup(frame, app, chunks[1]),
        Screen::Lists => render_lists(frame, app, chunks[1]),
        Screen::Exercise => render_exercise(frame, app, chunks[1]),
    }
    render_help(frame, app, chunks[2]);

    // 渲染弹窗
    match &app.mode {
        AppMode::EditingList(id) => render_editor_dialog(frame, app, id.is_some()),
        AppMode::PathPrompt(purpose) => render_path_dialog(frame, app, purpose),
        AppMode::Confirm(action) => render_confirm_dialog(frame, action),
        AppMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let page = match app.screen {
        Screen::Setup => "练习设置",
        Screen::Lists => "列表管理",
        Screen::Exercise => "练习中",
    };
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "⚡ FlashWords",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ·  {}", page), Style::default().fg(Color::Gray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

// ============ 设置页 ============

fn render_setup(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_list_selector(frame, app, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(4)])
        .split(columns[1]);

    render_exercise_settings(frame, app, right[0]);
    render_preview(frame, app, right[1]);
}

fn render_list_selector(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .display_list
        .iter()
        .filter_map(|id| app.repository.get(id).ok())
        .map(|list| {
            ListItem::new(Line::from(vec![
                Span::raw(list.name().to_string()),
                Span::styled(
                    format!(" ({})", list.word_count()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let widget = List::new(items)
        .block(Block::default().title("选择列表").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );

    let mut state = ListState::default();
    if !app.display_list.is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(widget, area, &mut state);
}

fn render_exercise_settings(frame: &mut Frame, app: &App, area: Rect) {
    let config = app.prefs.exercise;
    let lines = vec![
        setting_line("速度", format!("{} ms", config.speed_ms), "[+/-]"),
        setting_line("间隔", format!("{} ms", config.delay_ms), "[</>]"),
        setting_line(
            "打乱",
            if config.shuffle_words { "开" } else { "关" }.to_string(),
            "[r]",
        ),
        setting_line(
            "文件夹",
            app.repository.directory().display().to_string(),
            "[o]",
        ),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().title("参数").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_list() {
        Some(list) => {
            let (words, remaining) = list.preview(PREVIEW_WORDS);
            let mut text = if words.is_empty() {
                "(空列表)".to_string()
            } else {
                words.join(", ")
            };
            if remaining > 0 {
                text.push_str(&format!(" +{} 个", remaining));
            }
            format!(
                "{}\n\n共 {} 个单词，{} 组",
                text,
                list.word_count(),
                list.groups().len()
            )
        }
        None => "暂无列表，按 'l' 管理列表或 'o' 选择文件夹".to_string(),
    };

    let preview = Paragraph::new(content)
        .block(Block::default().title("预览").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(preview, area);
}

// ============ 列表管理页 ============

fn render_lists(frame: &mut Frame, app: &App, area: Rect) {
    if app.repository.is_empty() {
        let empty = Paragraph::new(format!(
            "{} 中没有列表\n\n按 'a' 新建，'i' 导入，'o' 更换文件夹",
            app.repository.directory().display()
        ))
        .alignment(Alignment::Center)
        .block(Block::default().title("列表").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .display_list
        .iter()
        .filter_map(|id| app.repository.get(id).ok())
        .map(|list| {
            Row::new(vec![
                Cell::from(list.name().to_string()),
                Cell::from(list.word_count().to_string()),
                Cell::from(list.groups().len().to_string()),
                Cell::from(list.filename().to_string()),
                Cell::from(list.created_at().format("%Y-%m-%d %H:%M").to_string()),
            ])
        })
        .collect();

    let header = Row::new(vec!["名称", "单词", "组", "文件", "创建于"])
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Percentage(30),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!("列表 ({})", app.repository.directory().display()))
            .borders(Borders::ALL),
    )
    .row_highlight_style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = TableState::default();
    state.select(Some(app.selected_index));
    frame.render_stateful_widget(table, area, &mut state);
}

// ============ 练习页 ============

fn render_exercise(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let (text, style) = match app.scheduler.display().content() {
        PanelContent::Word(word) => (
            word.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        PanelContent::Paused => ("⏸", Style::default().fg(Color::Yellow)),
        PanelContent::Blank | PanelContent::Empty => ("", Style::default()),
    };

    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);
    frame.render_widget(
        Paragraph::new(text).style(style).alignment(Alignment::Center),
        centered_rows(1, inner),
    );

    let status = match app.scheduler.state() {
        SchedulerState::Active => "运行中",
        SchedulerState::Paused => "已暂停",
        SchedulerState::Stopped => "已停止",
    };
    let footer = match app.scheduler.session() {
        Some(session) => {
            let config = session.config();
            let source = session
                .source_list_id()
                .and_then(|id| app.repository.get(id).ok())
                .map(|list| list.name())
                .unwrap_or("-");
            format!(
                "{}  ·  {}  ·  第 {}/{} 个  ·  {}/{} ms  ·  已显示 {} 个单词",
                status,
                source,
                session.position() + 1,
                session.sequence().len(),
                config.speed_ms,
                config.delay_ms,
                session.displayed_count()
            )
        }
        None => status.to_string(),
    };
    render_hint(frame, chunks[1], &footer);
}

// ============ 帮助栏 ============

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => match app.screen {
            Screen::Setup => "[Enter] 开始  [j/k] 选择  [l] 列表管理  [o] 文件夹  [q] 退出",
            Screen::Lists => {
                "[a] 新建  [e] 编辑  [d] 删除  [i] 导入  [x] 导出  [o] 文件夹  [Esc] 返回  [q] 退出"
            }
            Screen::Exercise if app.scheduler.is_paused() => {
                "[Space] 继续  [→] 下一个  [Esc] 停止"
            }
            Screen::Exercise => "[Space] 暂停  [Esc] 停止",
        },
        AppMode::EditingList(_) => match app.input_field {
            InputField::Name => "输入名称后按 [Enter] 继续  [Esc] 取消",
            InputField::Words => "每行一个单词，----- 分组  [Ctrl+S] 保存  [Esc] 取消",
        },
        AppMode::PathPrompt(_) => "[Enter] 确认  [Esc] 取消",
        AppMode::Confirm(_) => "[y] 确认  [n] 取消",
    };

    let message = app.message.as_deref().unwrap_or("");
    let text = if message.is_empty() {
        help_text.to_string()
    } else {
        format!("{}  |  {}", help_text, message)
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

// ============ 弹窗 ============

fn render_editor_dialog(frame: &mut Frame, app: &App, is_edit: bool) {
    let area = centered_rect(70, 70, frame.area());
    let title = if is_edit { "编辑列表" } else { "新建列表" };
    let inner = render_dialog_framework(frame, area, title, Color::Cyan);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(inner);

    let is_name_active = app.input_field == InputField::Name;
    let name_val = if is_name_active {
        &app.input_buffer
    } else {
        &app.temp_name
    };
    render_input_widget(frame, chunks[0], "名称", name_val, is_name_active);

    let words_val = if is_name_active { "" } else { &app.input_buffer };
    render_input_widget(frame, chunks[1], "单词", words_val, !is_name_active);

    let hint = match app.input_field {
        InputField::Name => "输入名称后按 Enter 继续",
        InputField::Words => "每行一个单词；单独一行 ----- 表示分组",
    };
    render_hint(frame, chunks[2], hint);
}

fn render_path_dialog(frame: &mut Frame, app: &App, purpose: &PathPurpose) {
    let area = centered_rect(70, 25, frame.area());
    let title = match purpose {
        PathPurpose::SelectFolder => "选择列表文件夹",
        PathPurpose::Import => "导入 .txt 文件",
        PathPurpose::Export(_) => "导出到",
    };
    let inner = render_dialog_framework(frame, area, title, Color::Cyan);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(inner);

    render_input_widget(frame, chunks[0], "路径", &app.input_buffer, true);
    render_hint(frame, chunks[1], "支持 ~ 开头的路径");
}

fn render_confirm_dialog(frame: &mut Frame, action: &ConfirmAction) {
    let area = centered_rect(50, 20, frame.area());
    let inner = render_dialog_framework(frame, area, "⚠️ 确认操作", Color::Red);

    let message = match action {
        ConfirmAction::Delete(id) => format!("确认删除列表 \"{}\"？", id),
        ConfirmAction::ReplaceImport(list) => {
            format!("已存在 {}，是否用导入的内容替换？", list.filename())
        }
    };

    let dialog = Paragraph::new(format!("{}\n\n[y] 确认  [n] 取消", message))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
    frame.render_widget(dialog, inner);
}
