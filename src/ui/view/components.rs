//! 通用 UI 组件
//!
//! 对话框、输入框、设置行等

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

/// [组件] 弹窗基础框架，返回内部区域
pub fn render_dialog_framework(frame: &mut Frame, area: Rect, title: &str, color: Color) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// [组件] 输入框，聚焦时在末尾显示光标
pub fn render_input_widget(frame: &mut Frame, area: Rect, title: &str, value: &str, is_focused: bool) {
    let (style, text) = if is_focused {
        (
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            format!("{}▏", value),
        )
    } else {
        (Style::default().fg(Color::Gray), value.to_string())
    };

    let input = Paragraph::new(text)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(input, area);
}

/// [组件] 居中的提示文本
pub fn render_hint(frame: &mut Frame, area: Rect, hint: &str) {
    let paragraph = Paragraph::new(hint)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// [组件] "标签: 值" 形式的一行
pub fn setting_line<'a>(label: &'a str, value: String, key_hint: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<8}", label), Style::default().fg(Color::Gray)),
        Span::styled(
            value,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", key_hint), Style::default().fg(Color::DarkGray)),
    ])
}
