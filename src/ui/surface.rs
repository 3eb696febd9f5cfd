//! 练习画面的显示内容

use crate::exercise::DisplaySurface;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PanelContent {
    #[default]
    Empty,
    Word(String),
    Blank,
    Paused,
}

/// 调度器写入、视图读取的单词面板
#[derive(Debug, Clone, Default)]
pub struct WordPanel {
    content: PanelContent,
}

impl WordPanel {
    pub fn content(&self) -> &PanelContent {
        &self.content
    }
}

impl DisplaySurface for WordPanel {
    fn show_word(&mut self, word: &str) {
        self.content = PanelContent::Word(word.to_string());
    }

    fn show_blank(&mut self) {
        self.content = PanelContent::Blank;
    }

    fn show_paused(&mut self) {
        self.content = PanelContent::Paused;
    }
}
