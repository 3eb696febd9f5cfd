//! App 状态定义 (Model)
//!
//! 包含应用状态结构体及相关枚举

use rand::rngs::ThreadRng;

use super::surface::WordPanel;
use crate::exercise::{ExerciseScheduler, SystemClock};
use crate::models::WordList;
use crate::settings::{Preferences, TomlSettings};
use crate::storage::{FsStore, ListRepository};

pub type Scheduler = ExerciseScheduler<WordPanel, SystemClock, ThreadRng>;

/// 应用状态
pub struct App {
    pub repository: ListRepository<FsStore>,
    pub scheduler: Scheduler,
    pub settings: TomlSettings,
    pub prefs: Preferences,
    pub screen: Screen,
    pub mode: AppMode,
    pub selected_index: usize,
    pub display_list: Vec<String>, // 按名称排序的列表 id
    pub input_buffer: String,
    pub input_field: InputField,
    pub message: Option<String>,
    pub temp_name: String, // 切换到单词输入时暂存名称
}

/// 页面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Lists,
    Exercise,
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    EditingList(Option<String>), // None 表示新建，否则为被编辑列表的 id
    PathPrompt(PathPurpose),
    Confirm(ConfirmAction),
}

/// 路径输入的用途
#[derive(Debug, Clone, PartialEq)]
pub enum PathPurpose {
    SelectFolder,
    Import,
    Export(String), // 列表 id
}

/// 确认操作类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmAction {
    Delete(String),
    ReplaceImport(WordList),
}

/// 输入字段类型
#[derive(Debug, Clone, PartialEq)]
pub enum InputField {
    Name,
    Words,
}

impl App {
    /// 创建新的应用实例
    pub fn new(
        repository: ListRepository<FsStore>,
        settings: TomlSettings,
        prefs: Preferences,
    ) -> Self {
        let mut app = Self {
            repository,
            scheduler: ExerciseScheduler::new(
                WordPanel::default(),
                SystemClock::new(),
                rand::rng(),
            ),
            settings,
            prefs,
            screen: Screen::Setup,
            mode: AppMode::Normal,
            selected_index: 0,
            display_list: Vec::new(),
            input_buffer: String::new(),
            input_field: InputField::Name,
            message: None,
            temp_name: String::new(),
        };
        app.refresh_display_list();
        app
    }

    /// 刷新显示列表
    pub fn refresh_display_list(&mut self) {
        self.display_list = self
            .repository
            .lists()
            .iter()
            .map(|list| list.id().to_string())
            .collect();

        // 确保选中索引有效
        if self.display_list.is_empty() {
            self.selected_index = 0;
        } else if self.selected_index >= self.display_list.len() {
            self.selected_index = self.display_list.len() - 1;
        }
    }

    /// 获取当前选中的列表
    pub fn selected_list(&self) -> Option<&WordList> {
        self.display_list
            .get(self.selected_index)
            .and_then(|id| self.repository.get(id).ok())
    }

    /// 获取当前选中的列表 id
    pub fn selected_list_id(&self) -> Option<String> {
        self.display_list.get(self.selected_index).cloned()
    }

    /// 选中指定 id 的列表
    pub fn select_list(&mut self, id: &str) {
        if let Some(index) = self.display_list.iter().position(|x| x == id) {
            self.selected_index = index;
        }
    }
}
