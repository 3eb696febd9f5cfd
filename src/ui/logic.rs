//! 业务逻辑处理 (Update/Dispatch)
//!
//! 包含核心的 dispatch 逻辑和各种业务处理方法

use std::path::PathBuf;

use chrono::Local;

use super::actions::Action;
use super::state::{App, AppMode, ConfirmAction, InputField, PathPurpose, Screen};
use crate::codec;
use crate::error::AppError;
use crate::models::{ListDraft, WordList};

const SPEED_STEP_MS: u64 = 50;
const DELAY_STEP_MS: u64 = 50;
const MAX_SPEED_MS: u64 = 5000;
const MAX_DELAY_MS: u64 = 2000;

impl App {
    /// 核心逻辑分发
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::MoveSelectionUp => self.move_up(),
            Action::MoveSelectionDown => self.move_down(),

            Action::ShowLists => self.show_screen(Screen::Lists),
            Action::ShowSetup => self.show_screen(Screen::Setup),

            Action::StartExercise => self.start_exercise(),
            Action::SpeedUp => self.adjust_speed(SPEED_STEP_MS as i64),
            Action::SpeedDown => self.adjust_speed(-(SPEED_STEP_MS as i64)),
            Action::DelayUp => self.adjust_delay(DELAY_STEP_MS as i64),
            Action::DelayDown => self.adjust_delay(-(DELAY_STEP_MS as i64)),
            Action::ToggleShuffle => self.toggle_shuffle(),
            Action::StartSelectFolder => self.start_path_prompt(PathPurpose::SelectFolder),

            Action::StartAddList => self.start_add_list(),
            Action::StartEditList => self.start_edit_list(),
            Action::StartDeleteList => self.start_delete_list(),
            Action::StartImport => self.start_path_prompt(PathPurpose::Import),
            Action::StartExport => {
                if let Some(id) = self.selected_list_id() {
                    self.start_path_prompt(PathPurpose::Export(id));
                }
            }

            Action::TogglePause => self.scheduler.toggle_pause(),
            Action::NextWord => {
                self.scheduler.advance();
            }
            Action::StopExercise => self.stop_exercise(),

            Action::Cancel => self.cancel(),

            Action::Submit => match self.mode.clone() {
                AppMode::EditingList(id) => match self.input_field {
                    InputField::Name => {
                        if !self.input_buffer.trim().is_empty() {
                            self.move_to_words_input();
                        }
                    }
                    InputField::Words => self.confirm_edit_list(id),
                },
                AppMode::PathPrompt(purpose) => self.confirm_path_prompt(purpose),
                AppMode::Confirm(_) => self.execute_confirm(),
                AppMode::Normal => {}
            },

            Action::Input(c) => {
                if self.is_text_input() {
                    self.input_buffer.push(c);
                }
            }

            Action::NewLine => {
                if matches!(self.mode, AppMode::EditingList(_)) {
                    self.input_buffer.push('\n');
                }
            }

            Action::DeleteChar => {
                if self.is_text_input() {
                    self.input_buffer.pop();
                }
            }
        }
        false
    }

    /// 驱动练习计时
    pub fn tick(&mut self) {
        self.scheduler.tick();
    }

    fn is_text_input(&self) -> bool {
        matches!(self.mode, AppMode::EditingList(_) | AppMode::PathPrompt(_))
    }

    // ============ 导航相关 ============

    /// 向上移动选择
    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// 向下移动选择
    pub fn move_down(&mut self) {
        if self.selected_index + 1 < self.display_list.len() {
            self.selected_index += 1;
        }
    }

    pub fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.message = None;
    }

    // ============ 练习相关 ============

    /// 开始练习（以暂停状态进入）
    pub fn start_exercise(&mut self) {
        let config = self.prefs.exercise;
        let selected = self
            .display_list
            .get(self.selected_index)
            .and_then(|id| self.repository.get(id).ok());
        let result = match selected {
            Some(list) => self.scheduler.start_list(list, config),
            None => Err(AppError::InvalidInput("no words selected".to_string())),
        };

        match result {
            Ok(()) => {
                if let Some(session) = self.scheduler.session() {
                    log::debug!(
                        "Session {} bound to list {:?}",
                        session.session_id(),
                        session.source_list_id()
                    );
                }
                self.screen = Screen::Exercise;
                self.message = None;
            }
            Err(_) => {
                self.message = Some("未选择列表或列表为空".to_string());
            }
        }
    }

    /// 停止练习并返回设置页
    pub fn stop_exercise(&mut self) {
        if self.scheduler.is_running() {
            self.scheduler.stop();
        }
        self.screen = Screen::Setup;
    }

    fn adjust_speed(&mut self, delta: i64) {
        let speed = self.prefs.exercise.speed_ms.saturating_add_signed(delta);
        self.prefs.exercise.speed_ms = speed.min(MAX_SPEED_MS);
        self.persist_preferences();
    }

    fn adjust_delay(&mut self, delta: i64) {
        let delay = self.prefs.exercise.delay_ms.saturating_add_signed(delta);
        self.prefs.exercise.delay_ms = delay.min(MAX_DELAY_MS);
        self.persist_preferences();
    }

    fn toggle_shuffle(&mut self) {
        self.prefs.exercise.shuffle_words = !self.prefs.exercise.shuffle_words;
        self.persist_preferences();
    }

    fn persist_preferences(&mut self) {
        if let Err(e) = self.prefs.store(&mut self.settings) {
            log::warn!("Cannot save settings to {:?}: {}", self.settings.path(), e);
            self.message = Some(format!("设置保存失败: {}", e));
        }
    }

    // ============ 添加/编辑列表相关 ============

    /// 开始添加列表
    pub fn start_add_list(&mut self) {
        self.mode = AppMode::EditingList(None);
        self.input_buffer.clear();
        self.input_field = InputField::Name;
        self.temp_name.clear();
    }

    /// 开始编辑列表
    pub fn start_edit_list(&mut self) {
        if let Some(list) = self.selected_list() {
            let draft = ListDraft::from_list(list);
            self.mode = AppMode::EditingList(Some(list.id().to_string()));
            self.input_field = InputField::Name;
            self.input_buffer = draft.name;
            self.temp_name.clear();
        }
    }

    /// 切换到单词输入
    pub fn move_to_words_input(&mut self) {
        self.temp_name = std::mem::take(&mut self.input_buffer);
        if let AppMode::EditingList(Some(id)) = &self.mode {
            if let Ok(list) = self.repository.get(id) {
                self.input_buffer = codec::serialize(list);
            }
        }
        self.input_field = InputField::Words;
    }

    /// 确认保存列表
    pub fn confirm_edit_list(&mut self, editing_id: Option<String>) {
        let previous = match &editing_id {
            Some(id) => match self.repository.get(id) {
                Ok(list) => Some(list.clone()),
                Err(e) => {
                    self.message = Some(format!("{}", e));
                    self.mode = AppMode::Normal;
                    return;
                }
            },
            None => None,
        };

        let created_at = previous
            .as_ref()
            .map(WordList::created_at)
            .unwrap_or_else(Local::now);
        let draft = ListDraft::new(self.temp_name.clone(), self.input_buffer.clone());
        let list = match draft.into_word_list(created_at) {
            Ok(list) => list,
            Err(AppError::InvalidInput(_)) => {
                // 留在编辑器中让用户修正
                self.message = Some("请填写名称和单词（名称需包含字母或数字）".to_string());
                return;
            }
            Err(e) => {
                self.message = Some(format!("{}", e));
                return;
            }
        };

        match self.repository.save(&list) {
            Ok(()) => {
                // 改名后旧文件不再对应任何列表
                if let Some(old) = previous.filter(|old| old.id() != list.id()) {
                    if let Err(e) = self.repository.delete(old.filename()) {
                        log::warn!("Cannot remove renamed list file {}: {}", old.filename(), e);
                    }
                    self.repository.evict(old.id());
                }
                self.message = Some(if editing_id.is_some() {
                    "列表已更新".to_string()
                } else {
                    "列表已添加".to_string()
                });
            }
            Err(e) => {
                self.message = Some(format!("保存失败: {}", e));
            }
        }

        self.refresh_display_list();
        self.select_list(list.id());
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
        self.temp_name.clear();
    }

    // ============ 删除列表相关 ============

    /// 开始删除列表
    pub fn start_delete_list(&mut self) {
        if let Some(id) = self.selected_list_id() {
            self.mode = AppMode::Confirm(ConfirmAction::Delete(id));
        }
    }

    fn delete_list(&mut self, id: &str) {
        let filename = match self.repository.get(id) {
            Ok(list) => list.filename().to_string(),
            Err(e) => {
                self.message = Some(format!("{}", e));
                return;
            }
        };

        match self.repository.delete(&filename) {
            Ok(()) => self.message = Some(format!("已删除 {}", filename)),
            Err(e) => {
                log::error!("Cannot delete {}: {}", filename, e);
                self.message = Some(format!(
                    "删除失败，请手动删除文件 {}",
                    self.repository.path_for(&filename).display()
                ));
            }
        }
        self.repository.evict(id);
    }

    // ============ 路径输入（文件夹/导入/导出） ============

    pub fn start_path_prompt(&mut self, purpose: PathPurpose) {
        self.input_buffer = match purpose {
            PathPurpose::SelectFolder => self.repository.directory().display().to_string(),
            PathPurpose::Import | PathPurpose::Export(_) => dirs::home_dir()
                .map(|home| format!("{}/", home.display()))
                .unwrap_or_default(),
        };
        self.mode = AppMode::PathPrompt(purpose);
    }

    pub fn confirm_path_prompt(&mut self, purpose: PathPurpose) {
        let raw = self.input_buffer.trim().to_string();
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
        if raw.is_empty() {
            return;
        }
        let path = expand_home(&raw);

        match purpose {
            PathPurpose::SelectFolder => self.select_folder(path),
            PathPurpose::Import => self.import_list(path),
            PathPurpose::Export(id) => self.export_list(&id, path),
        }
    }

    /// 切换列表文件夹并重新加载
    pub fn select_folder(&mut self, path: PathBuf) {
        self.message = None;
        self.repository.set_directory(path.clone());
        self.repository.load_all();
        let count = self.repository.len();
        self.selected_index = 0;
        self.refresh_display_list();

        self.prefs.folder = Some(path.clone());
        self.persist_preferences();
        if self.message.is_none() {
            self.message = Some(format!("已选择文件夹 {}，找到 {} 个列表", path.display(), count));
        }
    }

    /// 导入 .txt 文件；同名列表需确认替换
    pub fn import_list(&mut self, path: PathBuf) {
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            self.message = Some("请选择 .txt 文件".to_string());
            return;
        }

        let list = match self.repository.read_external(&path) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Import of {:?} failed: {}", path, e);
                self.message = Some(format!("导入失败: {}", e));
                return;
            }
        };

        if self.repository.find_by_filename(list.filename()).is_some() {
            self.mode = AppMode::Confirm(ConfirmAction::ReplaceImport(list));
        } else {
            self.store_imported(list);
        }
    }

    fn replace_imported(&mut self, imported: WordList) {
        let merged = match self.repository.find_by_filename(imported.filename()) {
            Some(existing) => {
                let mut merged = existing.clone();
                merged.set_words(imported.words().to_vec());
                merged
            }
            None => imported,
        };
        self.store_imported(merged);
    }

    fn store_imported(&mut self, list: WordList) {
        match self.repository.save(&list) {
            Ok(()) => {
                self.message = Some(format!("列表 \"{}\" 导入成功", list.name()));
            }
            Err(e) => {
                self.message = Some(format!("导入失败: {}", e));
            }
        }
        self.refresh_display_list();
        self.select_list(list.id());
    }

    /// 导出列表到指定路径
    pub fn export_list(&mut self, id: &str, path: PathBuf) {
        let result = self
            .repository
            .get(id)
            .and_then(|list| self.repository.export_to(list, &path));

        self.message = Some(match result {
            Ok(target) => format!("已导出到 {}", target.display()),
            Err(e) => format!("导出失败: {}", e),
        });
    }

    // ============ 通用操作 ============

    /// 执行确认操作
    pub fn execute_confirm(&mut self) {
        let mode = std::mem::replace(&mut self.mode, AppMode::Normal);
        match mode {
            AppMode::Confirm(ConfirmAction::Delete(id)) => self.delete_list(&id),
            AppMode::Confirm(ConfirmAction::ReplaceImport(list)) => self.replace_imported(list),
            _ => {}
        }
        self.refresh_display_list();
    }

    /// 取消当前操作
    pub fn cancel(&mut self) {
        self.mode = AppMode::Normal;
        self.input_buffer.clear();
        self.temp_name.clear();
        self.message = None;
    }
}

/// 展开开头的 `~`
fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::SchedulerState;
    use crate::settings::{Preferences, TomlSettings};
    use crate::storage::{FsStore, ListRepository};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_app() -> (App, TempDir) {
        let temp = TempDir::new().unwrap();
        let lists_dir = temp.path().join("lists");
        fs::create_dir_all(&lists_dir).unwrap();
        fs::write(lists_dir.join("animaux.txt"), "chat\nchien\n-----\nloup").unwrap();
        fs::write(lists_dir.join("vide.txt"), "-----\n\n").unwrap();

        let mut repository = ListRepository::new(FsStore, lists_dir);
        repository.load_all();
        let settings = TomlSettings::load(&temp.path().join("settings.toml")).unwrap();
        let app = App::new(repository, settings, Preferences::default());
        (app, temp)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                app.dispatch(Action::NewLine);
            } else {
                app.dispatch(Action::Input(c));
            }
        }
    }

    #[test]
    fn test_lists_sorted_for_display() {
        let (app, _temp) = create_test_app();
        assert_eq!(app.display_list, vec!["animaux", "vide"]);
        assert_eq!(app.selected_list().unwrap().name(), "Animaux");
    }

    #[test]
    fn test_start_exercise_enters_paused() {
        let (mut app, _temp) = create_test_app();
        app.dispatch(Action::StartExercise);

        assert_eq!(app.screen, Screen::Exercise);
        assert_eq!(app.scheduler.state(), SchedulerState::Paused);
        assert_eq!(app.scheduler.session().unwrap().sequence().len(), 3);

        app.dispatch(Action::TogglePause);
        assert_eq!(app.scheduler.state(), SchedulerState::Active);

        app.dispatch(Action::StopExercise);
        assert_eq!(app.screen, Screen::Setup);
        assert_eq!(app.scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_start_exercise_refuses_empty_list() {
        let (mut app, _temp) = create_test_app();
        app.dispatch(Action::MoveSelectionDown);
        app.dispatch(Action::StartExercise);

        assert_eq!(app.screen, Screen::Setup);
        assert_eq!(app.scheduler.state(), SchedulerState::Stopped);
        assert!(app.message.is_some());
    }

    #[test]
    fn test_add_list_through_editor() {
        let (mut app, _temp) = create_test_app();
        app.dispatch(Action::ShowLists);
        app.dispatch(Action::StartAddList);
        type_text(&mut app, "Mes Couleurs");
        app.dispatch(Action::Submit);
        assert_eq!(app.input_field, InputField::Words);
        type_text(&mut app, "rouge\nvert\n-----\nbleu");
        app.dispatch(Action::Submit);

        assert_eq!(app.mode, AppMode::Normal);
        let list = app.repository.get("mes_couleurs").unwrap();
        assert_eq!(list.name(), "Mes Couleurs");
        assert_eq!(list.groups().len(), 2);
        assert!(app.repository.path_for("mes_couleurs.txt").is_file());
        assert_eq!(app.selected_list_id().as_deref(), Some("mes_couleurs"));
    }

    #[test]
    fn test_editor_keeps_open_on_empty_words() {
        let (mut app, _temp) = create_test_app();
        app.dispatch(Action::StartAddList);
        type_text(&mut app, "Liste");
        app.dispatch(Action::Submit);
        type_text(&mut app, "   ");
        app.dispatch(Action::Submit);

        assert_eq!(app.mode, AppMode::EditingList(None));
        assert!(app.repository.get("liste").is_err());
        assert!(app.message.is_some());
    }

    #[test]
    fn test_edit_rename_moves_file_and_keeps_created_at() {
        let (mut app, _temp) = create_test_app();
        let created_at = app.repository.get("animaux").unwrap().created_at();

        app.dispatch(Action::StartEditList);
        assert_eq!(app.input_buffer, "Animaux");
        app.input_buffer = "Bêtes".to_string();
        app.dispatch(Action::Submit);
        assert_eq!(app.input_buffer, "chat\nchien\n-----\nloup");
        type_text(&mut app, "\nours");
        app.dispatch(Action::Submit);

        let renamed = app.repository.get("btes").unwrap();
        assert_eq!(renamed.created_at(), created_at);
        assert_eq!(renamed.word_count(), 4);
        assert!(app.repository.get("animaux").is_err());
        assert!(!app.repository.path_for("animaux.txt").exists());
        assert!(app.repository.path_for("btes.txt").is_file());
    }

    #[test]
    fn test_delete_list_after_confirm() {
        let (mut app, _temp) = create_test_app();
        app.dispatch(Action::StartDeleteList);
        assert_eq!(
            app.mode,
            AppMode::Confirm(ConfirmAction::Delete("animaux".to_string()))
        );
        app.dispatch(Action::Submit);

        assert!(app.repository.get("animaux").is_err());
        assert!(!app.repository.path_for("animaux.txt").exists());
        assert_eq!(app.display_list, vec!["vide"]);
    }

    #[test]
    fn test_delete_failure_still_removes_entry() {
        let (mut app, _temp) = create_test_app();
        fs::remove_file(app.repository.path_for("animaux.txt")).unwrap();

        app.dispatch(Action::StartDeleteList);
        app.dispatch(Action::Submit);

        assert!(app.repository.get("animaux").is_err());
        assert!(app.message.as_deref().unwrap().contains("animaux.txt"));
    }

    #[test]
    fn test_import_new_and_replace() {
        let (mut app, temp) = create_test_app();
        let outside = temp.path().join("outside");
        fs::create_dir_all(&outside).unwrap();

        fs::write(outside.join("fruits.txt"), "pomme\npoire").unwrap();
        app.import_list(outside.join("fruits.txt"));
        assert_eq!(app.repository.get("fruits").unwrap().word_count(), 2);
        assert!(app.repository.path_for("fruits.txt").is_file());

        fs::write(outside.join("animaux.txt"), "tigre").unwrap();
        app.import_list(outside.join("animaux.txt"));
        assert!(matches!(
            app.mode,
            AppMode::Confirm(ConfirmAction::ReplaceImport(_))
        ));
        app.dispatch(Action::Submit);

        let replaced = app.repository.get("animaux").unwrap();
        assert_eq!(replaced.words(), vec!["tigre".to_string()]);
    }

    #[test]
    fn test_import_rejects_other_extensions() {
        let (mut app, temp) = create_test_app();
        let path = temp.path().join("notes.md");
        fs::write(&path, "a").unwrap();

        app.import_list(path);
        assert_eq!(app.repository.len(), 2);
        assert_eq!(app.message.as_deref(), Some("请选择 .txt 文件"));
    }

    #[test]
    fn test_export_selected_list() {
        let (mut app, temp) = create_test_app();
        let out = temp.path().join("export");
        fs::create_dir_all(&out).unwrap();

        app.dispatch(Action::StartExport);
        app.input_buffer = out.display().to_string();
        app.dispatch(Action::Submit);

        assert_eq!(
            fs::read_to_string(out.join("animaux.txt")).unwrap(),
            "chat\nchien\n-----\nloup"
        );
    }

    #[test]
    fn test_select_folder_reloads_and_persists() {
        let (mut app, temp) = create_test_app();
        let other = temp.path().join("autres");
        fs::create_dir_all(&other).unwrap();
        fs::write(other.join("jours.txt"), "lundi\nmardi").unwrap();

        app.select_folder(other.clone());

        assert_eq!(app.display_list, vec!["jours"]);
        assert_eq!(app.prefs.folder.as_deref(), Some(other.as_path()));
        let reloaded = TomlSettings::load(&temp.path().join("settings.toml")).unwrap();
        assert_eq!(Preferences::load(&reloaded).folder, Some(other));
    }

    #[test]
    fn test_speed_and_delay_are_clamped() {
        let (mut app, _temp) = create_test_app();
        app.prefs.exercise.delay_ms = 20;
        app.dispatch(Action::DelayDown);
        assert_eq!(app.prefs.exercise.delay_ms, 0);

        app.prefs.exercise.speed_ms = MAX_SPEED_MS;
        app.dispatch(Action::SpeedUp);
        assert_eq!(app.prefs.exercise.speed_ms, MAX_SPEED_MS);

        app.dispatch(Action::ToggleShuffle);
        assert!(!app.prefs.exercise.shuffle_words);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/tmp/x"), PathBuf::from("/tmp/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/listes"), home.join("listes"));
        }
    }
}
