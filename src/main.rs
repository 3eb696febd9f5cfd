mod codec;
mod error;
mod exercise;
mod models;
mod settings;
mod shuffle;
mod storage;
mod ui;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::settings::{Preferences, TomlSettings};
use crate::storage::{FsStore, ListRepository};
use crate::ui::{App, render};

/// 无待执行步骤时的最长等待
const IDLE_POLL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "flashwords", about = "Terminal speed-reading word trainer", version)]
struct Cli {
    /// Folder containing the .txt word lists (overrides the saved folder)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// How long each word stays visible, in milliseconds
    #[arg(long)]
    speed_ms: Option<u64>,

    /// Blank gap between two words, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Show words in list order
    #[arg(long)]
    no_shuffle: bool,
}

/// 获取数据目录路径 (~/.local/share/flashwords/)
fn get_data_dir() -> io::Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "无法获取用户数据目录"))?
        .join("flashwords");

    fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// 获取设置文件路径 (~/.config/flashwords/settings.toml)
fn get_settings_path() -> io::Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "无法获取用户配置目录"))?;
    Ok(config_dir.join("flashwords").join("settings.toml"))
}

/// 终端被界面占用，日志写入数据目录下的文件
fn init_logging(data_dir: &Path) -> anyhow::Result<()> {
    let log_file = File::create(data_dir.join("flashwords.log"))
        .context("cannot create log file")?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = get_data_dir().context("cannot prepare data directory")?;
    init_logging(&data_dir)?;

    let settings_path = get_settings_path()?;
    let settings = TomlSettings::load(&settings_path).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable settings {:?}: {}", settings_path, e);
        TomlSettings::empty(&settings_path)
    });

    // 命令行 > 设置文件 > 默认值
    let mut prefs = Preferences::load(&settings);
    if let Some(dir) = cli.dir {
        prefs.folder = Some(dir);
    }
    if let Some(speed_ms) = cli.speed_ms {
        prefs.exercise.speed_ms = speed_ms;
    }
    if let Some(delay_ms) = cli.delay_ms {
        prefs.exercise.delay_ms = delay_ms;
    }
    if cli.no_shuffle {
        prefs.exercise.shuffle_words = false;
    }

    let folder = prefs
        .folder
        .clone()
        .unwrap_or_else(|| data_dir.join("lists"));
    let mut repository = ListRepository::new(FsStore, folder);
    repository.load_all();
    let count = repository.len();
    log::info!("Starting with {} lists from {:?}", count, repository.directory());

    // 创建应用状态
    let mut app = App::new(repository, settings, prefs);

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.scheduler.stop();
    result.context("terminal event loop failed")
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        let timeout = app
            .scheduler
            .ms_until_due()
            .map(Duration::from_millis)
            .map_or(IDLE_POLL, |due| due.min(IDLE_POLL));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && ui::handle_key_event(app, key)? {
                    break;
                }
            }
        }

        app.tick();
    }
    Ok(())
}
