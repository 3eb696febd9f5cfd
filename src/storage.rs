use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{AppError, Result};
use crate::models::WordList;

/// 目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_file: bool,
}

/// 文件系统能力
pub trait FileStore {
    fn read_file(&self, path: &Path) -> io::Result<String>;
    fn write_file(&self, path: &Path, content: &str) -> io::Result<()>;
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;
    fn delete_file(&self, path: &Path) -> io::Result<()>;
    fn is_dir(&self, path: &Path) -> bool;
}

/// 基于 std::fs 的实现
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FileStore for FsStore {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> io::Result<()> {
        fs::write(path, content)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_file: entry.file_type()?.is_file(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// 单词列表仓库：内存缓存 + 目录中的 `.txt` 文件
pub struct ListRepository<S: FileStore> {
    store: S,
    directory: PathBuf,
    cache: HashMap<String, WordList>,
}

impl<S: FileStore> ListRepository<S> {
    pub fn new(store: S, directory: PathBuf) -> Self {
        Self {
            store,
            directory,
            cache: HashMap::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 切换目录并清空缓存（不会立即重新加载）
    pub fn set_directory(&mut self, directory: PathBuf) {
        self.directory = directory;
        self.cache.clear();
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.directory.join(filename)
    }

    /// 加载目录下全部列表
    ///
    /// 单个文件失败只记录日志并跳过；目录本身不可用时返回空列表。
    pub fn load_all(&mut self) -> Vec<WordList> {
        self.cache.clear();

        if let Err(e) = self.store.ensure_dir(&self.directory) {
            log::error!("Cannot create list directory {:?}: {}", self.directory, e);
            return Vec::new();
        }

        let entries = match self.store.read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::error!("Cannot read list directory {:?}: {}", self.directory, e);
                return Vec::new();
            }
        };

        let mut lists = Vec::new();
        for entry in entries
            .iter()
            .filter(|e| e.is_file && e.name.ends_with(".txt"))
        {
            match self.load_list(&entry.name) {
                Ok(list) => {
                    self.cache.insert(list.id().to_string(), list.clone());
                    lists.push(list);
                }
                Err(e) => log::warn!("Skipping {}: {}", entry.name, e),
            }
        }

        log::info!("Loaded {} list(s) from {:?}", lists.len(), self.directory);
        lists
    }

    /// 读取并解析单个文件
    pub fn load_list(&self, filename: &str) -> Result<WordList> {
        let content = self.store.read_file(&self.path_for(filename))?;
        codec::parse(&content, filename)
    }

    /// 写入文件并更新缓存；同 id 直接覆盖
    pub fn save(&mut self, list: &WordList) -> Result<()> {
        let path = self.path_for(list.filename());
        self.store.write_file(&path, &codec::serialize(list))?;
        self.cache.insert(list.id().to_string(), list.clone());
        log::info!(
            "Saved list {} (created {}) to {:?}",
            list.id(),
            list.created_at_iso(),
            path
        );
        Ok(())
    }

    /// 删除文件；缓存由调用方通过 `evict` 移除
    pub fn delete(&self, filename: &str) -> Result<()> {
        let path = self.path_for(filename);
        self.store.delete_file(&path)?;
        log::info!("Deleted {:?}", path);
        Ok(())
    }

    /// 读取目录外的文件（导入），以其文件名解析
    pub fn read_external(&self, path: &Path) -> Result<WordList> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::InvalidInput(format!("{} is not a file", path.display())))?;
        let content = self.store.read_file(path)?;
        codec::parse(&content, &filename)
    }

    /// 导出到指定路径；路径为目录时写入 `目录/文件名`
    pub fn export_to(&self, list: &WordList, path: &Path) -> Result<PathBuf> {
        let target = if self.store.is_dir(path) {
            path.join(list.filename())
        } else {
            path.to_path_buf()
        };
        self.store.write_file(&target, &codec::serialize(list))?;
        log::info!("Exported list {} to {:?}", list.id(), target);
        Ok(target)
    }

    pub fn evict(&mut self, id: &str) -> Option<WordList> {
        self.cache.remove(id)
    }

    pub fn get(&self, id: &str) -> Result<&WordList> {
        self.cache
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("list {id}")))
    }

    pub fn find_by_filename(&self, filename: &str) -> Option<&WordList> {
        self.cache.values().find(|l| l.filename() == filename)
    }

    /// 按名称排序的列表（用于显示）
    pub fn lists(&self) -> Vec<&WordList> {
        let mut lists: Vec<&WordList> = self.cache.values().collect();
        lists.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.id().cmp(b.id()))
        });
        lists
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
