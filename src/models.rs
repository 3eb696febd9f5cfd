use chrono::{DateTime, Local, SecondsFormat};

use crate::codec::{self, SEPARATOR};
use crate::error::{AppError, Result};

/// 单词列表
#[derive(Debug, Clone, PartialEq)]
pub struct WordList {
    id: String,
    name: String,
    words: Vec<String>,
    groups: Vec<Vec<String>>,
    filename: String,
    created_at: DateTime<Local>,
}

impl WordList {
    /// 创建列表；单词会被去除首尾空白，空行被丢弃
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        words: Vec<String>,
        created_at: DateTime<Local>,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AppError::InvalidInput("list id must not be empty".to_string()));
        }

        let words = clean_words(words);
        let groups = codec::group_words(&words);
        Ok(Self {
            filename: format!("{id}.txt"),
            id,
            name: name.into(),
            words,
            groups,
            created_at,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// ISO-8601 创建时间
    pub fn created_at_iso(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    /// 替换单词并重建分组
    pub fn set_words(&mut self, words: Vec<String>) {
        self.words = clean_words(words);
        self.groups = codec::group_words(&self.words);
    }

    /// 练习用单词（去掉分隔符）
    pub fn exercise_words(&self) -> Vec<String> {
        self.words
            .iter()
            .filter(|w| w.as_str() != SEPARATOR)
            .cloned()
            .collect()
    }

    pub fn word_count(&self) -> usize {
        self.words.iter().filter(|w| w.as_str() != SEPARATOR).count()
    }

    /// 前 `limit` 个单词以及剩余数量
    pub fn preview(&self, limit: usize) -> (Vec<&str>, usize) {
        let words: Vec<&str> = self
            .words
            .iter()
            .map(String::as_str)
            .filter(|w| *w != SEPARATOR)
            .collect();
        let remaining = words.len().saturating_sub(limit);
        (words.into_iter().take(limit).collect(), remaining)
    }
}

fn clean_words(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// 编辑器表单内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListDraft {
    pub name: String,
    pub words_text: String,
}

impl ListDraft {
    pub fn new(name: impl Into<String>, words_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            words_text: words_text.into(),
        }
    }

    /// 从已有列表生成表单
    pub fn from_list(list: &WordList) -> Self {
        Self::new(list.name(), codec::serialize(list))
    }

    /// 校验表单并生成列表，文件名由名称规范化得到
    pub fn into_word_list(self, created_at: DateTime<Local>) -> Result<WordList> {
        let name = self.name.trim();
        let words_text = self.words_text.trim();
        if name.is_empty() || words_text.is_empty() {
            return Err(AppError::InvalidInput(
                "name and words are both required".to_string(),
            ));
        }

        let stem = codec::sanitize_filename_stem(name);
        if stem.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "\"{name}\" does not produce a usable file name"
            )));
        }

        let words = words_text.lines().map(str::to_string).collect();
        WordList::new(stem, name, words, created_at)
    }
}
