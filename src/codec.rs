//! 单词列表文本格式
//!
//! 每行一个单词，空行忽略，单独一行 `-----` 表示分组边界。

use chrono::Local;

use crate::error::Result;
use crate::models::WordList;

/// 分组分隔符
pub const SEPARATOR: &str = "-----";

/// 解析文件内容；内容本身永远不会导致失败
pub fn parse(text: &str, filename: &str) -> Result<WordList> {
    let words: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let id = filename.strip_suffix(".txt").unwrap_or(filename);
    WordList::new(id, title_case(id), words, Local::now())
}

/// 序列化为文件内容（不追加末尾换行）
pub fn serialize(list: &WordList) -> String {
    list.words().join("\n")
}

/// 按分隔符切分为分组，空分组被丢弃
pub fn group_words(words: &[String]) -> Vec<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();

    for word in words {
        if word == SEPARATOR {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
        } else {
            current.push(word.clone());
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// `mots_faciles` -> `Mots Faciles`
///
/// 字母数字字符若位于开头或紧跟非字母数字字符则大写，适用于任意 Unicode 文本。
pub fn title_case(id: &str) -> String {
    let mut result = String::with_capacity(id.len());
    let mut prev_is_word = false;

    for c in id.chars().map(|c| if c == '_' { ' ' } else { c }) {
        let is_word = c.is_alphanumeric();
        if is_word && !prev_is_word {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        prev_is_word = is_word;
    }

    result
}

/// 编辑器文件名规则：小写，空白转 `_`，仅保留 `[a-z0-9_]`
pub fn sanitize_filename_stem(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}
