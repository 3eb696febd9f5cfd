//! Action 枚举定义 (Intent)
//!
//! 用户交互转化为明确的语义化 Action

/// 用户操作枚举
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    MoveSelectionUp,
    MoveSelectionDown,

    // 页面切换
    ShowLists,
    ShowSetup,

    // 练习设置
    StartExercise,
    SpeedUp,
    SpeedDown,
    DelayUp,
    DelayDown,
    ToggleShuffle,
    StartSelectFolder,

    // 列表管理
    StartAddList,
    StartEditList,
    StartDeleteList,
    StartImport,
    StartExport,

    // 练习中
    TogglePause,
    NextWord,
    StopExercise,

    // 表单/通用交互
    Cancel,      // Esc / n
    Submit,      // Enter / y / Ctrl+S
    Input(char), // 输入字符
    NewLine,     // 单词输入框中的 Enter
    DeleteChar,  // Backspace
}
