use serde::{Deserialize, Serialize};

/// 年级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GradeLevel {
    /// 小学
    #[default]
    Elementary,
    /// 初中
    MiddleSchool,
    /// 高中
    HighSchool,
    /// 大学 / 专家
    College,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 4] = [
        GradeLevel::Elementary,
        GradeLevel::MiddleSchool,
        GradeLevel::HighSchool,
        GradeLevel::College,
    ];

    /// 发送给模型的年级字面量
    pub fn as_str(self) -> &'static str {
        match self {
            GradeLevel::Elementary => "Elementary (K-5)",
            GradeLevel::MiddleSchool => "Middle School (6-8)",
            GradeLevel::HighSchool => "High School (9-12)",
            GradeLevel::College => "College/Expert",
        }
    }

    /// 从菜单序号解析（从1开始）
    pub fn from_menu_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// 精确匹配字面量
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

impl std::fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DifficultyLevel {
    /// 更简单
    Easier,
    /// 与课本一致
    #[default]
    Matched,
    /// 更难
    Harder,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easier,
        DifficultyLevel::Matched,
        DifficultyLevel::Harder,
    ];

    /// 发送给模型的难度字面量
    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::Easier => "easy",
            DifficultyLevel::Matched => "similar",
            DifficultyLevel::Harder => "difficult",
        }
    }

    /// 写入提示词的难度描述
    pub fn context(self) -> &'static str {
        match self {
            DifficultyLevel::Easier => "Scaffolded/Foundational",
            DifficultyLevel::Matched => "Grade-appropriate",
            DifficultyLevel::Harder => "Advanced/Critical Thinking",
        }
    }

    /// 解析难度（接受字面量和别名，忽略大小写）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "easier" => Some(DifficultyLevel::Easier),
            "similar" | "matched" | "same" => Some(DifficultyLevel::Matched),
            "difficult" | "harder" | "hard" => Some(DifficultyLevel::Harder),
            _ => None,
        }
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 插图风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IllustrationStyle {
    /// 铅笔素描
    #[default]
    Pencil,
    /// 水彩
    Watercolor,
    /// 黑板粉笔
    Chalkboard,
    /// 蜡笔
    Crayon,
}

impl IllustrationStyle {
    pub const ALL: [IllustrationStyle; 4] = [
        IllustrationStyle::Pencil,
        IllustrationStyle::Watercolor,
        IllustrationStyle::Chalkboard,
        IllustrationStyle::Crayon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IllustrationStyle::Pencil => "pencil",
            IllustrationStyle::Watercolor => "watercolor",
            IllustrationStyle::Chalkboard => "chalkboard",
            IllustrationStyle::Crayon => "crayon",
        }
    }

    /// 界面上显示的名称
    pub fn label(self) -> &'static str {
        match self {
            IllustrationStyle::Pencil => "📐 Technical",
            IllustrationStyle::Watercolor => "🎨 Watercolor",
            IllustrationStyle::Chalkboard => "✏️ Draft",
            IllustrationStyle::Crayon => "🖍️ Simple",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|style| style.as_str() == s)
    }
}

impl std::fmt::Display for IllustrationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 本次会话的用户选择
///
/// 只在 `SelectingConfiguration` 阶段可修改，之后作为只读快照使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Configuration {
    pub grade: GradeLevel,
    pub difficulty: DifficultyLevel,
    pub style: IllustrationStyle,
}
