//! 展示层（Presentation）
//!
//! 终端界面：读取本地照片、渲染四个界面、管理答题卡片的本地状态

pub mod question_card;
pub mod upload;
pub mod views;

pub use question_card::QuestionCard;
pub use upload::read_image;
