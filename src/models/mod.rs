pub mod analysis;
pub mod image;
pub mod question;
pub mod settings;

pub use analysis::{AnalysisResult, GroundingSource};
pub use image::PendingImage;
pub use question::{Illustration, IllustrationState, Question, QuestionKind};
pub use settings::{Configuration, DifficultyLevel, GradeLevel, IllustrationStyle};
