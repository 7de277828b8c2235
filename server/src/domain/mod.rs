//! Business logic: segment reconciliation and quiz extraction

pub mod lesson;
pub mod quiz;

pub use lesson::{CombinedSegment, Lesson, LessonError};
pub use quiz::{QuizError, QuizQuestion};
