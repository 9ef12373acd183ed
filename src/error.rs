//! Typed validation errors for post forms.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostError {
    #[error("title is required")]
    EmptyTitle,

    #[error("title is {len} characters long (max {max})")]
    TitleTooLong { len: usize, max: usize },

    #[error("body is required")]
    EmptyBody,

    #[error("body is {len} characters long (max {max})")]
    BodyTooLong { len: usize, max: usize },

    #[error("{count} tags given (max {max})")]
    TooManyTags { count: usize, max: usize },

    #[error("tag {tag:?} is longer than {max} characters")]
    TagTooLong { tag: String, max: usize },

    #[error("{field} contains the forbidden word \"{word}\"")]
    ForbiddenWord { field: &'static str, word: String },
}
