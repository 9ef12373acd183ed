//! Posts domain: wire types, list filters and form validation.

use crate::error::PostError;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_LENGTH: usize = 80;
pub const BODY_MAX_LENGTH: usize = 2000;
pub const TAG_MAX_LENGTH: usize = 24;
pub const TAG_MAX_COUNT: usize = 5;

/// Words a post may not contain, in title, body or tags.
pub const FORBIDDEN_WORDS: [&str; 4] = ["캄보디아", "프놈펜", "불법체류", "텔레그램"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PostCategory {
    Notice,
    Qna,
    Free,
}

impl PostCategory {
    /// Wire value, as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostCategory::Notice => "NOTICE",
            PostCategory::Qna => "QNA",
            PostCategory::Free => "FREE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostCategory::Notice => "Notice",
            PostCategory::Qna => "Q&A",
            PostCategory::Free => "Free board",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOTICE" => Some(PostCategory::Notice),
            "QNA" => Some(PostCategory::Qna),
            "FREE" => Some(PostCategory::Free),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub category: PostCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub body: String,
    pub category: PostCategory,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PostCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Title,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// List filters for `GET /posts`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilters {
    pub search: Option<String>,
    pub category: Option<PostCategory>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

// Unreserved characters stay as-is in query values.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

impl PostFilters {
    /// Query string (without `?`) holding only the parameters that are set.
    pub fn to_query(&self) -> String {
        let mut parts: Vec<(&str, String)> = Vec::new();
        if let Some(s) = self.search.as_deref().filter(|s| !s.is_empty()) {
            parts.push(("search", s.to_string()));
        }
        if let Some(c) = self.category {
            parts.push(("category", c.as_str().to_string()));
        }
        if let Some(s) = self.sort_by {
            let v = match s {
                SortBy::Title => "title",
                SortBy::CreatedAt => "createdAt",
            };
            parts.push(("sortBy", v.to_string()));
        }
        if let Some(o) = self.sort_order {
            let v = match o {
                SortOrder::Asc => "asc",
                SortOrder::Desc => "desc",
            };
            parts.push(("sortOrder", v.to_string()));
        }
        if let Some(c) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            parts.push(("cursor", c.to_string()));
        }
        if let Some(l) = self.limit.filter(|l| *l > 0) {
            parts.push(("limit", l.to_string()));
        }
        parts
            .into_iter()
            .map(|(k, v)| format!("{k}={}", utf8_percent_encode(&v, QUERY)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// One cursor page of `GET /posts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsPage {
    #[serde(default)]
    pub items: Vec<Post>,
    #[serde(default)]
    pub prev_cursor: Option<String>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// First forbidden word contained in `text`.
pub fn forbidden_word(text: &str) -> Option<&'static str> {
    FORBIDDEN_WORDS.iter().copied().find(|w| text.contains(w))
}

fn check_title(title: &str) -> Result<(), PostError> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err(PostError::EmptyTitle);
    }
    if len > TITLE_MAX_LENGTH {
        return Err(PostError::TitleTooLong {
            len,
            max: TITLE_MAX_LENGTH,
        });
    }
    check_words("title", title)
}

fn check_body(body: &str) -> Result<(), PostError> {
    let len = body.trim().chars().count();
    if len == 0 {
        return Err(PostError::EmptyBody);
    }
    if len > BODY_MAX_LENGTH {
        return Err(PostError::BodyTooLong {
            len,
            max: BODY_MAX_LENGTH,
        });
    }
    check_words("body", body)
}

fn check_tags(tags: &[String]) -> Result<(), PostError> {
    if tags.len() > TAG_MAX_COUNT {
        return Err(PostError::TooManyTags {
            count: tags.len(),
            max: TAG_MAX_COUNT,
        });
    }
    for tag in tags {
        if tag.chars().count() > TAG_MAX_LENGTH {
            return Err(PostError::TagTooLong {
                tag: tag.clone(),
                max: TAG_MAX_LENGTH,
            });
        }
        check_words("tags", tag)?;
    }
    Ok(())
}

fn check_words(field: &'static str, text: &str) -> Result<(), PostError> {
    match forbidden_word(text) {
        Some(word) => Err(PostError::ForbiddenWord {
            field,
            word: word.to_string(),
        }),
        None => Ok(()),
    }
}

pub fn validate_create(post: &CreatePost) -> Result<(), PostError> {
    check_title(&post.title)?;
    check_body(&post.body)?;
    check_tags(&post.tags)
}

/// Only the fields being changed are checked.
pub fn validate_update(patch: &UpdatePost) -> Result<(), PostError> {
    if let Some(t) = &patch.title {
        check_title(t)?;
    }
    if let Some(b) = &patch.body {
        check_body(b)?;
    }
    if let Some(tags) = &patch.tags {
        check_tags(tags)?;
    }
    Ok(())
}
