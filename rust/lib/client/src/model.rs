//! Domain types shared by the gateway and the sync engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resolution may carry at most this many tags.
pub const MAX_TAGS: usize = 3;

/// Prefix of ids the client invents for comments the server has not
/// confirmed yet.
pub const PROVISIONAL_PREFIX: &str = "local-";

/// Fixed tag vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Productivity,
    Family,
    Health,
    Education,
    Fitness,
    Finance,
    Career,
    Happiness,
    Mindfulness,
    Technology,
}

impl Tag {
    pub const ALL: [Tag; 10] = [
        Tag::Productivity,
        Tag::Family,
        Tag::Health,
        Tag::Education,
        Tag::Fitness,
        Tag::Finance,
        Tag::Career,
        Tag::Happiness,
        Tag::Mindfulness,
        Tag::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Productivity => "Productivity",
            Tag::Family => "Family",
            Tag::Health => "Health",
            Tag::Education => "Education",
            Tag::Fitness => "Fitness",
            Tag::Finance => "Finance",
            Tag::Career => "Career",
            Tag::Happiness => "Happiness",
            Tag::Mindfulness => "Mindfulness",
            Tag::Technology => "Technology",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag '{0}'")]
pub struct UnknownTag(pub String);

impl FromStr for Tag {
    type Err = UnknownTag;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Tag::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Feed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Recency,
    Popularity,
}

impl SortKey {
    /// Value of the `sort` query parameter.
    pub fn query_value(&self) -> &'static str {
        match self {
            SortKey::Recency => "created_at",
            SortKey::Popularity => "likes",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" | "recency" | "new" | "created_at" => Ok(SortKey::Recency),
            "popular" | "popularity" | "trending" | "likes" => Ok(SortKey::Popularity),
            other => Err(format!("unknown sort '{}' (expected recent or popular)", other)),
        }
    }
}

/// Who wrote a resolution or a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
}

/// One feed entry as the server reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionSummary {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub text: String,
    pub tags: Vec<Tag>,
    pub like_count: u32,
    pub comment_count: u32,
    pub has_liked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: Author,
}

impl Comment {
    /// True until the server has confirmed this comment.
    pub fn is_provisional(&self) -> bool {
        self.id.starts_with(PROVISIONAL_PREFIX)
    }
}

/// A resolution with its complete comment list, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDetail {
    pub summary: ResolutionSummary,
    pub comments: Vec<Comment>,
}

/// One page of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<ResolutionSummary>,
    pub has_more: bool,
}

/// The signed-in user as returned by token verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserIdentity {
    pub fn as_author(&self) -> Author {
        Author {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}
