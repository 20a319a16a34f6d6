//! JSON shapes of the REST contract and their conversion to domain types.
//!
//! The server serializes Mongo documents directly, so ids arrive as `_id`,
//! empty arrays may arrive as `null`, and the liked flag is `isLiked` on list
//! endpoints but `hasLiked` next to `data` on the detail endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{Author, Comment, ResolutionDetail, ResolutionSummary, Tag, UserIdentity};

// ── Responses ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct PageWire {
    #[serde(default)]
    pub resolutions: Option<Vec<ResolutionWire>>,
    #[serde(default)]
    pub has_more: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListWire {
    #[serde(default)]
    pub resolutions: Option<Vec<ResolutionWire>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailWire {
    pub data: ResolutionWire,
    #[serde(rename = "hasLiked", default)]
    pub has_liked: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolutionWire {
    #[serde(rename = "_id", alias = "r_id")]
    pub id: String,
    #[serde(rename = "resolution", default)]
    pub text: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(rename = "isLiked", default)]
    pub is_liked: bool,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_detail: Option<UserDetailWire>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Option<Vec<CommentWire>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDetailWire {
    #[serde(rename = "_id", alias = "user_id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentWire {
    #[serde(rename = "_id")]
    pub id: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_detail: Option<UserDetailWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentCreatedWire {
    #[serde(rename = "_id", alias = "comment_id", default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolutionCreatedWire {
    #[serde(rename = "r_id", alias = "_id", default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyWire {
    pub user: UserWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserWire {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(alias = "avatar", default)]
    pub image: Option<String>,
}

// ── Request bodies ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LikeBody<'a> {
    pub r_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommentBody<'a> {
    pub r_id: &'a str,
    pub comment: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateResolutionBody<'a> {
    pub resolution: &'a str,
    pub tags: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileBody<'a> {
    pub name: &'a str,
}

// ── Conversion ──────────────────────────────────────────────────────

fn parse_tags(resolution_id: &str, raw: Option<Vec<String>>) -> Vec<Tag> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|t| match t.parse::<Tag>() {
            Ok(tag) => Some(tag),
            Err(e) => {
                warn!(resolution = resolution_id, "dropping tag: {}", e);
                None
            }
        })
        .collect()
}

impl UserDetailWire {
    fn into_author(self, fallback_id: Option<String>) -> Author {
        Author {
            id: self.id.or(fallback_id).unwrap_or_default(),
            name: self.name,
        }
    }
}

impl CommentWire {
    pub fn into_comment(self) -> Comment {
        let author = match self.user_detail {
            Some(detail) => detail.into_author(self.user_id),
            None => Author {
                id: self.user_id.unwrap_or_default(),
                name: "Unknown".into(),
            },
        };
        Comment {
            id: self.id,
            text: self.comment,
            created_at: self.created_at,
            author,
        }
    }
}

impl ResolutionWire {
    pub fn into_summary(self) -> ResolutionSummary {
        self.split().0
    }

    /// Summary plus comments, most recent first.
    pub fn into_detail(self, has_liked: Option<bool>) -> ResolutionDetail {
        let (mut summary, comments) = self.split();
        if let Some(liked) = has_liked {
            summary.has_liked = liked;
        }
        let mut comments: Vec<Comment> = comments.into_iter().map(CommentWire::into_comment).collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ResolutionDetail { summary, comments }
    }

    fn split(self) -> (ResolutionSummary, Vec<CommentWire>) {
        let tags = parse_tags(&self.id, self.tags);
        let (detail_id, detail_name) = match self.user_detail {
            Some(d) => (d.id, Some(d.name)),
            None => (None, None),
        };
        let author_name = self
            .user_name
            .or(detail_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown".into());
        let summary = ResolutionSummary {
            id: self.id,
            author_id: self.user_id.or(detail_id).unwrap_or_default(),
            author_name,
            text: self.text,
            tags,
            like_count: self.like_count,
            comment_count: self.comment_count,
            has_liked: self.is_liked,
            created_at: self.created_at,
        };
        (summary, self.comments.unwrap_or_default())
    }
}

impl UserWire {
    pub fn into_identity(self) -> UserIdentity {
        UserIdentity {
            id: self.id,
            name: self.name,
            email: self.email,
            avatar: self.image.filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_item_maps_mongo_fields() {
        let w: ResolutionWire = serde_json::from_value(json!({
            "_id": "65a1",
            "resolution": "Run a marathon",
            "tags": ["Fitness", "health", "Hobbies"],
            "like_count": 4,
            "comment_count": 2,
            "isLiked": true,
            "user_id": "u1",
            "user_name": "Ana",
            "created_at": "2025-01-01T10:00:00.123456789Z",
            "updated_at": "2025-01-01T10:00:00Z"
        }))
        .unwrap();

        let s = w.into_summary();
        assert_eq!(s.id, "65a1");
        assert_eq!(s.text, "Run a marathon");
        assert_eq!(s.tags, vec![Tag::Fitness, Tag::Health]);
        assert_eq!((s.like_count, s.comment_count, s.has_liked), (4, 2, true));
        assert_eq!((s.author_id.as_str(), s.author_name.as_str()), ("u1", "Ana"));
    }

    #[test]
    fn null_arrays_and_missing_counters_default() {
        let w: ResolutionWire = serde_json::from_value(json!({
            "_id": "r9",
            "resolution": "Read more",
            "tags": null,
            "comments": null,
            "created_at": "2025-01-02T00:00:00Z"
        }))
        .unwrap();

        let d = w.into_detail(None);
        assert!(d.summary.tags.is_empty());
        assert!(d.comments.is_empty());
        assert_eq!(d.summary.like_count, 0);
        assert_eq!(d.summary.author_name, "Unknown");
    }

    #[test]
    fn detail_sorts_comments_newest_first_and_uses_has_liked() {
        let w: DetailWire = serde_json::from_value(json!({
            "data": {
                "_id": "r1",
                "resolution": "Learn Rust",
                "like_count": 1,
                "comment_count": 2,
                "user_detail": {"_id": "u1", "name": "Ana", "image": "x.png"},
                "created_at": "2025-01-01T00:00:00Z",
                "comments": [
                    {"_id": "c1", "comment": "first", "r_id": "r1", "user_id": "u2",
                     "created_at": "2025-01-01T01:00:00Z",
                     "user_detail": {"_id": "u2", "name": "Bo"}},
                    {"_id": "c2", "comment": "second", "r_id": "r1", "user_id": "u3",
                     "created_at": "2025-01-01T02:00:00Z",
                     "user_detail": {"name": "Cy"}}
                ]
            },
            "hasLiked": true
        }))
        .unwrap();

        let d = w.data.into_detail(w.has_liked);
        assert!(d.summary.has_liked);
        assert_eq!(d.summary.author_name, "Ana");
        assert_eq!(d.summary.author_id, "u1");
        let ids: Vec<&str> = d.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c1"]);
        assert_eq!(d.comments[0].author, Author { id: "u3".into(), name: "Cy".into() });
        assert_eq!(d.comments[1].author, Author { id: "u2".into(), name: "Bo".into() });
    }

    #[test]
    fn comment_created_accepts_both_id_fields() {
        let a: CommentCreatedWire = serde_json::from_value(json!({"_id": "c1"})).unwrap();
        let b: CommentCreatedWire =
            serde_json::from_value(json!({"message": "ok", "comment_id": "c2"})).unwrap();
        let c: CommentCreatedWire = serde_json::from_value(json!({"message": "ok"})).unwrap();
        assert_eq!(a.id.as_deref(), Some("c1"));
        assert_eq!(b.id.as_deref(), Some("c2"));
        assert!(c.id.is_none());
    }

    #[test]
    fn request_bodies_use_wire_names() {
        let body = serde_json::to_value(CommentBody { r_id: "r1", comment: "hi" }).unwrap();
        assert_eq!(body, json!({"r_id": "r1", "comment": "hi"}));

        let body = serde_json::to_value(CreateResolutionBody {
            resolution: "Sleep 8h",
            tags: vec![Tag::Health.as_str()],
        })
        .unwrap();
        assert_eq!(body, json!({"resolution": "Sleep 8h", "tags": ["Health"]}));
    }

    #[test]
    fn verify_user_maps_image_to_avatar() {
        let v: VerifyWire = serde_json::from_value(json!({
            "user": {"id": "u1", "name": "Ana", "email": "ana@example.com", "image": ""}
        }))
        .unwrap();
        let id = v.user.into_identity();
        assert_eq!(id.name, "Ana");
        assert_eq!(id.avatar, None);
    }
}
