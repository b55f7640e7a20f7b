//! Entity schemas: the record shapes stored in each collection, the typed
//! inputs they are built from, and the validation rules they enforce.

use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::store::{Record, ID_FIELD};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    Required(&'static str),
    #[error("field `{field}` is not a valid email address: {value:?}")]
    InvalidEmail { field: &'static str, value: String },
    #[error("field `slug` must be URL-safe: {0:?}")]
    InvalidSlug(String),
    #[error("invalid {kind} record: {reason}")]
    InvalidRecord { kind: &'static str, reason: String },
    #[error("{kind} maps to collection `{collection}`, expected `{expected}`")]
    CollectionMapping {
        kind: &'static str,
        collection: &'static str,
        expected: String,
    },
}

lazy_static::lazy_static! {
    /// Local part, `@`, then at least two dot-separated DNS labels.
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$"
    ).unwrap();

    /// RFC 3986 unreserved characters.
    static ref SLUG_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._~-]+$").unwrap();
}

const MAX_EMAIL_LEN: usize = 254;

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_REGEX.is_match(email)
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

fn require_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require(field, value)?;
    if !is_valid_email(value) {
        return Err(ValidationError::InvalidEmail {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// `null` and a missing list both read as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_published() -> bool {
    true
}

// ============================================================================
// Entity kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    BlogPost,
    ContactMessage,
    TeamMember,
    AuthUser,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::BlogPost,
        EntityKind::ContactMessage,
        EntityKind::TeamMember,
        EntityKind::AuthUser,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            EntityKind::BlogPost => "BlogPost",
            EntityKind::ContactMessage => "ContactMessage",
            EntityKind::TeamMember => "TeamMember",
            EntityKind::AuthUser => "AuthUser",
        }
    }

    /// Storage collection holding records of this kind.
    pub const fn collection(self) -> &'static str {
        match self {
            EntityKind::BlogPost => "blogpost",
            EntityKind::ContactMessage => "contactmessage",
            EntityKind::TeamMember => "teammember",
            EntityKind::AuthUser => "authuser",
        }
    }

    /// Every kind must map to its lower-cased name, and no two kinds may
    /// share a collection. Checked once at startup.
    pub fn verify_collection_mapping() -> Result<(), ValidationError> {
        let mut seen = Vec::with_capacity(Self::ALL.len());
        for kind in Self::ALL {
            let expected = kind.name().to_lowercase();
            if kind.collection() != expected || seen.contains(&kind.collection()) {
                return Err(ValidationError::CollectionMapping {
                    kind: kind.name(),
                    collection: kind.collection(),
                    expected,
                });
            }
            seen.push(kind.collection());
        }
        Ok(())
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A record shape stored in exactly one collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: EntityKind;

    fn validate(&self) -> Result<(), ValidationError>;

    /// Rebuild an entity from a stored record, dropping its identifier.
    /// Unknown stored fields are ignored; everything else is validated.
    fn from_record(mut record: Record) -> Result<Self, ValidationError> {
        record.remove(ID_FIELD);
        let entity: Self =
            serde_json::from_value(Value::Object(record)).map_err(|e| {
                ValidationError::InvalidRecord {
                    kind: Self::KIND.name(),
                    reason: e.to_string(),
                }
            })?;
        entity.validate()?;
        Ok(entity)
    }
}

// ============================================================================
// BlogPost
// ============================================================================

/// Blog post. Collection: `blogpost`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    /// URL-friendly identifier. Uniqueness is not enforced.
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Markdown or HTML body.
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default = "default_published")]
    pub published: bool,
}

/// Request body for creating a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBlogPost {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl BlogPost {
    pub fn new(input: NewBlogPost) -> Result<Self, ValidationError> {
        let post = Self {
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            author: input.author,
            tags: input.tags.unwrap_or_default(),
            published: input.published.unwrap_or_else(default_published),
        };
        post.validate()?;
        Ok(post)
    }
}

impl Entity for BlogPost {
    const KIND: EntityKind = EntityKind::BlogPost;

    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("slug", &self.slug)?;
        require("content", &self.content)?;
        if !is_valid_slug(&self.slug) {
            return Err(ValidationError::InvalidSlug(self.slug.clone()));
        }
        Ok(())
    }
}

// ============================================================================
// ContactMessage
// ============================================================================

/// Contact form submission. Collection: `contactmessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn new(input: NewContactMessage) -> Result<Self, ValidationError> {
        let msg = Self {
            name: input.name,
            email: input.email.trim().to_string(),
            message: input.message,
        };
        msg.validate()?;
        Ok(msg)
    }
}

impl Entity for ContactMessage {
    const KIND: EntityKind = EntityKind::ContactMessage;

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require_email("email", &self.email)?;
        require("message", &self.message)
    }
}

// ============================================================================
// TeamMember / AuthUser
//
// No route reads or writes these yet.
// ============================================================================

/// Team page entry. Collection: `teammember`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl TeamMember {
    pub fn new(input: NewTeamMember) -> Result<Self, ValidationError> {
        let member = Self {
            name: input.name,
            role: input.role,
            avatar_url: input.avatar_url,
            bio: input.bio,
        };
        member.validate()?;
        Ok(member)
    }
}

impl Entity for TeamMember {
    const KIND: EntityKind = EntityKind::TeamMember;

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("role", &self.role)
    }
}

/// Account record. Collection: `authuser`. Email uniqueness is not enforced.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl std::fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthUser")
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAuthUser {
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl AuthUser {
    pub fn new(input: NewAuthUser) -> Result<Self, ValidationError> {
        let user = Self {
            email: input.email.trim().to_string(),
            password_hash: input.password_hash,
            name: input.name,
        };
        user.validate()?;
        Ok(user)
    }
}

impl Entity for AuthUser {
    const KIND: EntityKind = EntityKind::AuthUser;

    fn validate(&self) -> Result<(), ValidationError> {
        require_email("email", &self.email)?;
        require("password_hash", &self.password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_post() -> NewBlogPost {
        NewBlogPost {
            title: "Hello".to_string(),
            slug: "hello-world".to_string(),
            excerpt: None,
            content: "Body".to_string(),
            author: None,
            tags: None,
            published: None,
        }
    }

    #[test]
    fn test_collection_mapping_is_consistent() {
        assert!(EntityKind::verify_collection_mapping().is_ok());
        assert_eq!(EntityKind::BlogPost.collection(), "blogpost");
        assert_eq!(EntityKind::ContactMessage.collection(), "contactmessage");
        assert_eq!(EntityKind::TeamMember.collection(), "teammember");
        assert_eq!(EntityKind::AuthUser.collection(), "authuser");
    }

    #[test]
    fn test_blog_post_defaults() {
        let post = BlogPost::new(new_post()).unwrap();
        assert!(post.tags.is_empty());
        assert!(post.published);
    }

    #[test]
    fn test_blog_post_blank_required_field_rejected() {
        let err = BlogPost::new(NewBlogPost {
            content: "   ".to_string(),
            ..new_post()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::Required("content"));
    }

    #[test]
    fn test_blog_post_slug_must_be_url_safe() {
        let err = BlogPost::new(NewBlogPost {
            slug: "hello world".to_string(),
            ..new_post()
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidSlug(_)));
    }

    #[test]
    fn test_new_blog_post_rejects_unknown_fields() {
        let result = serde_json::from_value::<NewBlogPost>(json!({
            "title": "t", "slug": "s", "content": "c", "views": 3
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_blog_post_requires_title() {
        let result = serde_json::from_value::<NewBlogPost>(json!({
            "slug": "s", "content": "c"
        }));
        assert!(result.unwrap_err().to_string().contains("title"));
    }

    #[test]
    fn test_from_record_strips_id_and_ignores_extras() {
        let record = json!({
            "_id": "abc",
            "title": "t",
            "slug": "s",
            "content": "c",
            "tags": null,
            "legacy": 1
        });
        let post = BlogPost::from_record(record.as_object().cloned().unwrap()).unwrap();
        assert_eq!(post.title, "t");
        assert!(post.tags.is_empty());
        assert!(post.published);
    }

    #[test]
    fn test_from_record_reports_missing_field() {
        let record = json!({ "_id": "abc", "title": "t" });
        let err = BlogPost::from_record(record.as_object().cloned().unwrap()).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRecord { kind: "BlogPost", .. }));
    }

    #[test]
    fn test_from_record_rejects_wrong_tag_type() {
        let record = json!({ "title": "t", "slug": "s", "content": "c", "tags": "rust" });
        assert!(BlogPost::from_record(record.as_object().cloned().unwrap()).is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email(".a@b.com"));
    }

    #[test]
    fn test_contact_message_requires_valid_email() {
        let err = ContactMessage::new(NewContactMessage {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            message: "Hi".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEmail { field: "email", .. }));
    }

    #[test]
    fn test_team_member_optional_fields() {
        let member = TeamMember::new(NewTeamMember {
            name: "Grace".to_string(),
            role: "Engineer".to_string(),
            avatar_url: None,
            bio: None,
        })
        .unwrap();
        let value = serde_json::to_value(&member).unwrap();
        assert_eq!(value["avatar_url"], Value::Null);

        let err = TeamMember::new(NewTeamMember {
            name: "Grace".to_string(),
            role: " ".to_string(),
            avatar_url: None,
            bio: Some("Compilers".to_string()),
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::Required("role"));
    }

    #[test]
    fn test_auth_user_debug_redacts_hash() {
        let user = AuthUser::new(NewAuthUser {
            email: "admin@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            name: None,
        })
        .unwrap();
        let debug = format!("{:?}", user);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("admin@example.com"));
    }

    #[test]
    fn test_auth_user_requires_email_format() {
        assert!(AuthUser::new(NewAuthUser {
            email: "nope".to_string(),
            password_hash: "hash".to_string(),
            name: Some("Admin".to_string()),
        })
        .is_err());
    }
}
