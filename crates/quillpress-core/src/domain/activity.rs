//! Audit trail of post mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::domain::{Post, PrincipalKind};

/// What happened to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityEvent {
    Created,
    Updated,
    Deleted,
}

impl ActivityEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityEvent::Created => "created",
            ActivityEvent::Updated => "updated",
            ActivityEvent::Deleted => "deleted",
        }
    }
}

/// Who caused an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Causer {
    pub id: Uuid,
    pub kind: PrincipalKind,
    pub name: String,
}

/// A recorded activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub description: String,
    pub subject_id: Uuid,
    pub causer: Option<Causer>,
    pub properties: Value,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of the post attributes the audit log tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedAttributes {
    pub title: String,
    pub category_id: Option<Uuid>,
}

impl From<&Post> for TrackedAttributes {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            category_id: post.category_id,
        }
    }
}

impl TrackedAttributes {
    fn entries(&self) -> [(&'static str, Value); 2] {
        [
            ("title", json!(self.title)),
            ("category_id", json!(self.category_id)),
        ]
    }
}

impl Activity {
    fn build(event: ActivityEvent, subject_id: Uuid, causer: Option<Causer>, properties: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: event.as_str().to_string(),
            subject_id,
            causer,
            properties,
            created_at: Utc::now(),
        }
    }

    pub fn created(post: &Post, causer: Option<Causer>) -> Self {
        let attributes: Map<String, Value> = TrackedAttributes::from(post)
            .entries()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self::build(
            ActivityEvent::Created,
            post.id,
            causer,
            json!({ "attributes": attributes }),
        )
    }

    /// Record only the tracked attributes that changed. `None` when nothing did.
    pub fn updated(before: &TrackedAttributes, after: &Post, causer: Option<Causer>) -> Option<Self> {
        let after_attrs = TrackedAttributes::from(after);
        let mut old = Map::new();
        let mut new = Map::new();
        for ((key, was), (_, now)) in before.entries().into_iter().zip(after_attrs.entries()) {
            if was != now {
                old.insert(key.to_string(), was);
                new.insert(key.to_string(), now);
            }
        }

        if new.is_empty() {
            return None;
        }
        Some(Self::build(
            ActivityEvent::Updated,
            after.id,
            causer,
            json!({ "old": old, "attributes": new }),
        ))
    }

    pub fn deleted(post: &Post, causer: Option<Causer>) -> Self {
        let old: Map<String, Value> = TrackedAttributes::from(post)
            .entries()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self::build(ActivityEvent::Deleted, post.id, causer, json!({ "old": old }))
    }

    /// Display name of the causer, `System` when unknown.
    pub fn causer_name(&self) -> &str {
        self.causer.as_ref().map(|c| c.name.as_str()).unwrap_or("System")
    }
}
