//! Map marker projection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Category, Issue, Status};

#[must_use]
pub const fn status_color(status: Status) -> &'static str {
    match status {
        Status::Submitted => "#f59e0b",
        Status::Acknowledged => "#3b82f6",
        Status::Assigned => "#8b5cf6",
        Status::Resolved => "#10b981",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPopup {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_photo: Option<String>,
    pub upvotes: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub issue_id: String,
    pub lat: f64,
    pub lng: f64,
    pub status: Status,
    pub color: &'static str,
    pub popup: MarkerPopup,
}

impl From<&Issue> for MapMarker {
    fn from(issue: &Issue) -> Self {
        Self {
            issue_id: issue.id.clone(),
            lat: issue.location.lat,
            lng: issue.location.lng,
            status: issue.status,
            color: status_color(issue.status),
            popup: MarkerPopup {
                title: issue.title.clone(),
                description: issue.description.clone(),
                category: issue.category,
                status: issue.status,
                first_photo: issue.first_photo().map(str::to_string),
                upvotes: issue.upvotes,
                created_at: issue.created_at,
            },
        }
    }
}

/// One marker per issue, same order.
#[must_use]
pub fn markers<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Vec<MapMarker> {
    issues.into_iter().map(MapMarker::from).collect()
}
