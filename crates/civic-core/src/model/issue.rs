use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{MissingField, ValidationError};

/// The fixed set of reportable categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Road Maintenance")]
    RoadMaintenance,
    #[serde(rename = "Street Lighting")]
    StreetLighting,
    #[serde(rename = "Waste Management")]
    WasteManagement,
    #[serde(rename = "Water Leaks")]
    WaterLeaks,
    #[serde(rename = "Drainage")]
    Drainage,
    #[serde(rename = "Traffic Signals")]
    TrafficSignals,
    #[serde(rename = "Public Toilets")]
    PublicToilets,
    #[serde(rename = "Parks & Recreation")]
    ParksRecreation,
    #[serde(rename = "Building Violations")]
    BuildingViolations,
    #[serde(rename = "Noise Complaints")]
    NoiseComplaints,
}

impl Category {
    /// Every category, in the order the report form lists them.
    pub const ALL: [Self; 10] = [
        Self::RoadMaintenance,
        Self::StreetLighting,
        Self::WasteManagement,
        Self::WaterLeaks,
        Self::Drainage,
        Self::TrafficSignals,
        Self::PublicToilets,
        Self::ParksRecreation,
        Self::BuildingViolations,
        Self::NoiseComplaints,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoadMaintenance => "Road Maintenance",
            Self::StreetLighting => "Street Lighting",
            Self::WasteManagement => "Waste Management",
            Self::WaterLeaks => "Water Leaks",
            Self::Drainage => "Drainage",
            Self::TrafficSignals => "Traffic Signals",
            Self::PublicToilets => "Public Toilets",
            Self::ParksRecreation => "Parks & Recreation",
            Self::BuildingViolations => "Building Violations",
            Self::NoiseComplaints => "Noise Complaints",
        }
    }

    /// Short kebab-case alias accepted on the command line.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::RoadMaintenance => "road-maintenance",
            Self::StreetLighting => "street-lighting",
            Self::WasteManagement => "waste-management",
            Self::WaterLeaks => "water-leaks",
            Self::Drainage => "drainage",
            Self::TrafficSignals => "traffic-signals",
            Self::PublicToilets => "public-toilets",
            Self::ParksRecreation => "parks-recreation",
            Self::BuildingViolations => "building-violations",
            Self::NoiseComplaints => "noise-complaints",
        }
    }
}

/// The four lifecycle stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Submitted,
    Acknowledged,
    Assigned,
    Resolved,
}

impl Status {
    pub const ALL: [Self; 4] = [
        Self::Submitted,
        Self::Acknowledged,
        Self::Assigned,
        Self::Resolved,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Acknowledged => "acknowledged",
            Self::Assigned => "assigned",
            Self::Resolved => "resolved",
        }
    }

    /// The stage that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Submitted => Some(Self::Acknowledged),
            Self::Acknowledged => Some(Self::Assigned),
            Self::Assigned => Some(Self::Resolved),
            Self::Resolved => None,
        }
    }

    /// Only a single step forward is allowed; no skips, no reverts, no no-ops.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Label for the status-action button offered at this stage.
    #[must_use]
    pub const fn action_label(self) -> Option<&'static str> {
        match self {
            Self::Submitted => Some("Acknowledge"),
            Self::Acknowledged => Some("Assign"),
            Self::Assigned => Some("Mark Resolved"),
            Self::Resolved => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
}

impl Location {
    /// Zero coordinates mean the position was never captured.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.lat != 0.0 && self.lng != 0.0 && self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub is_official: bool,
}

/// A reported civic problem and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: Location,
    #[serde(default)]
    pub photos: Vec<String>,
    pub status: Status,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff: Option<String>,
    #[serde(default)]
    pub public_comments: Vec<Comment>,
}

impl Issue {
    /// Advance `updated_at`, never letting it fall behind `created_at` or its
    /// previous value.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        let floor = self.updated_at.max(self.created_at);
        self.updated_at = if now > floor {
            now
        } else {
            floor + chrono::Duration::milliseconds(1)
        };
    }

    #[must_use]
    pub fn first_photo(&self) -> Option<&str> {
        self.photos.first().map(String::as_str)
    }
}

/// Everything a citizen supplies when filing a report.
///
/// Identity, timestamps, status, votes and comments are assigned by the
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: Location,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff: Option<String>,
}

impl IssueDraft {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        location: Location,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category,
            location,
            photos: Vec::new(),
            priority: Priority::default(),
            is_anonymous: false,
            assigned_department: None,
            assigned_staff: None,
        }
    }

    /// Check the fields the report form requires.
    ///
    /// # Errors
    ///
    /// Returns every blank or unknown required field at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push(MissingField::Title);
        }
        if self.description.trim().is_empty() {
            missing.push(MissingField::Description);
        }
        if !self.location.is_known() {
            missing.push(MissingField::Location);
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Self::ALL
            .into_iter()
            .find(|c| normalized == c.slug() || normalized == c.as_str().to_ascii_lowercase())
            .ok_or_else(|| ParseEnumError {
                expected: "category",
                got: s.to_string(),
            })
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "submitted" => Ok(Self::Submitted),
            "acknowledged" => Ok(Self::Acknowledged),
            "assigned" => Ok(Self::Assigned),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ahmedabad() -> Location {
        Location {
            lat: 23.0225,
            lng: 72.5714,
            address: "Main Street".into(),
        }
    }

    #[test]
    fn enum_json_uses_display_strings() {
        assert_eq!(
            serde_json::to_string(&Category::ParksRecreation).unwrap(),
            "\"Parks & Recreation\""
        );
        assert_eq!(serde_json::to_string(&Status::Assigned).unwrap(), "\"assigned\"");
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::from_str::<Category>("\"Waste Management\"").unwrap(),
            Category::WasteManagement
        );
    }

    #[test]
    fn category_parses_slug_and_display_name() {
        assert_eq!(
            Category::from_str("street-lighting").unwrap(),
            Category::StreetLighting
        );
        assert_eq!(
            Category::from_str("  Noise Complaints ").unwrap(),
            Category::NoiseComplaints
        );
        assert!(Category::from_str("potholes").is_err());
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert!(Status::from_str("closed").is_err());
        assert!(Priority::from_str("urgent").is_err());
        let err = Status::from_str("closed").unwrap_err();
        assert_eq!(err.to_string(), "invalid status: 'closed'");
    }

    #[test]
    fn status_only_moves_one_step_forward() {
        assert!(Status::Submitted.can_transition_to(Status::Acknowledged));
        assert!(Status::Acknowledged.can_transition_to(Status::Assigned));
        assert!(Status::Assigned.can_transition_to(Status::Resolved));

        assert!(!Status::Submitted.can_transition_to(Status::Resolved));
        assert!(!Status::Resolved.can_transition_to(Status::Assigned));
        assert!(!Status::Assigned.can_transition_to(Status::Assigned));
        assert_eq!(Status::Resolved.next(), None);
        assert_eq!(Status::Resolved.action_label(), None);
    }

    #[test]
    fn zero_coordinates_are_unknown() {
        assert!(!Location::default().is_known());
        assert!(ahmedabad().is_known());
        let half = Location {
            lat: 23.0,
            lng: 0.0,
            address: String::new(),
        };
        assert!(!half.is_known());
    }

    #[test]
    fn draft_validation_reports_all_missing_fields() {
        let draft = IssueDraft::new("  ", "", Category::Drainage, Location::default());
        let err = draft.validate().unwrap_err();
        assert_eq!(
            err.missing,
            vec![
                MissingField::Title,
                MissingField::Description,
                MissingField::Location
            ]
        );

        let ok = IssueDraft::new("Blocked drain", "Water pooling", Category::Drainage, ahmedabad());
        assert!(ok.validate().is_ok());
        assert_eq!(ok.priority, Priority::Medium);
    }

    #[test]
    fn touch_never_moves_backwards() {
        let created = DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut issue = Issue {
            id: "x".into(),
            title: "t".into(),
            description: "d".into(),
            category: Category::Drainage,
            location: ahmedabad(),
            photos: vec![],
            status: Status::Submitted,
            priority: Priority::Low,
            created_at: created,
            updated_at: created,
            upvotes: 0,
            is_anonymous: false,
            reporter_id: None,
            assigned_department: None,
            assigned_staff: None,
            public_comments: vec![],
        };
        issue.touch(created - chrono::Duration::days(1));
        assert!(issue.updated_at > created);
    }

    #[test]
    fn issue_json_is_camel_case() {
        let created = Utc::now();
        let draft = IssueDraft::new("t", "d", Category::Drainage, ahmedabad());
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("isAnonymous").is_some());
        assert!(value.get("assignedDepartment").is_none());

        let comment = Comment {
            id: "c".into(),
            text: "hi".into(),
            author: "a".into(),
            created_at: created,
            is_official: true,
        };
        let value = serde_json::to_value(&comment).unwrap();
        assert_eq!(value["isOfficial"], true);
        assert!(value["createdAt"].is_string());
    }
}
