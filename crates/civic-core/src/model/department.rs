use serde::{Deserialize, Serialize};
use std::fmt;

/// Static department reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub categories: Vec<String>,
    /// Mean days from report to first response.
    pub avg_response_time: f64,
    pub total_issues: u32,
    pub resolved_issues: u32,
}

impl Department {
    /// Percentage of issues resolved, 0 when the department has none.
    #[must_use]
    pub fn resolution_rate(&self) -> f64 {
        if self.total_issues == 0 {
            return 0.0;
        }
        f64::from(self.resolved_issues) / f64::from(self.total_issues) * 100.0
    }

    #[must_use]
    pub fn rating(&self) -> Rating {
        Rating::from_rate(self.resolution_rate())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Rating {
    #[must_use]
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 90.0 {
            Self::Excellent
        } else if rate >= 75.0 {
            Self::Good
        } else {
            Self::NeedsImprovement
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
