//! Pure derived views over an issue collection.

use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::model::issue::normalize;
use crate::model::{
    Category, Department, Issue, ParseEnumError, Priority, Rating, Role, Session, Status,
};

/// Dashboard list predicates. Every unset field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueFilter {
    pub category: Option<Category>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

impl IssueFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.search.as_deref().is_none_or(str::is_empty)
    }

    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        if self.category.is_some_and(|c| c != issue.category) {
            return false;
        }
        if self.status.is_some_and(|s| s != issue.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != issue.priority) {
            return false;
        }
        // Literal substring: surrounding whitespace is part of the needle.
        match self.search.as_deref() {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                issue.title.to_lowercase().contains(&needle)
                    || issue.description.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Issues matching every set predicate, in input order.
#[must_use]
pub fn filter<'a>(issues: &'a [Issue], f: &IssueFilter) -> Vec<&'a Issue> {
    issues.iter().filter(|issue| f.matches(issue)).collect()
}

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewScope {
    #[default]
    All,
    Mine,
    Municipal,
}

impl ViewScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Mine => "mine",
            Self::Municipal => "municipal",
        }
    }

    /// Tabs offered to a role: citizens get their own reports,
    /// staff and admins get the municipal view.
    #[must_use]
    pub const fn available_for(role: Role) -> [Self; 2] {
        match role {
            Role::Citizen => [Self::All, Self::Mine],
            Role::Staff | Role::Admin => [Self::All, Self::Municipal],
        }
    }

    #[must_use]
    pub fn is_available_for(self, role: Role) -> bool {
        Self::available_for(role).contains(&self)
    }
}

impl fmt::Display for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewScope {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "all" => Ok(Self::All),
            "mine" | "my-issues" => Ok(Self::Mine),
            "municipal" => Ok(Self::Municipal),
            _ => Err(ParseEnumError {
                expected: "view scope",
                got: s.to_string(),
            }),
        }
    }
}

/// Restrict to the viewer's tab. Anonymous reports carry no reporter and so
/// never appear under [`ViewScope::Mine`].
#[must_use]
pub fn scope_by_viewer<'a>(
    issues: &[&'a Issue],
    scope: ViewScope,
    session: &Session,
) -> Vec<&'a Issue> {
    match scope {
        ViewScope::All | ViewScope::Municipal => issues.to_vec(),
        ViewScope::Mine => issues
            .iter()
            .copied()
            .filter(|i| i.reporter_id.as_deref() == Some(session.user_id()))
            .collect(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueStats {
    pub total: usize,
    pub resolved: usize,
    /// Anything not yet resolved.
    pub pending: usize,
    /// Issues in the `assigned` stage.
    pub in_progress: usize,
    pub high_priority: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_status: BTreeMap<Status, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
}

/// Counts over `issues` in a single pass. `by_status` always has all four
/// stages.
#[must_use]
pub fn aggregate<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> IssueStats {
    let mut stats = IssueStats {
        by_status: Status::ALL.into_iter().map(|s| (s, 0)).collect(),
        ..IssueStats::default()
    };
    for issue in issues {
        stats.total += 1;
        match issue.status {
            Status::Resolved => stats.resolved += 1,
            Status::Assigned => {
                stats.in_progress += 1;
                stats.pending += 1;
            }
            Status::Submitted | Status::Acknowledged => stats.pending += 1,
        }
        if issue.priority == Priority::High {
            stats.high_priority += 1;
        }
        *stats.by_category.entry(issue.category).or_default() += 1;
        *stats.by_status.entry(issue.status).or_default() += 1;
        *stats.by_priority.entry(issue.priority).or_default() += 1;
    }
    stats
}

/// Landing page payload.
#[derive(Debug, Clone, Serialize)]
pub struct HomeView<'a> {
    pub stats: IssueStats,
    pub recent: Vec<&'a Issue>,
}

pub const HOME_RECENT_LIMIT: usize = 3;

#[must_use]
pub fn home(issues: &[Issue]) -> HomeView<'_> {
    HomeView {
        stats: aggregate(issues),
        recent: issues.iter().take(HOME_RECENT_LIMIT).collect(),
    }
}

pub const MAP_LIST_LIMIT: usize = 5;

/// Issues listed beside the map markers.
#[must_use]
pub fn map_list<'a>(filtered: &[&'a Issue]) -> Vec<&'a Issue> {
    filtered.iter().copied().take(MAP_LIST_LIMIT).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentPerformance {
    pub id: String,
    pub name: String,
    pub avg_response_time: f64,
    pub total_issues: u32,
    pub resolved_issues: u32,
    pub resolution_rate: f64,
    pub rating: Rating,
}

impl From<&Department> for DepartmentPerformance {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            avg_response_time: d.avg_response_time,
            total_issues: d.total_issues,
            resolved_issues: d.resolved_issues,
            resolution_rate: d.resolution_rate(),
            rating: d.rating(),
        }
    }
}

/// Admin analytics payload.
///
/// `departments` comes from static reference data; `assigned_by_department`
/// is the live tally from the collection. The two are not reconciled.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsView<'a> {
    pub stats: IssueStats,
    pub resolution_rate: f64,
    pub avg_response_days: f64,
    pub departments: Vec<DepartmentPerformance>,
    pub assigned_by_department: BTreeMap<String, usize>,
    pub unassigned: usize,
    pub urgent: Vec<&'a Issue>,
}

pub const URGENT_LIMIT: usize = 5;

#[must_use]
pub fn analytics<'a>(
    issues: &'a [Issue],
    departments: &[Department],
    avg_response_days: f64,
) -> AnalyticsView<'a> {
    let stats = aggregate(issues);
    let resolution_rate = if stats.total == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let rate = stats.resolved as f64 / stats.total as f64 * 100.0;
        rate
    };

    let mut assigned_by_department = BTreeMap::new();
    let mut unassigned = 0;
    for issue in issues {
        match &issue.assigned_department {
            Some(dept) => *assigned_by_department.entry(dept.clone()).or_default() += 1,
            None => unassigned += 1,
        }
    }

    let urgent = issues
        .iter()
        .filter(|i| i.priority == Priority::High && i.status != Status::Resolved)
        .take(URGENT_LIMIT)
        .collect();

    AnalyticsView {
        stats,
        resolution_rate,
        avg_response_days,
        departments: departments.iter().map(DepartmentPerformance::from).collect(),
        assigned_by_department,
        unassigned,
        urgent,
    }
}
