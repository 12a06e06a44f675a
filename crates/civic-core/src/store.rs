//! The issue store: canonical collection plus session context.
//!
//! All mutation goes through [`IssueStore`]. Each operation builds the next
//! snapshot, hands it to the persistence adapter, then installs it in memory.
//! A failed write is logged and the in-memory update still stands; the two
//! reconverge on the next successful write or process restart.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CivicError, ErrorCode};
use crate::lock::WriteLock;
use crate::model::{Comment, Issue, IssueDraft, Language, Role, Session, Status, User};
use crate::seed;
use crate::storage::{KvStore, keys, load_json, save_json};

/// Author used on official comments when the acting user has no name.
pub const SYSTEM_AUTHOR: &str = "System";

/// A user-facing message produced by a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    /// Show after this long; `None` means immediately.
    #[serde(rename = "delay_ms", skip_serializing_if = "Option::is_none", with = "delay_ms")]
    pub delay: Option<Duration>,
}

impl Notice {
    fn now(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            delay: None,
        }
    }

    fn after(message: impl Into<String>, delay: Duration) -> Self {
        Self {
            message: message.into(),
            delay: Some(delay),
        }
    }
}

mod delay_ms {
    use serde::Serializer;
    use std::time::Duration;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(delay: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match delay {
            Some(d) => s.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => s.serialize_none(),
        }
    }
}

/// Result of a successful issue mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Applied {
    pub issue: Issue,
    pub notices: Vec<Notice>,
}

/// Vote sets as stored under `upvotes`.
///
/// Older data holds a bare array for the single local user; that form is
/// still accepted and attributed to whoever is signed in.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredVotes {
    ByUser(BTreeMap<String, Vec<String>>),
    Legacy(Vec<String>),
}

pub struct IssueStore<S: KvStore> {
    backend: S,
    issues: Vec<Issue>,
    votes: BTreeMap<String, Vec<String>>,
    language: Language,
    session: Session,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KvStore> IssueStore<S> {
    /// Load persisted state, seeding the mock dataset into an empty store.
    ///
    /// Never fails: unreadable documents are treated as absent.
    pub fn initialize(backend: S) -> Self {
        let stored: Vec<Issue> = load_json(&backend, keys::ISSUES, Vec::new());
        let issues = if stored.is_empty() {
            let seeded = seed::issues();
            tracing::info!(count = seeded.len(), "no stored issues, seeding mock data");
            save_json(&backend, keys::ISSUES, &seeded);
            seeded
        } else {
            tracing::debug!(count = stored.len(), "loaded issues");
            stored
        };

        let language = load_json(&backend, keys::LANGUAGE, Language::default());
        let user: Option<User> = load_json(&backend, keys::CURRENT_USER, None);
        let session = user.map_or_else(Session::default, Session::from);

        let votes = load_votes(&backend, &session);

        Self {
            backend,
            issues,
            votes,
            language,
            session,
            clock: Utc::now,
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Current collection, newest first.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    #[must_use]
    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn has_voted(&self, user_id: &str, issue_id: &str) -> bool {
        self.votes
            .get(user_id)
            .is_some_and(|ids| ids.iter().any(|id| id == issue_id))
    }

    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if self.issue(&id).is_none() {
                return id;
            }
            tracing::warn!(%id, "generated issue id collided, retrying");
        }
    }

    /// Take the backend's update lock, then reload the documents a mutation
    /// reads so it builds on what other processes have written.
    ///
    /// Backends without an update lock keep the in-memory state as is.
    fn begin_update(&mut self) -> Option<WriteLock> {
        let guard = match self.backend.lock_for_update() {
            Ok(guard) => guard?,
            Err(e) => {
                tracing::warn!(
                    code = ErrorCode::LockContention.code(),
                    error = %e,
                    "update lock unavailable, continuing without it"
                );
                return None;
            }
        };
        let stored: Vec<Issue> = load_json(&self.backend, keys::ISSUES, Vec::new());
        if !stored.is_empty() {
            self.issues = stored;
        }
        self.votes = load_votes(&self.backend, &self.session);
        tracing::debug!(count = self.issues.len(), "refreshed under update lock");
        Some(guard)
    }

    fn commit_issues(&mut self, next: Vec<Issue>) {
        save_json(&self.backend, keys::ISSUES, &next);
        self.issues = next;
    }

    /// File a new report.
    ///
    /// # Errors
    ///
    /// [`CivicError::Validation`] if a required field is blank or the
    /// location is unknown; the collection is left unchanged.
    pub fn submit_issue(
        &mut self,
        draft: IssueDraft,
        session: &Session,
    ) -> Result<Applied, CivicError> {
        draft.validate()?;
        let _guard = self.begin_update();

        let now = (self.clock)();
        let reporter_id = (!draft.is_anonymous).then(|| session.user_id().to_string());
        let issue = Issue {
            id: self.fresh_id(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category,
            location: draft.location,
            photos: draft.photos,
            status: Status::Submitted,
            priority: draft.priority,
            created_at: now,
            updated_at: now,
            upvotes: 0,
            is_anonymous: draft.is_anonymous,
            reporter_id,
            assigned_department: draft.assigned_department,
            assigned_staff: draft.assigned_staff,
            public_comments: Vec::new(),
        };

        let mut next = Vec::with_capacity(self.issues.len() + 1);
        next.push(issue.clone());
        next.extend(self.issues.iter().cloned());
        self.commit_issues(next);

        tracing::info!(id = %issue.id, category = %issue.category, "issue submitted");
        Ok(Applied {
            issue,
            notices: vec![
                Notice::now("Issue reported successfully!"),
                Notice::after(
                    "Your issue has been registered with the municipal system.",
                    Duration::from_secs(2),
                ),
            ],
        })
    }

    /// Record one endorsement from `session`'s user.
    ///
    /// # Errors
    ///
    /// [`CivicError::IssueNotFound`] for an unknown id and
    /// [`CivicError::DuplicateVote`] if this user already voted; both leave
    /// state untouched.
    pub fn upvote(&mut self, issue_id: &str, session: &Session) -> Result<Applied, CivicError> {
        let user_id = session.user_id();
        let _guard = self.begin_update();
        let Some(index) = self.issues.iter().position(|i| i.id == issue_id) else {
            return Err(CivicError::IssueNotFound(issue_id.to_string()));
        };
        if self.has_voted(user_id, issue_id) {
            return Err(CivicError::DuplicateVote {
                user_id: user_id.to_string(),
                issue_id: issue_id.to_string(),
            });
        }

        let now = (self.clock)();
        let mut next = self.issues.clone();
        let issue = &mut next[index];
        issue.upvotes = issue.upvotes.saturating_add(1);
        issue.touch(now);
        let updated = issue.clone();

        let mut votes = self.votes.clone();
        votes
            .entry(user_id.to_string())
            .or_default()
            .push(issue_id.to_string());

        self.commit_issues(next);
        save_json(&self.backend, keys::UPVOTES, &votes);
        self.votes = votes;

        tracing::info!(id = issue_id, user = user_id, upvotes = updated.upvotes, "upvoted");
        Ok(Applied {
            issue: updated,
            notices: vec![Notice::now("Your vote has been counted!")],
        })
    }

    /// Move an issue to `new_status` and log it as an official comment.
    ///
    /// # Errors
    ///
    /// [`CivicError::PermissionDenied`] for citizen sessions,
    /// [`CivicError::IssueNotFound`] for unknown ids, and
    /// [`CivicError::InvalidTransition`] unless `new_status` is the stage
    /// immediately after the current one.
    pub fn change_status(
        &mut self,
        issue_id: &str,
        new_status: Status,
        session: &Session,
    ) -> Result<Applied, CivicError> {
        ensure_can_change_status(session)?;
        let _guard = self.begin_update();
        self.apply_status(issue_id, new_status, session)
    }

    /// Move an issue to the stage after its current one.
    ///
    /// # Errors
    ///
    /// As [`IssueStore::change_status`], plus [`CivicError::FinalStatus`] for
    /// resolved issues.
    pub fn advance_status(
        &mut self,
        issue_id: &str,
        session: &Session,
    ) -> Result<Applied, CivicError> {
        ensure_can_change_status(session)?;
        let _guard = self.begin_update();
        let current = self
            .issue(issue_id)
            .ok_or_else(|| CivicError::IssueNotFound(issue_id.to_string()))?
            .status;
        let next = current.next().ok_or(CivicError::FinalStatus(current))?;
        self.apply_status(issue_id, next, session)
    }

    fn apply_status(
        &mut self,
        issue_id: &str,
        new_status: Status,
        session: &Session,
    ) -> Result<Applied, CivicError> {
        let Some(index) = self.issues.iter().position(|i| i.id == issue_id) else {
            return Err(CivicError::IssueNotFound(issue_id.to_string()));
        };
        let from = self.issues[index].status;
        if !from.can_transition_to(new_status) {
            return Err(CivicError::InvalidTransition {
                from,
                to: new_status,
            });
        }

        let now = (self.clock)();
        let mut next = self.issues.clone();
        let issue = &mut next[index];
        let author = if session.name().trim().is_empty() {
            SYSTEM_AUTHOR.to_string()
        } else {
            session.name().to_string()
        };
        let comment_id = loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !issue.public_comments.iter().any(|c| c.id == id) {
                break id;
            }
        };
        issue.status = new_status;
        issue.touch(now);
        issue.public_comments.push(Comment {
            id: comment_id,
            text: format!("Status changed to {new_status} by municipal staff."),
            author,
            created_at: now,
            is_official: true,
        });
        let updated = issue.clone();
        self.commit_issues(next);

        tracing::info!(id = issue_id, %from, to = %new_status, by = session.user_id(), "status changed");
        let mut notices = vec![Notice::now(format!("Issue status updated to {new_status}!"))];
        if new_status == Status::Resolved {
            notices.push(Notice::after(
                "Issue has been resolved! Thank you for your report.",
                Duration::from_secs(1),
            ));
        }
        Ok(Applied {
            issue: updated,
            notices,
        })
    }

    pub fn set_language(&mut self, language: Language) {
        save_json(&self.backend, keys::LANGUAGE, &language);
        self.language = language;
        tracing::info!(%language, "language changed");
    }

    pub fn set_current_user(&mut self, user: User) {
        save_json(&self.backend, keys::CURRENT_USER, &user);
        tracing::info!(user = %user.id, role = %user.role, "current user changed");
        self.session = Session::from(user);
    }

    /// Keep the signed-in identity, change only the role.
    pub fn switch_role(&mut self, role: Role) {
        let user = self.session.with_role(role).to_user();
        self.set_current_user(user);
    }
}

const fn ensure_can_change_status(session: &Session) -> Result<(), CivicError> {
    if session.can_change_status() {
        Ok(())
    } else {
        Err(CivicError::PermissionDenied {
            action: "changing issue status",
        })
    }
}

fn load_votes(backend: &dyn KvStore, session: &Session) -> BTreeMap<String, Vec<String>> {
    let stored: Option<StoredVotes> = load_json(backend, keys::UPVOTES, None);
    match stored {
        Some(StoredVotes::ByUser(map)) => map,
        Some(StoredVotes::Legacy(ids)) => {
            tracing::debug!(user = session.user_id(), "migrating legacy vote list");
            BTreeMap::from([(session.user_id().to_string(), ids)])
        }
        None => BTreeMap::new(),
    }
}
