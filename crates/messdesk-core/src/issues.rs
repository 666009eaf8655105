//! Issue lifecycle engine: community tickets with a single resolution flag
//! and monotonic vote counters, no escalation tier.

use anyhow::Context;
use uuid::Uuid;

use messdesk_db::Database;
use messdesk_db::models::{IssueRow, VoteField};
use messdesk_types::api::{CreateIssueRequest, IssuePatch};
use messdesk_types::models::{Issue, Principal};

use crate::error::{Error, Result};
use crate::policy::{self, Action};
use crate::storage::{self, FileStore};
use crate::time;

pub fn create(db: &Database, principal: &Principal, input: CreateIssueRequest) -> Result<Issue> {
    policy::authorize(principal, Action::Create)?;

    validate_title(&input.issue_title)?;
    validate_message(&input.issue_message)?;

    let id = Uuid::new_v4();
    db.insert_issue(
        &id.to_string(),
        &principal.id.to_string(),
        &input.issue_title,
        &input.issue_message,
        input.image.as_deref(),
    )?;

    get_by_id(db, id)
}

pub fn update(
    db: &Database,
    files: &dyn FileStore,
    principal: &Principal,
    issue_id: Uuid,
    patch: IssuePatch,
) -> Result<Issue> {
    let current = get_by_id(db, issue_id)?;
    policy::authorize(principal, Action::EditOwn { owner: current.sender_id })?;

    if let Some(title) = &patch.issue_title {
        validate_title(title)?;
    }
    if let Some(message) = &patch.issue_message {
        validate_message(message)?;
    }

    let title = patch.issue_title.unwrap_or(current.issue_title);
    let message = patch.issue_message.unwrap_or(current.issue_message);
    let image = match patch.image {
        Some(new) => {
            if let Some(old) = &current.image {
                if old != &new {
                    storage::remove_best_effort(files, old);
                }
            }
            Some(new)
        }
        None => current.image,
    };

    db.update_issue_fields(&issue_id.to_string(), &title, &message, image.as_deref())?;

    get_by_id(db, issue_id)
}

/// Owner deletion removes the stored image along with the record.
pub fn delete(
    db: &Database,
    files: &dyn FileStore,
    principal: &Principal,
    issue_id: Uuid,
) -> Result<()> {
    let current = get_by_id(db, issue_id)?;
    policy::authorize(principal, Action::DeleteOwn { owner: current.sender_id })?;

    if let Some(image) = &current.image {
        storage::remove_best_effort(files, image);
    }
    db.delete_issue(&issue_id.to_string())?;
    Ok(())
}

/// All issues, most-upvoted first.
pub fn list_all(db: &Database) -> Result<Vec<Issue>> {
    let rows = db.list_issues()?;
    rows.into_iter().map(from_row).collect()
}

pub fn get_by_id(db: &Database, issue_id: Uuid) -> Result<Issue> {
    db.get_issue(&issue_id.to_string())?
        .map(from_row)
        .transpose()?
        .ok_or_else(|| Error::not_found("issue not found"))
}

pub fn upvote(db: &Database, issue_id: Uuid) -> Result<i64> {
    increment(db, issue_id, VoteField::Up)
}

pub fn downvote(db: &Database, issue_id: Uuid) -> Result<i64> {
    increment(db, issue_id, VoteField::Down)
}

fn increment(db: &Database, issue_id: Uuid, field: VoteField) -> Result<i64> {
    db.increment_issue_vote(&issue_id.to_string(), field)?
        .ok_or_else(|| Error::not_found("issue not found"))
}

pub fn set_resolved(
    db: &Database,
    principal: &Principal,
    issue_id: Uuid,
    resolved: bool,
) -> Result<Issue> {
    policy::authorize(principal, Action::AdminResolve)?;

    let changed = db.set_issue_resolved(&issue_id.to_string(), resolved)?;
    if changed == 0 {
        return Err(Error::not_found("issue not found"));
    }
    get_by_id(db, issue_id)
}

/// Authority-tier deletion, unscoped by ownership.
pub fn admin_delete(db: &Database, principal: &Principal, issue_id: Uuid) -> Result<()> {
    policy::authorize(principal, Action::AdminDelete)?;

    let changed = db.delete_issue(&issue_id.to_string())?;
    if changed == 0 {
        return Err(Error::not_found("issue not found"));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().chars().count() < 5 {
        return Err(Error::validation(
            "'issue_title' is required and must be at least 5 characters long",
        ));
    }
    Ok(())
}

fn validate_message(message: &str) -> Result<()> {
    if message.chars().count() < 10 {
        return Err(Error::validation(
            "'issue_message' is required and must be at least 10 characters long",
        ));
    }
    Ok(())
}

fn from_row(row: IssueRow) -> Result<Issue> {
    let id = row.id.parse::<Uuid>().with_context(|| format!("corrupt issue id '{}'", row.id))?;
    let sender_id = row
        .sender_id
        .parse::<Uuid>()
        .with_context(|| format!("corrupt issue sender_id '{}'", row.sender_id))?;
    Ok(Issue {
        id,
        sender_id,
        issue_title: row.issue_title,
        issue_message: row.issue_message,
        image: row.image,
        resolved: row.resolved,
        upvotes: row.upvotes,
        downvotes: row.downvotes,
        created_at: time::parse_timestamp(&row.created_at),
        updated_at: time::parse_timestamp(&row.updated_at),
    })
}
