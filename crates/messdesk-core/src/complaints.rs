//! Complaint lifecycle engine: validation, ownership-gated edits, and the
//! two-stage escalation pipeline between the MR and higher tiers.

use anyhow::Context;
use uuid::Uuid;

use messdesk_db::Database;
use messdesk_db::models::ComplaintRow;
use messdesk_types::api::{ComplaintPatch, CreateComplaintRequest, StatusPatch};
use messdesk_types::models::{Category, Complaint, Mess, Principal, Role, Window};

use crate::error::{Error, Result};
use crate::policy::{self, Action, ListScope, StatusGrant};
use crate::storage::{self, FileStore};
use crate::time;

pub fn create(
    db: &Database,
    principal: &Principal,
    mess_number: Mess,
    input: CreateComplaintRequest,
) -> Result<Complaint> {
    policy::authorize(principal, Action::Create)?;

    validate_title(&input.complaint_title)?;
    validate_message(&input.complaint_message)?;
    validate_other(input.related, input.other.as_deref())?;

    let id = Uuid::new_v4();
    db.insert_complaint(
        &id.to_string(),
        &principal.id.to_string(),
        mess_number.as_str(),
        input.related.as_str(),
        input.other.as_deref(),
        &input.complaint_title,
        &input.complaint_message,
        input.image.as_deref(),
    )?;

    fetch(db, id).and_then(from_row)
}

pub fn update(
    db: &Database,
    files: &dyn FileStore,
    principal: &Principal,
    complaint_id: Uuid,
    patch: ComplaintPatch,
) -> Result<Complaint> {
    let current = fetch(db, complaint_id).and_then(from_row)?;
    policy::authorize(principal, Action::EditOwn { owner: current.sender_id })?;

    if let Some(title) = &patch.complaint_title {
        validate_title(title)?;
    }
    if let Some(message) = &patch.complaint_message {
        validate_message(message)?;
    }

    // The "other" invariant is re-checked on the merged view: a patch may
    // switch the category, the detail text, or both.
    let related = patch.related.unwrap_or(current.related);
    let other = patch.other.or(current.other);
    validate_other(related, other.as_deref())?;

    let title = patch.complaint_title.unwrap_or(current.complaint_title);
    let message = patch.complaint_message.unwrap_or(current.complaint_message);

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

    db.update_complaint_fields(
        &complaint_id.to_string(),
        related.as_str(),
        other.as_deref(),
        &title,
        &message,
        image.as_deref(),
    )?;

    fetch(db, complaint_id).and_then(from_row)
}

pub fn delete(db: &Database, principal: &Principal, complaint_id: Uuid) -> Result<()> {
    let row = fetch(db, complaint_id)?;
    let owner = parse_uuid(&row.sender_id, "complaint sender_id")?;
    policy::authorize(principal, Action::DeleteOwn { owner })?;

    db.delete_complaint(&complaint_id.to_string())?;
    Ok(())
}

pub fn list_for_mess(
    db: &Database,
    principal: &Principal,
    mess_number: Mess,
) -> Result<Vec<Complaint>> {
    let scope = policy::authorize_list(principal)?;
    let rows = db.list_complaints_for_mess(
        mess_number.as_str(),
        scope == ListScope::EscalatedOnly,
    )?;
    rows.into_iter().map(from_row).collect()
}

/// Complaints for a mess created within the current daily/weekly window,
/// newest first, under the same per-role visibility as `list_for_mess`.
/// An empty window is a NotFound condition, not an empty success list.
pub fn list_by_window(
    db: &Database,
    principal: &Principal,
    mess_number: Mess,
    window: Window,
) -> Result<Vec<Complaint>> {
    let scope = policy::authorize_list(principal)?;

    let (start, end) = time::window_bounds(window)?;
    let rows = db.list_complaints_between(
        mess_number.as_str(),
        &start,
        &end,
        scope == ListScope::EscalatedOnly,
    )?;
    if rows.is_empty() {
        return Err(Error::not_found("no complaints found in this period"));
    }
    rows.into_iter().map(from_row).collect()
}

/// The escalation transition. The policy grant is checked against a
/// snapshot; the guarded UPDATE then re-asserts the same predicates so the
/// write is a compare-and-set on the record state.
pub fn update_status(
    db: &Database,
    principal: &Principal,
    complaint_id: Uuid,
    patch: StatusPatch,
) -> Result<Complaint> {
    let row = fetch(db, complaint_id)?;
    let mess_number: Mess = parse_enum(&row.mess_number, "complaint mess_number")?;
    let grant = policy::authorize_status_update(principal, mess_number, row.sent_authority)?;

    // The higher tier's grant covers status only; a sent_authority value in
    // its patch is dropped rather than rejected.
    let sent_authority = match grant {
        StatusGrant::StatusAndEscalation => patch.sent_authority,
        StatusGrant::StatusOnly => None,
    };
    let require_mess = match &principal.role {
        Role::Mr { mess } => Some(mess.as_str()),
        Role::Higher | Role::Student => None,
    };

    let changed = db.update_complaint_status(
        &complaint_id.to_string(),
        patch.status.as_deref(),
        sent_authority,
        require_mess,
        grant == StatusGrant::StatusOnly,
    )?;
    if changed == 0 {
        return Err(Error::not_found("complaint not found"));
    }

    fetch(db, complaint_id).and_then(from_row)
}

fn fetch(db: &Database, complaint_id: Uuid) -> Result<ComplaintRow> {
    db.get_complaint(&complaint_id.to_string())?
        .ok_or_else(|| Error::not_found("complaint not found"))
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().chars().count() < 5 {
        return Err(Error::validation(
            "'complaint_title' is required and must be at least 5 characters long",
        ));
    }
    Ok(())
}

fn validate_message(message: &str) -> Result<()> {
    if message.chars().count() < 10 {
        return Err(Error::validation(
            "'complaint_message' is required and must be at least 10 characters long",
        ));
    }
    Ok(())
}

fn validate_other(related: Category, other: Option<&str>) -> Result<()> {
    if related == Category::Other && other.is_none_or(|s| s.trim().is_empty()) {
        return Err(Error::validation(
            "'other' field must be filled if 'related' is 'other'",
        ));
    }
    Ok(())
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid> {
    Ok(s.parse::<Uuid>().with_context(|| format!("corrupt {what} '{s}'"))?)
}

fn parse_enum<T>(s: &str, what: &str) -> Result<T>
where
    T: std::str::FromStr<Err = messdesk_types::models::UnknownVariant>,
{
    Ok(s.parse::<T>().with_context(|| format!("corrupt {what} '{s}'"))?)
}

fn from_row(row: ComplaintRow) -> Result<Complaint> {
    Ok(Complaint {
        id: parse_uuid(&row.id, "complaint id")?,
        sender_id: parse_uuid(&row.sender_id, "complaint sender_id")?,
        mess_number: parse_enum(&row.mess_number, "complaint mess_number")?,
        related: parse_enum(&row.related, "complaint related")?,
        other: row.other,
        complaint_title: row.complaint_title,
        complaint_message: row.complaint_message,
        image: row.image,
        status: row.status,
        sent_authority: row.sent_authority,
        created_at: time::parse_timestamp(&row.created_at),
        updated_at: time::parse_timestamp(&row.updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    fn new_complaint(related: Category, other: Option<&str>) -> CreateComplaintRequest {
        CreateComplaintRequest {
            related,
            other: other.map(str::to_string),
            complaint_title: "Leaking tap".to_string(),
            complaint_message: "The tap near counter two leaks all day".to_string(),
            image: None,
        }
    }

    #[test]
    fn create_validates_title_and_message_lengths() {
        let db = testutil::db();
        let sender = testutil::student(&db);

        let mut short_title = new_complaint(Category::Water, None);
        short_title.complaint_title = "Tap".to_string();
        assert!(matches!(
            create(&db, &sender, Mess::Dh1, short_title),
            Err(Error::Validation(_))
        ));

        let mut short_message = new_complaint(Category::Water, None);
        short_message.complaint_message = "leaks".to_string();
        assert!(matches!(
            create(&db, &sender, Mess::Dh1, short_message),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn create_enforces_other_detail() {
        let db = testutil::db();
        let sender = testutil::student(&db);

        assert!(matches!(
            create(&db, &sender, Mess::Dh1, new_complaint(Category::Other, Some(""))),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            create(&db, &sender, Mess::Dh1, new_complaint(Category::Other, None)),
            Err(Error::Validation(_))
        ));

        let created = create(
            &db,
            &sender,
            Mess::Dh1,
            new_complaint(Category::Other, Some("broken tap")),
        )
        .unwrap();
        assert_eq!(created.other.as_deref(), Some("broken tap"));
        assert!(!created.sent_authority);
        assert_eq!(created.status, None);
    }

    #[test]
    fn create_requires_student_role() {
        let db = testutil::db();
        assert!(matches!(
            create(&db, &testutil::mr(Mess::Dh1), Mess::Dh1, new_complaint(Category::Food, None)),
            Err(Error::Authorization(_))
        ));
        assert!(matches!(
            create(&db, &testutil::higher(), Mess::Dh1, new_complaint(Category::Food, None)),
            Err(Error::Authorization(_))
        ));
    }

    #[test]
    fn create_round_trips_fields_and_defaults() {
        let db = testutil::db();
        let sender = testutil::student(&db);

        let created =
            create(&db, &sender, Mess::Dh2, new_complaint(Category::Cleaning, None)).unwrap();
        assert_eq!(created.sender_id, sender.id);
        assert_eq!(created.mess_number, Mess::Dh2);
        assert_eq!(created.related, Category::Cleaning);
        assert_eq!(created.complaint_title, "Leaking tap");
        assert!(!created.sent_authority);

        let listed = list_for_mess(&db, &testutil::mr(Mess::Dh2), Mess::Dh2).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[test]
    fn update_is_owner_gated_and_merges_patch() {
        let db = testutil::db();
        let files = testutil::RecordingStore::default();
        let sender = testutil::student(&db);
        let created = create(&db, &sender, Mess::Dh1, new_complaint(Category::Water, None)).unwrap();

        let stranger = testutil::student(&db);
        assert!(matches!(
            update(&db, &files, &stranger, created.id, ComplaintPatch::default()),
            Err(Error::Authorization(_))
        ));

        let patch = ComplaintPatch {
            complaint_message: Some("The tap has now flooded the hall".to_string()),
            ..Default::default()
        };
        let updated = update(&db, &files, &sender, created.id, patch).unwrap();
        assert_eq!(updated.complaint_message, "The tap has now flooded the hall");
        assert_eq!(updated.complaint_title, created.complaint_title);
        assert_eq!(updated.related, Category::Water);
    }

    #[test]
    fn update_revalidates_other_on_merged_view() {
        let db = testutil::db();
        let files = testutil::RecordingStore::default();
        let sender = testutil::student(&db);
        let created = create(&db, &sender, Mess::Dh1, new_complaint(Category::Water, None)).unwrap();

        // Switching the category without supplying detail must fail.
        let patch = ComplaintPatch { related: Some(Category::Other), ..Default::default() };
        assert!(matches!(
            update(&db, &files, &sender, created.id, patch),
            Err(Error::Validation(_))
        ));

        // Supplying it alongside the switch succeeds.
        let patch = ComplaintPatch {
            related: Some(Category::Other),
            other: Some("cutlery shortage".to_string()),
            ..Default::default()
        };
        let updated = update(&db, &files, &sender, created.id, patch).unwrap();
        assert_eq!(updated.other.as_deref(), Some("cutlery shortage"));
    }

    #[test]
    fn update_replacing_image_deletes_old_file() {
        let db = testutil::db();
        let files = testutil::RecordingStore::default();
        let sender = testutil::student(&db);

        let mut req = new_complaint(Category::Food, None);
        req.image = Some("old-image".to_string());
        let created = create(&db, &sender, Mess::Dh1, req).unwrap();

        let patch = ComplaintPatch { image: Some("new-image".to_string()), ..Default::default() };
        let updated = update(&db, &files, &sender, created.id, patch).unwrap();
        assert_eq!(updated.image.as_deref(), Some("new-image"));
        assert_eq!(files.deleted(), vec!["old-image".to_string()]);
    }

    #[test]
    fn delete_is_owner_gated() {
        let db = testutil::db();
        let sender = testutil::student(&db);
        let created = create(&db, &sender, Mess::Dh1, new_complaint(Category::Food, None)).unwrap();

        let stranger = testutil::student(&db);
        assert!(matches!(
            delete(&db, &stranger, created.id),
            Err(Error::Authorization(_))
        ));

        delete(&db, &sender, created.id).unwrap();
        assert!(matches!(
            delete(&db, &sender, created.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn higher_list_is_escalated_subset_of_mr_list() {
        let db = testutil::db();
        let sender = testutil::student(&db);
        let first = create(&db, &sender, Mess::Dh1, new_complaint(Category::Food, None)).unwrap();
        let _second = create(&db, &sender, Mess::Dh1, new_complaint(Category::Water, None)).unwrap();

        let mr = testutil::mr(Mess::Dh1);
        update_status(
            &db,
            &mr,
            first.id,
            StatusPatch { status: None, sent_authority: Some(true) },
        )
        .unwrap();

        let mr_view = list_for_mess(&db, &mr, Mess::Dh1).unwrap();
        let higher_view = list_for_mess(&db, &testutil::higher(), Mess::Dh1).unwrap();
        assert_eq!(mr_view.len(), 2);
        assert_eq!(higher_view.len(), 1);
        assert_eq!(higher_view[0].id, first.id);
        assert!(higher_view[0].sent_authority);

        assert!(matches!(
            list_for_mess(&db, &sender, Mess::Dh1),
            Err(Error::Authorization(_))
        ));
    }

    #[test]
    fn escalation_pipeline_enforces_two_stages() {
        let db = testutil::db();
        let sender = testutil::student(&db);
        let created = create(&db, &sender, Mess::Dh1, new_complaint(Category::Food, None)).unwrap();

        // MR scoped to another mess is rejected.
        assert!(matches!(
            update_status(
                &db,
                &testutil::mr(Mess::Dh2),
                created.id,
                StatusPatch { status: Some("noted".to_string()), sent_authority: None },
            ),
            Err(Error::Authorization(_))
        ));

        // Higher tier cannot act before escalation.
        assert!(matches!(
            update_status(
                &db,
                &testutil::higher(),
                created.id,
                StatusPatch { status: Some("resolved".to_string()), sent_authority: None },
            ),
            Err(Error::Authorization(_))
        ));

        // The assigned MR escalates.
        let escalated = update_status(
            &db,
            &testutil::mr(Mess::Dh1),
            created.id,
            StatusPatch { status: Some("forwarded".to_string()), sent_authority: Some(true) },
        )
        .unwrap();
        assert!(escalated.sent_authority);
        assert_eq!(escalated.status.as_deref(), Some("forwarded"));

        // Now the higher tier may set status; its sent_authority input is
        // ignored, not applied.
        let resolved = update_status(
            &db,
            &testutil::higher(),
            created.id,
            StatusPatch { status: Some("resolved".to_string()), sent_authority: Some(false) },
        )
        .unwrap();
        assert!(resolved.sent_authority);
        assert_eq!(resolved.status.as_deref(), Some("resolved"));

        // Students have no path into the pipeline.
        assert!(matches!(
            update_status(&db, &sender, created.id, StatusPatch::default()),
            Err(Error::Authorization(_))
        ));
    }

    #[test]
    fn window_listing_reports_empty_as_not_found() {
        let db = testutil::db();
        let sender = testutil::student(&db);
        let created = create(&db, &sender, Mess::Dh1, new_complaint(Category::Food, None)).unwrap();

        let mr = testutil::mr(Mess::Dh1);
        let daily = list_by_window(&db, &mr, Mess::Dh1, Window::Daily).unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].id, created.id);

        let weekly = list_by_window(&db, &mr, Mess::Dh1, Window::Weekly).unwrap();
        assert_eq!(weekly.len(), 1);

        assert!(matches!(
            list_by_window(&db, &mr, Mess::Dh3, Window::Daily),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            list_by_window(&db, &sender, Mess::Dh1, Window::Daily),
            Err(Error::Authorization(_))
        ));
    }

    #[test]
    fn window_listing_hides_unescalated_complaints_from_higher() {
        let db = testutil::db();
        let sender = testutil::student(&db);
        let first = create(&db, &sender, Mess::Dh1, new_complaint(Category::Food, None)).unwrap();
        let _second = create(&db, &sender, Mess::Dh1, new_complaint(Category::Water, None)).unwrap();

        // Nothing escalated yet, so the higher tier's window is empty.
        assert!(matches!(
            list_by_window(&db, &testutil::higher(), Mess::Dh1, Window::Daily),
            Err(Error::NotFound(_))
        ));

        let mr = testutil::mr(Mess::Dh1);
        update_status(
            &db,
            &mr,
            first.id,
            StatusPatch { status: None, sent_authority: Some(true) },
        )
        .unwrap();

        let mr_view = list_by_window(&db, &mr, Mess::Dh1, Window::Daily).unwrap();
        let higher_view = list_by_window(&db, &testutil::higher(), Mess::Dh1, Window::Daily).unwrap();
        assert_eq!(mr_view.len(), 2);
        assert_eq!(higher_view.len(), 1);
        assert_eq!(higher_view[0].id, first.id);
        assert!(higher_view[0].sent_authority);
    }
}
