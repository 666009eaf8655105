use crate::Database;
use crate::models::{AuthorityRow, ComplaintRow, IssueRow, StudentRow, VoteField};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

impl Database {
    // -- Students --

    pub fn create_student(
        &self,
        id: &str,
        name: &str,
        roll_no: &str,
        mobile: &str,
        password_hash: &str,
        mess: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO students (id, name, roll_no, mobile, password, mess)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, name, roll_no, mobile, password_hash, mess),
            )?;
            Ok(())
        })
    }

    pub fn get_student_by_roll(&self, roll_no: &str) -> Result<Option<StudentRow>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(
                    "SELECT id, name, roll_no, mobile, password, mess, created_at
                     FROM students WHERE roll_no = ?1",
                )?
                .query_row([roll_no], student_from_row)
                .optional()?;
            Ok(row)
        })
    }

    // -- Authorities --

    pub fn create_authority(
        &self,
        id: &str,
        name: &str,
        role: &str,
        mess: Option<&str>,
        mobile: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO authorities (id, name, role, mess, mobile, email, password)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (id, name, role, mess, mobile, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_authority_by_email(&self, email: &str) -> Result<Option<AuthorityRow>> {
        self.with_conn(|conn| {
            let row = conn
                .prepare(
                    "SELECT id, name, role, mess, mobile, email, password, created_at
                     FROM authorities WHERE email = ?1",
                )?
                .query_row([email], authority_from_row)
                .optional()?;
            Ok(row)
        })
    }

    // -- Complaints --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_complaint(
        &self,
        id: &str,
        sender_id: &str,
        mess_number: &str,
        related: &str,
        other: Option<&str>,
        complaint_title: &str,
        complaint_message: &str,
        image: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO complaints
                     (id, sender_id, mess_number, related, other,
                      complaint_title, complaint_message, image)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id,
                    sender_id,
                    mess_number,
                    related,
                    other,
                    complaint_title,
                    complaint_message,
                    image
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_complaint(&self, id: &str) -> Result<Option<ComplaintRow>> {
        self.with_conn(|conn| query_complaint(conn, id))
    }

    pub fn update_complaint_fields(
        &self,
        id: &str,
        related: &str,
        other: Option<&str>,
        complaint_title: &str,
        complaint_message: &str,
        image: Option<&str>,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE complaints
                 SET related = ?2, other = ?3, complaint_title = ?4,
                     complaint_message = ?5, image = ?6,
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, related, other, complaint_title, complaint_message, image],
            )?;
            Ok(changed)
        })
    }

    pub fn delete_complaint(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM complaints WHERE id = ?1", [id])?;
            Ok(changed)
        })
    }

    pub fn list_complaints_for_mess(
        &self,
        mess_number: &str,
        escalated_only: bool,
    ) -> Result<Vec<ComplaintRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, mess_number, related, other,
                        complaint_title, complaint_message, image, status,
                        sent_authority, created_at, updated_at
                 FROM complaints
                 WHERE mess_number = ?1 AND (?2 = 0 OR sent_authority = 1)
                 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map(
                    rusqlite::params![mess_number, escalated_only as i64],
                    complaint_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Complaints for a mess created in `[start, end)`, newest first.
    /// Bounds are UTC strings in SQLite's `datetime('now')` format. The
    /// escalated-only filter applies the same visibility rule as
    /// `list_complaints_for_mess`.
    pub fn list_complaints_between(
        &self,
        mess_number: &str,
        start: &str,
        end: &str,
        escalated_only: bool,
    ) -> Result<Vec<ComplaintRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, mess_number, related, other,
                        complaint_title, complaint_message, image, status,
                        sent_authority, created_at, updated_at
                 FROM complaints
                 WHERE mess_number = ?1 AND created_at >= ?2 AND created_at < ?3
                   AND (?4 = 0 OR sent_authority = 1)
                 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map(
                    rusqlite::params![mess_number, start, end, escalated_only as i64],
                    complaint_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Guarded status/escalation update. The WHERE clause re-asserts the
    /// policy predicates (mess scope, already-escalated) so the update is a
    /// compare-and-set on the record state; returns the number of rows
    /// changed (0 = guard or existence failed).
    pub fn update_complaint_status(
        &self,
        id: &str,
        status: Option<&str>,
        sent_authority: Option<bool>,
        require_mess: Option<&str>,
        require_escalated: bool,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE complaints
                 SET status = COALESCE(?2, status),
                     sent_authority = COALESCE(?3, sent_authority),
                     updated_at = datetime('now')
                 WHERE id = ?1
                   AND (?4 IS NULL OR mess_number = ?4)
                   AND (?5 = 0 OR sent_authority = 1)",
                rusqlite::params![
                    id,
                    status,
                    sent_authority.map(|b| b as i64),
                    require_mess,
                    require_escalated as i64
                ],
            )?;
            Ok(changed)
        })
    }

    // -- Issues --

    pub fn insert_issue(
        &self,
        id: &str,
        sender_id: &str,
        issue_title: &str,
        issue_message: &str,
        image: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO issues (id, sender_id, issue_title, issue_message, image)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, sender_id, issue_title, issue_message, image],
            )?;
            Ok(())
        })
    }

    pub fn get_issue(&self, id: &str) -> Result<Option<IssueRow>> {
        self.with_conn(|conn| query_issue(conn, id))
    }

    pub fn update_issue_fields(
        &self,
        id: &str,
        issue_title: &str,
        issue_message: &str,
        image: Option<&str>,
    ) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE issues
                 SET issue_title = ?2, issue_message = ?3, image = ?4,
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, issue_title, issue_message, image],
            )?;
            Ok(changed)
        })
    }

    pub fn delete_issue(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM issues WHERE id = ?1", [id])?;
            Ok(changed)
        })
    }

    pub fn list_issues(&self) -> Result<Vec<IssueRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, issue_title, issue_message, image,
                        resolved, upvotes, downvotes, created_at, updated_at
                 FROM issues
                 ORDER BY upvotes DESC",
            )?;
            let rows = stmt
                .query_map([], issue_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Increments one vote counter by exactly 1 and returns the new count,
    /// or `None` if the issue does not exist. The increment and the readback
    /// run under one connection lock, so concurrent votes cannot be lost.
    pub fn increment_issue_vote(&self, id: &str, field: VoteField) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let column = field.column();
            let changed = conn.execute(
                &format!(
                    "UPDATE issues SET {column} = {column} + 1,
                         updated_at = datetime('now')
                     WHERE id = ?1"
                ),
                [id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let count: i64 = conn.query_row(
                &format!("SELECT {column} FROM issues WHERE id = ?1"),
                [id],
                |row| row.get(0),
            )?;
            Ok(Some(count))
        })
    }

    pub fn set_issue_resolved(&self, id: &str, resolved: bool) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE issues SET resolved = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, resolved as i64],
            )?;
            Ok(changed)
        })
    }
}

fn query_complaint(conn: &Connection, id: &str) -> Result<Option<ComplaintRow>> {
    let row = conn
        .prepare(
            "SELECT id, sender_id, mess_number, related, other,
                    complaint_title, complaint_message, image, status,
                    sent_authority, created_at, updated_at
             FROM complaints WHERE id = ?1",
        )?
        .query_row([id], complaint_from_row)
        .optional()?;
    Ok(row)
}

fn query_issue(conn: &Connection, id: &str) -> Result<Option<IssueRow>> {
    let row = conn
        .prepare(
            "SELECT id, sender_id, issue_title, issue_message, image,
                    resolved, upvotes, downvotes, created_at, updated_at
             FROM issues WHERE id = ?1",
        )?
        .query_row([id], issue_from_row)
        .optional()?;
    Ok(row)
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<StudentRow> {
    Ok(StudentRow {
        id: row.get(0)?,
        name: row.get(1)?,
        roll_no: row.get(2)?,
        mobile: row.get(3)?,
        password: row.get(4)?,
        mess: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn authority_from_row(row: &Row<'_>) -> rusqlite::Result<AuthorityRow> {
    Ok(AuthorityRow {
        id: row.get(0)?,
        name: row.get(1)?,
        role: row.get(2)?,
        mess: row.get(3)?,
        mobile: row.get(4)?,
        email: row.get(5)?,
        password: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn complaint_from_row(row: &Row<'_>) -> rusqlite::Result<ComplaintRow> {
    Ok(ComplaintRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        mess_number: row.get(2)?,
        related: row.get(3)?,
        other: row.get(4)?,
        complaint_title: row.get(5)?,
        complaint_message: row.get(6)?,
        image: row.get(7)?,
        status: row.get(8)?,
        sent_authority: row.get::<_, i64>(9)? != 0,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<IssueRow> {
    Ok(IssueRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        issue_title: row.get(2)?,
        issue_message: row.get(3)?,
        image: row.get(4)?,
        resolved: row.get::<_, i64>(5)? != 0,
        upvotes: row.get(6)?,
        downvotes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn db_with_student() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let sid = Uuid::new_v4().to_string();
        db.create_student(&sid, "Asha", "n190001", "9876543210", "hash", "dh1")
            .unwrap();
        (db, sid)
    }

    #[test]
    fn vote_increment_is_exact_and_reports_missing() {
        let (db, sid) = db_with_student();
        let iid = Uuid::new_v4().to_string();
        db.insert_issue(&iid, &sid, "Wifi down", "No network in block C", None)
            .unwrap();

        assert_eq!(db.increment_issue_vote(&iid, VoteField::Up).unwrap(), Some(1));
        assert_eq!(db.increment_issue_vote(&iid, VoteField::Up).unwrap(), Some(2));
        assert_eq!(db.increment_issue_vote(&iid, VoteField::Down).unwrap(), Some(1));

        let missing = Uuid::new_v4().to_string();
        assert_eq!(db.increment_issue_vote(&missing, VoteField::Up).unwrap(), None);
    }

    #[test]
    fn guarded_status_update_respects_predicates() {
        let (db, sid) = db_with_student();
        let cid = Uuid::new_v4().to_string();
        db.insert_complaint(&cid, &sid, "dh1", "food", None, "Stale rice", "Rice served at dinner was stale", None)
            .unwrap();

        // Wrong mess guard: no rows touched.
        let changed = db
            .update_complaint_status(&cid, Some("noted"), None, Some("dh2"), false)
            .unwrap();
        assert_eq!(changed, 0);

        // Not yet escalated: higher-tier guard fails.
        let changed = db
            .update_complaint_status(&cid, Some("noted"), None, None, true)
            .unwrap();
        assert_eq!(changed, 0);

        // Matching mess: escalate.
        let changed = db
            .update_complaint_status(&cid, None, Some(true), Some("dh1"), false)
            .unwrap();
        assert_eq!(changed, 1);

        let row = db.get_complaint(&cid).unwrap().unwrap();
        assert!(row.sent_authority);
        assert_eq!(row.status, None);

        // Escalated guard now passes; COALESCE keeps sent_authority.
        let changed = db
            .update_complaint_status(&cid, Some("resolved"), None, None, true)
            .unwrap();
        assert_eq!(changed, 1);

        let row = db.get_complaint(&cid).unwrap().unwrap();
        assert!(row.sent_authority);
        assert_eq!(row.status.as_deref(), Some("resolved"));
    }

    #[test]
    fn duplicate_roll_number_is_a_constraint_violation() {
        let (db, _sid) = db_with_student();

        let err = db
            .create_student(&Uuid::new_v4().to_string(), "Bela", "n190001", "9876543210", "hash", "dh2")
            .unwrap_err();
        assert!(crate::is_constraint_violation(&err));

        assert!(!crate::is_constraint_violation(&anyhow::anyhow!("disk I/O error")));
    }
}
