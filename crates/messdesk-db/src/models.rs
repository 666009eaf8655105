/// Database row types — these map directly to SQLite rows.
/// Distinct from the messdesk-types domain models to keep the DB layer
/// independent of enum parsing and timestamp handling.

pub struct StudentRow {
    pub id: String,
    pub name: String,
    pub roll_no: String,
    pub mobile: String,
    pub password: String,
    pub mess: String,
    pub created_at: String,
}

pub struct AuthorityRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub mess: Option<String>,
    pub mobile: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct ComplaintRow {
    pub id: String,
    pub sender_id: String,
    pub mess_number: String,
    pub related: String,
    pub other: Option<String>,
    pub complaint_title: String,
    pub complaint_message: String,
    pub image: Option<String>,
    pub status: Option<String>,
    pub sent_authority: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct IssueRow {
    pub id: String,
    pub sender_id: String,
    pub issue_title: String,
    pub issue_message: String,
    pub image: Option<String>,
    pub resolved: bool,
    pub upvotes: i64,
    pub downvotes: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Which counter a vote touches.
#[derive(Debug, Clone, Copy)]
pub enum VoteField {
    Up,
    Down,
}

impl VoteField {
    pub fn column(&self) -> &'static str {
        match self {
            VoteField::Up => "upvotes",
            VoteField::Down => "downvotes",
        }
    }
}
