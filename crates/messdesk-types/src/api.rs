use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Category, Mess, Role};

// -- JWT Claims --

/// JWT claims attached to every authenticated request. The role (and the
/// MR's mess scope) travels inside the token, so the middleware can build a
/// `Principal` without a database round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentSignupRequest {
    pub name: String,
    pub roll_no: String,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
    pub mess: Mess,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentLoginRequest {
    pub roll_no: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MrSignupRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub mess: Mess,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HigherSignupRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorityLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub token: String,
}

// -- Complaints --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateComplaintRequest {
    pub related: Category,
    pub other: Option<String>,
    pub complaint_title: String,
    pub complaint_message: String,
    pub image: Option<String>,
}

/// Per-field patch: `None` leaves the stored value untouched, `Some` sets
/// it. An intentional empty string is therefore visible to validation
/// instead of being silently dropped.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplaintPatch {
    pub related: Option<Category>,
    pub other: Option<String>,
    pub complaint_title: Option<String>,
    pub complaint_message: Option<String>,
    pub image: Option<String>,
}

/// Escalation-tier update. Which fields the caller may actually touch is
/// decided by the policy evaluator, not by this shape.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusPatch {
    pub status: Option<String>,
    pub sent_authority: Option<bool>,
}

// -- Issues --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateIssueRequest {
    pub issue_title: String,
    pub issue_message: String,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IssuePatch {
    pub issue_title: Option<String>,
    pub issue_message: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetResolvedRequest {
    pub resolved: bool,
}

// -- Uploads --

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub path: String,
    pub size: u64,
}
