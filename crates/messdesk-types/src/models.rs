use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A string did not match any variant of a closed domain enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.what, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Dining hall identifier. The set is fixed; complaints are always scoped
/// to exactly one mess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mess {
    Dh1,
    Dh2,
    Dh3,
    Dh4,
    Dh5,
    Dh6,
}

impl Mess {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mess::Dh1 => "dh1",
            Mess::Dh2 => "dh2",
            Mess::Dh3 => "dh3",
            Mess::Dh4 => "dh4",
            Mess::Dh5 => "dh5",
            Mess::Dh6 => "dh6",
        }
    }
}

impl fmt::Display for Mess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mess {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dh1" => Ok(Mess::Dh1),
            "dh2" => Ok(Mess::Dh2),
            "dh3" => Ok(Mess::Dh3),
            "dh4" => Ok(Mess::Dh4),
            "dh5" => Ok(Mess::Dh5),
            "dh6" => Ok(Mess::Dh6),
            other => Err(UnknownVariant { what: "mess", value: other.to_string() }),
        }
    }
}

/// Complaint category. `Other` requires the free-text `other` field to be
/// filled on the complaint itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Water,
    Food,
    Cleaning,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Water => "water",
            Category::Food => "food",
            Category::Cleaning => "cleaning",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "water" => Ok(Category::Water),
            "food" => Ok(Category::Food),
            "cleaning" => Ok(Category::Cleaning),
            "other" => Ok(Category::Other),
            other => Err(UnknownVariant { what: "category", value: other.to_string() }),
        }
    }
}

/// Reporting window for the authority complaint views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Daily,
    Weekly,
}

/// Caller role. Closed set — every policy decision matches exhaustively on
/// this, so an unknown role cannot fall through an authorization check.
/// An MR is always scoped to the one mess they represent; the higher tier
/// carries no mess scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    Student,
    Mr { mess: Mess },
    Higher,
}

/// The authenticated caller, resolved by the auth middleware and passed
/// explicitly into every core operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct Complaint {
    pub id: Uuid,
    #[serde(rename = "senderId")]
    pub sender_id: Uuid,
    pub mess_number: Mess,
    pub related: Category,
    pub other: Option<String>,
    pub complaint_title: String,
    pub complaint_message: String,
    pub image: Option<String>,
    pub status: Option<String>,
    pub sent_authority: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub id: Uuid,
    #[serde(rename = "senderId")]
    pub sender_id: Uuid,
    pub issue_title: String,
    pub issue_message: String,
    pub image: Option<String>,
    pub resolved: bool,
    pub upvotes: i64,
    pub downvotes: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}
