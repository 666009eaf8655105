//! Access policy evaluator. Pure functions of (role, scope, record state,
//! operation class) — no database access, no hidden state — so every rule
//! the engines rely on is testable in isolation.

use uuid::Uuid;

use messdesk_types::models::{Mess, Principal, Role};

use crate::error::{Error, Result};

/// Operation classes with a single allow/deny answer.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    /// Creating a complaint or issue. Students only.
    Create,
    /// Editing a record owned by `owner`.
    EditOwn { owner: Uuid },
    /// Deleting a record owned by `owner`.
    DeleteOwn { owner: Uuid },
    /// Marking an issue resolved. Either staff tier.
    AdminResolve,
    /// Deleting an issue regardless of ownership. Either staff tier.
    AdminDelete,
}

pub fn authorize(principal: &Principal, action: Action) -> Result<()> {
    match action {
        Action::Create => match principal.role {
            Role::Student => Ok(()),
            Role::Mr { .. } | Role::Higher => {
                Err(Error::forbidden("only students may create this record"))
            }
        },
        Action::EditOwn { owner } | Action::DeleteOwn { owner } => {
            if principal.id == owner {
                Ok(())
            } else {
                Err(Error::forbidden("you are not the owner of this record"))
            }
        }
        Action::AdminResolve | Action::AdminDelete => match principal.role {
            Role::Mr { .. } | Role::Higher => Ok(()),
            Role::Student => Err(Error::forbidden("access denied")),
        },
    }
}

/// How much of a mess's complaint list the caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Everything filed against the mess.
    Full,
    /// Only complaints already escalated to the higher tier.
    EscalatedOnly,
}

/// MRs see the full list for a mess; the higher tier sees the escalated
/// subset; students are not part of the review pipeline.
pub fn authorize_list(principal: &Principal) -> Result<ListScope> {
    match principal.role {
        Role::Mr { .. } => Ok(ListScope::Full),
        Role::Higher => Ok(ListScope::EscalatedOnly),
        Role::Student => Err(Error::forbidden("access denied")),
    }
}

/// What a status update may touch once granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGrant {
    /// MR path: status and the escalation flag.
    StatusAndEscalation,
    /// Higher path: status only, and only on escalated complaints.
    StatusOnly,
}

/// The two-stage escalation gate. Complaints originate at the mess tier:
/// only the MR assigned to the complaint's mess may touch it (and promote
/// it), and the higher tier is confined to complaints an MR has already
/// sent up.
pub fn authorize_status_update(
    principal: &Principal,
    mess_number: Mess,
    sent_authority: bool,
) -> Result<StatusGrant> {
    match principal.role {
        Role::Mr { mess } if mess == mess_number => Ok(StatusGrant::StatusAndEscalation),
        Role::Mr { .. } => Err(Error::forbidden("not authorized to update this complaint")),
        Role::Higher if sent_authority => Ok(StatusGrant::StatusOnly),
        Role::Higher => Err(Error::forbidden("not authorized to update this complaint")),
        Role::Student => Err(Error::forbidden("access denied")),
    }
}
