//! Permission normalization
//!
//! Turns the raw permission list Drive reports for a file into two display
//! strings: the owner, and the comma-joined writers.
//!
//! | grantee type | display string              |
//! |--------------|-----------------------------|
//! | `user`       | `'<displayName>' <<email>>` |
//! | `group`      | `'<displayName>' <<email>>` |
//! | `anyone`     | `[Anyone with link]`        |
//! | `domain`     | the domain, verbatim        |
//!
//! Any other grantee type is an error. Only permissions that end up in the
//! output are formatted, so an odd grantee on a reader entry is ignored.

use crate::drive::types::RemotePermission;
use crate::error::PermissionError;
use std::fmt;

/// Display string for link-sharing grantees
pub const ANYONE_WITH_LINK: &str = "[Anyone with link]";

/// Separator between writers in the combined string
pub const WRITER_SEPARATOR: &str = ",";

/// Role of a permission entry, as far as the report cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Writer,
    /// reader, commenter, organizer, ...
    Other,
}

impl Role {
    pub fn parse(role: &str) -> Self {
        match role {
            "owner" => Role::Owner,
            "writer" => Role::Writer,
            _ => Role::Other,
        }
    }
}

/// The entity a permission is granted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grantee<'a> {
    User { display_name: &'a str, email: &'a str },
    Group { display_name: &'a str, email: &'a str },
    Anyone,
    Domain { domain: &'a str },
}

impl<'a> TryFrom<&'a RemotePermission> for Grantee<'a> {
    type Error = PermissionError;

    fn try_from(perm: &'a RemotePermission) -> Result<Self, Self::Error> {
        let permission_id = || perm.id.clone().unwrap_or_else(|| "<unknown>".to_string());
        let display_name = perm.display_name.as_deref().unwrap_or("");

        match perm.kind.as_str() {
            "user" => Ok(Grantee::User {
                display_name,
                email: required(perm.email_address.as_deref(), "user", "emailAddress", permission_id)?,
            }),
            "group" => Ok(Grantee::Group {
                display_name,
                email: required(perm.email_address.as_deref(), "group", "emailAddress", permission_id)?,
            }),
            "anyone" => Ok(Grantee::Anyone),
            "domain" => Ok(Grantee::Domain {
                domain: required(perm.domain.as_deref(), "domain", "domain", permission_id)?,
            }),
            other => Err(PermissionError::UnknownGranteeType {
                kind: other.to_string(),
                permission_id: permission_id(),
            }),
        }
    }
}

fn required<'a>(
    value: Option<&'a str>,
    kind: &'static str,
    field: &'static str,
    permission_id: impl FnOnce() -> String,
) -> Result<&'a str, PermissionError> {
    value.ok_or_else(|| PermissionError::MissingField {
        kind,
        field,
        permission_id: permission_id(),
    })
}

impl fmt::Display for Grantee<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grantee::User { display_name, email } | Grantee::Group { display_name, email } => {
                write!(f, "'{}' <{}>", display_name, email)
            }
            Grantee::Anyone => f.write_str(ANYONE_WITH_LINK),
            Grantee::Domain { domain } => f.write_str(domain),
        }
    }
}

/// Format a single permission's grantee
pub fn display_string(perm: &RemotePermission) -> Result<String, PermissionError> {
    Grantee::try_from(perm).map(|g| g.to_string())
}

/// Derive the `(owner, writers)` display strings for one file
///
/// The owner is the first `owner` entry in list order; a file without one
/// gets an empty owner. Writers keep list order.
pub fn derive_owner_and_writers(
    permissions: Option<&[RemotePermission]>,
) -> Result<(String, String), PermissionError> {
    let permissions = match permissions {
        Some(p) if !p.is_empty() => p,
        _ => return Ok((String::new(), String::new())),
    };

    let owner = permissions
        .iter()
        .find(|p| Role::parse(&p.role) == Role::Owner)
        .map(display_string)
        .transpose()?
        .unwrap_or_default();

    let writers = permissions
        .iter()
        .filter(|p| Role::parse(&p.role) == Role::Writer)
        .map(display_string)
        .collect::<Result<Vec<_>, _>>()?
        .join(WRITER_SEPARATOR);

    Ok((owner, writers))
}
