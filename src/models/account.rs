use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Account — A registered user
// ---------------------------------------------------------------------------

/// A registered user.
///
/// `password` holds the credential exactly as the user typed it. This is a
/// known security defect: credentials must be stored as a salted one-way
/// hash before production use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}
