use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: u64,
    pub body: String,
    pub author_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// Registry entry for an issued refresh token, keyed by the full signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub token: String,
    /// `None` until the token is explicitly revoked.
    #[serde(default, deserialize_with = "deserialize_revoked_at")]
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Seconds since the epoch of `0001-01-01T00:00:00Z`. Older state files
/// write this instant instead of `null` for tokens that are still live.
const UNSET_REVOKED_AT: i64 = -62_135_596_800;

fn deserialize_revoked_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let revoked_at = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(revoked_at.filter(|at| at.timestamp() != UNSET_REVOKED_AT))
}

impl RefreshTokenRecord {
    pub fn new(token: String) -> Self {
        Self {
            token,
            revoked_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// Everything the state file holds. Always persisted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub chirps: BTreeMap<u64, Chirp>,
    #[serde(default, rename = "user")]
    pub users: BTreeMap<u64, User>,
    #[serde(default, rename = "refresh_tokens")]
    pub revocations: HashMap<String, RefreshTokenRecord>,
    #[serde(default)]
    pub last_chirp_id: u64,
    #[serde(default)]
    pub last_user_id: u64,
}

impl Snapshot {
    /// Hands out the next chirp id. Ids of deleted chirps are never reused.
    pub fn next_chirp_id(&mut self) -> u64 {
        let highest = self.chirps.keys().next_back().copied().unwrap_or(0);
        self.last_chirp_id = self.last_chirp_id.max(highest) + 1;
        self.last_chirp_id
    }

    pub fn next_user_id(&mut self) -> u64 {
        let highest = self.users.keys().next_back().copied().unwrap_or(0);
        self.last_user_id = self.last_user_id.max(highest) + 1;
        self.last_user_id
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|user| user.email == email)
    }
}
