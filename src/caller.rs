use serde::{Deserialize, Deserializer, Serialize};

/// Display name used when the caller has no email.
pub const GUEST_NAME: &str = "Guest";
/// Subject used when the caller has no uid.
pub const GUEST_IDENTITY: &str = "guest";
/// Room used when the request names none.
pub const DEFAULT_ROOM: &str = "room";

/// Identity of the caller as verified by the hosting platform.
///
/// This never comes from the request body, see [`crate::callable`] for how the
/// platform hands it over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub email: Option<String>,
    pub uid: Option<String>,
}

impl CallerContext {
    /// Returns `None` when neither attribute is known.
    pub fn from_parts(email: Option<String>, uid: Option<String>) -> Option<Self> {
        if email.is_none() && uid.is_none() {
            return None;
        }
        Some(Self { email, uid })
    }
}

/// Payload of a token invocation.
///
/// Any field other than `roomName` is ignored, a `roomName` that is not a
/// string is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(
        rename = "roomName",
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub room_name: Option<String>,
}

impl TokenRequest {
    pub fn for_room(room_name: impl Into<String>) -> Self {
        Self {
            room_name: Some(room_name.into()),
        }
    }
}

/// The values that end up inside the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGrant {
    pub identity: String,
    pub name: String,
    pub room: String,
}

/// Resolves identity, display name and room for an invocation.
///
/// Each value is picked independently:
/// - name: caller email, else [`GUEST_NAME`]
/// - identity: caller uid, else [`GUEST_IDENTITY`]
/// - room: non-empty `roomName`, else [`DEFAULT_ROOM`]
///
/// An empty uid or room counts as absent, an empty email is kept as the name.
pub fn resolve_grant(caller: Option<&CallerContext>, request: &TokenRequest) -> ResolvedGrant {
    let email = caller.and_then(|caller| caller.email.as_deref());
    let uid = caller.and_then(|caller| non_empty(caller.uid.as_deref()));

    ResolvedGrant {
        identity: uid.unwrap_or(GUEST_IDENTITY).to_string(),
        name: email.unwrap_or(GUEST_NAME).to_string(),
        room: non_empty(request.room_name.as_deref())
            .unwrap_or(DEFAULT_ROOM)
            .to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(value) => Ok(Some(value)),
        _ => Ok(None),
    }
}
