//! Restoration archive codec for activity records.
//!
//! # Responsibility
//! - Encode an `ActivityRecord` into the keyed restoration payload.
//! - Decode payloads back, rejecting data that belongs to another activity.
//!
//! # Invariants
//! - `decode(encode(r)) == Some(r)` for every record.
//! - Optional user-info keys may be missing or mistyped; they decode as
//!   absent (`None` / `false`) instead of failing the whole payload.
//!
//! Payload shape:
//! `{"activityType": .., "activityTitle": .., "activityUserInfo":
//! {"title": .., "notes": .., "identifier": .., "editState": bool}}`

use super::ActivityRecord;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display title written into every payload. Not load-bearing on decode.
pub const DEFAULT_ACTIVITY_TITLE: &str = "Restore Item";

const USER_INFO_TITLE_KEY: &str = "title";
const USER_INFO_NOTES_KEY: &str = "notes";
const USER_INFO_IDENTIFIER_KEY: &str = "identifier";
const USER_INFO_EDIT_STATE_KEY: &str = "editState";

/// Codec failures. `decode` folds all of these into `None`.
#[derive(Debug)]
pub enum CodecError {
    /// Payload bytes are not a JSON object of the expected shape.
    Malformed(serde_json::Error),
    /// Payload has no `activityType` key.
    MissingActivityType,
    /// Payload was written for a different activity type.
    ActivityTypeMismatch { expected: String, found: String },
    /// Record could not be serialized.
    Encode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed activity archive: {err}"),
            Self::MissingActivityType => write!(f, "activity archive has no activityType"),
            Self::ActivityTypeMismatch { expected, found } => write!(
                f,
                "activity type mismatch: expected `{expected}`, found `{found}`"
            ),
            Self::Encode(err) => write!(f, "failed to encode activity archive: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) | Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityArchive {
    activity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_user_info: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivityUserInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<&'a str>,
    edit_state: bool,
}

/// Converts activity records to and from restoration archive bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityCodec {
    activity_type: String,
    activity_title: String,
}

impl ActivityCodec {
    /// Creates a codec bound to the app's configured activity type.
    pub fn new(activity_type: impl Into<String>) -> Self {
        Self {
            activity_type: activity_type.into(),
            activity_title: DEFAULT_ACTIVITY_TITLE.to_string(),
        }
    }

    /// Overrides the display title written into payloads.
    pub fn with_title(mut self, activity_title: impl Into<String>) -> Self {
        self.activity_title = activity_title.into();
        self
    }

    pub fn activity_type(&self) -> &str {
        &self.activity_type
    }

    /// Encodes `record` into archive bytes.
    pub fn encode(&self, record: &ActivityRecord) -> Result<Vec<u8>, CodecError> {
        let user_info = ActivityUserInfo {
            title: record.pending_title.as_deref(),
            notes: record.pending_notes.as_deref(),
            identifier: record.target_identifier.as_deref(),
            edit_state: record.was_editing,
        };
        let archive = ActivityArchive {
            activity_type: Some(self.activity_type.clone()),
            activity_title: Some(self.activity_title.clone()),
            activity_user_info: Some(serde_json::to_value(&user_info).map_err(CodecError::Encode)?),
        };
        serde_json::to_vec(&archive).map_err(CodecError::Encode)
    }

    /// Decodes archive bytes, returning `None` for anything that is not a
    /// payload of this codec's activity type.
    pub fn decode(&self, bytes: &[u8]) -> Option<ActivityRecord> {
        match self.try_decode(bytes) {
            Ok(record) => Some(record),
            Err(CodecError::ActivityTypeMismatch { found, .. }) => {
                debug!(
                    "event=activity_decode module=activity status=skipped reason=type_mismatch found={}",
                    found
                );
                None
            }
            Err(err) => {
                warn!(
                    "event=activity_decode module=activity status=error error={}",
                    err
                );
                None
            }
        }
    }

    /// Decodes archive bytes with a typed failure reason.
    pub fn try_decode(&self, bytes: &[u8]) -> Result<ActivityRecord, CodecError> {
        let archive: ActivityArchive =
            serde_json::from_slice(bytes).map_err(CodecError::Malformed)?;
        let found = archive
            .activity_type
            .ok_or(CodecError::MissingActivityType)?;
        if found != self.activity_type {
            return Err(CodecError::ActivityTypeMismatch {
                expected: self.activity_type.clone(),
                found,
            });
        }

        let user_info = archive.activity_user_info.unwrap_or(Value::Null);
        let text = |key: &str| {
            user_info
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Ok(ActivityRecord {
            target_identifier: text(USER_INFO_IDENTIFIER_KEY),
            pending_title: text(USER_INFO_TITLE_KEY),
            pending_notes: text(USER_INFO_NOTES_KEY),
            was_editing: user_info
                .get(USER_INFO_EDIT_STATE_KEY)
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivityCodec, CodecError, DEFAULT_ACTIVITY_TITLE};
    use crate::activity::ActivityRecord;
    use serde_json::json;

    const TYPE: &str = "com.example.staterestore.restore";

    #[test]
    fn encode_writes_expected_keys() {
        let codec = ActivityCodec::new(TYPE);
        let record = ActivityRecord {
            target_identifier: Some("id-1".to_string()),
            pending_title: Some("Title".to_string()),
            pending_notes: Some("Notes".to_string()),
            was_editing: true,
        };
        let bytes = codec.encode(&record).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["activityType"], TYPE);
        assert_eq!(value["activityTitle"], DEFAULT_ACTIVITY_TITLE);
        assert_eq!(value["activityUserInfo"]["identifier"], "id-1");
        assert_eq!(value["activityUserInfo"]["title"], "Title");
        assert_eq!(value["activityUserInfo"]["notes"], "Notes");
        assert_eq!(value["activityUserInfo"]["editState"], true);
    }

    #[test]
    fn mismatched_type_is_rejected() {
        let bytes = serde_json::to_vec(&json!({
            "activityType": "someone.else",
            "activityUserInfo": { "identifier": "id-1" }
        }))
        .unwrap();
        let codec = ActivityCodec::new(TYPE);

        assert!(codec.decode(&bytes).is_none());
        assert!(matches!(
            codec.try_decode(&bytes),
            Err(CodecError::ActivityTypeMismatch { .. })
        ));
    }

    #[test]
    fn missing_type_is_rejected() {
        let bytes = serde_json::to_vec(&json!({ "activityTitle": "Restore Item" })).unwrap();
        assert!(matches!(
            ActivityCodec::new(TYPE).try_decode(&bytes),
            Err(CodecError::MissingActivityType)
        ));
    }

    #[test]
    fn mistyped_optional_keys_decode_as_absent() {
        let bytes = serde_json::to_vec(&json!({
            "activityType": TYPE,
            "activityUserInfo": { "identifier": "id-1", "title": 7, "editState": "yes" }
        }))
        .unwrap();
        let record = ActivityCodec::new(TYPE).decode(&bytes).unwrap();

        assert_eq!(record.target_identifier.as_deref(), Some("id-1"));
        assert_eq!(record.pending_title, None);
        assert!(!record.was_editing);
    }

    #[test]
    fn garbage_bytes_decode_to_none() {
        assert!(ActivityCodec::new(TYPE).decode(b"\x00not json").is_none());
    }
}
