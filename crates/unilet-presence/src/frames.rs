//! Inbound and outbound wire frame definitions.
//!
//! The protocol is a small closed set of JSON text frames discriminated
//! by a `type` field. Field names are camelCase on the wire. Both the
//! server-initiated liveness probe and the client heartbeat reply use the
//! `ping` type; existing clients depend on that naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use unilet_entity::status::PresenceState;

/// Frames sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Bind this connection to a claimed user identity.
    #[serde(rename_all = "camelCase")]
    Auth {
        /// Claimed platform user id.
        user_id: i64,
        /// Client user agent, if reported.
        user_agent: Option<String>,
        /// Client remote address, if reported.
        ip_address: Option<String>,
    },
    /// Change the user's availability state.
    #[serde(rename_all = "camelCase")]
    StatusUpdate {
        /// User the update applies to (taken from the payload as given).
        user_id: i64,
        /// New availability state.
        status: PresenceState,
        /// What the user is doing.
        activity: Option<String>,
        /// Where the user is.
        location: Option<String>,
    },
    /// Append an event to the activity audit log.
    #[serde(rename_all = "camelCase")]
    Activity {
        /// User the event belongs to.
        user_id: i64,
        /// Event category, e.g. `page_view`.
        activity_type: String,
        /// Free-form event payload.
        activity_data: Option<String>,
    },
    /// Heartbeat reply.
    Ping,
}

/// Frames sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Handshake acknowledgement carrying the accepted identity.
    #[serde(rename_all = "camelCase")]
    AuthSuccess {
        /// Accepted platform user id.
        user_id: i64,
    },
    /// Status change fan-out event.
    #[serde(rename_all = "camelCase")]
    StatusUpdate {
        /// User whose status changed.
        user_id: i64,
        /// New availability state.
        status: PresenceState,
        /// Current activity, if any.
        activity: Option<String>,
        /// Current location, if any.
        location: Option<String>,
        /// When the change was observed.
        timestamp: DateTime<Utc>,
    },
    /// Server-initiated liveness probe.
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_auth_frame() {
        let frame: InboundFrame = serde_json::from_str(
            r#"{"type":"auth","userId":42,"userAgent":"test","ipAddress":"1.2.3.4"}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            InboundFrame::Auth {
                user_id: 42,
                user_agent: Some("test".to_string()),
                ip_address: Some("1.2.3.4".to_string()),
            }
        );
    }

    #[test]
    fn test_auth_transport_metadata_is_optional() {
        let frame: InboundFrame = serde_json::from_str(r#"{"type":"auth","userId":7}"#).unwrap();
        assert_eq!(
            frame,
            InboundFrame::Auth {
                user_id: 7,
                user_agent: None,
                ip_address: None,
            }
        );
    }

    #[test]
    fn test_parses_status_update_frame() {
        let frame: InboundFrame = serde_json::from_str(
            r#"{"type":"status_update","userId":42,"status":"away","activity":"browsing"}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            InboundFrame::StatusUpdate {
                user_id: 42,
                status: PresenceState::Away,
                activity: Some("browsing".to_string()),
                location: None,
            }
        );
    }

    #[test]
    fn test_parses_activity_frame() {
        let frame: InboundFrame = serde_json::from_str(
            r#"{"type":"activity","userId":42,"activityType":"page_view","activityData":"property:17"}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            InboundFrame::Activity {
                user_id: 42,
                activity_type: "page_view".to_string(),
                activity_data: Some("property:17".to_string()),
            }
        );
    }

    #[test]
    fn test_parses_ping_frame() {
        let frame: InboundFrame = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(frame, InboundFrame::Ping);
    }

    #[test]
    fn test_rejects_unknown_frame_type() {
        assert!(serde_json::from_str::<InboundFrame>(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn test_auth_success_wire_format() {
        let text = serde_json::to_string(&OutboundFrame::AuthSuccess { user_id: 42 }).unwrap();
        assert_eq!(text, r#"{"type":"auth_success","userId":42}"#);
    }

    #[test]
    fn test_status_update_serializes_null_fields() {
        let text = serde_json::to_string(&OutboundFrame::StatusUpdate {
            user_id: 42,
            status: PresenceState::Online,
            activity: None,
            location: None,
            timestamp: Utc::now(),
        })
        .unwrap();
        // Absent activity/location are explicit nulls on the wire.
        assert!(text.contains(r#""activity":null"#));
        assert!(text.contains(r#""location":null"#));
        assert!(text.contains(r#""status":"online""#));
    }

    #[test]
    fn test_server_ping_wire_format() {
        let text = serde_json::to_string(&OutboundFrame::Ping).unwrap();
        assert_eq!(text, r#"{"type":"ping"}"#);
    }
}
