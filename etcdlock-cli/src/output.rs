use etcdlock_core::codec::is_open_ended;
use etcdlock_core::types::RangeCount;
use serde::Serialize;

// ─── Response Types ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Serialize)]
pub struct AcquiredResponse {
    pub name: String,
    pub key: String,
    pub ttl_ms: u64,
}

#[derive(Serialize)]
pub struct ReleasedResponse {
    pub name: String,
    pub key: String,
    pub held_ms: u64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub name: String,
    pub locked: bool,
    pub count: i64,
    pub range_start: String,
    pub range_end: String,
}

#[derive(Serialize)]
pub struct RangeResponse {
    pub key: String,
    pub range_end: String,
    pub open_ended: bool,
    pub count: i64,
}

impl RangeResponse {
    pub fn from_snapshot(snapshot: &RangeCount) -> Self {
        Self {
            key: display_key(&snapshot.key),
            range_end: display_key(&snapshot.range_end),
            open_ended: is_open_ended(&snapshot.range_end),
            count: snapshot.count,
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to encode output: {}", e),
    }
}

/// Render key bytes for humans; non-UTF-8 bytes are escaped.
pub fn display_key(key: &[u8]) -> String {
    key.escape_ascii().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_omits_data() {
        let json = serde_json::to_value(CliResponse::<()>::err("boom")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "boom" }));
    }

    #[test]
    fn test_ok_envelope() {
        let json = serde_json::to_value(CliResponse::ok(StatusResponse {
            name: "orders".to_string(),
            locked: true,
            count: 1,
            range_start: "etcdlock/orders/".to_string(),
            range_end: "etcdlock/orders0".to_string(),
        }))
        .unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["locked"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_display_key_escapes_binary() {
        assert_eq!(display_key(b"etcdlock/a"), "etcdlock/a");
        assert_eq!(display_key(&[0x61, 0xFF]), "a\\xff");
    }

    #[test]
    fn test_range_response_from_snapshot() {
        let snapshot = RangeCount {
            key: b"etcdlock/orders/".to_vec(),
            range_end: b"etcdlock/orders0".to_vec(),
            count: 2,
        };
        let json = serde_json::to_value(RangeResponse::from_snapshot(&snapshot)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "etcdlock/orders/",
                "range_end": "etcdlock/orders0",
                "open_ended": false,
                "count": 2,
            })
        );

        let open = RangeCount {
            key: vec![0xFF],
            range_end: vec![0x00],
            count: 0,
        };
        let response = RangeResponse::from_snapshot(&open);
        assert!(response.open_ended);
        assert_eq!(response.key, "\\xff");
    }
}
