//! Peer wire format
//!
//! Request: query string `?userId=<id>[&gameOver=true | &number=<n>]`.
//! Response: one comma-separated line `status[,value,x]`.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_VALUE;

/// Errors talking to the match server
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("peer request failed: {0}")]
    Transport(String),
    #[error("peer server returned HTTP {0}")]
    Status(u16),
    #[error("malformed peer response {body:?}: {reason}")]
    Malformed { body: String, reason: &'static str },
}

/// Match status as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteStatus {
    Pending,
    InPlay,
    OpponentDisconnected,
    LocalWon,
    LocalLost,
}

impl RemoteStatus {
    pub fn code(self) -> u8 {
        match self {
            RemoteStatus::Pending => 1,
            RemoteStatus::InPlay => 2,
            RemoteStatus::OpponentDisconnected => 3,
            RemoteStatus::LocalWon => 4,
            RemoteStatus::LocalLost => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RemoteStatus::Pending),
            2 => Some(RemoteStatus::InPlay),
            3 => Some(RemoteStatus::OpponentDisconnected),
            4 => Some(RemoteStatus::LocalWon),
            5 => Some(RemoteStatus::LocalLost),
            _ => None,
        }
    }

    /// Statuses that end a match
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RemoteStatus::OpponentDisconnected | RemoteStatus::LocalWon | RemoteStatus::LocalLost
        )
    }
}

/// What one poll carries besides the user id (at most one of these)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Nothing,
    GameOver,
    Number(u32),
}

/// One outgoing poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRequest {
    pub user_id: String,
    pub payload: Payload,
}

impl PeerRequest {
    pub fn to_query(&self) -> String {
        let mut query = format!("?userId={}", self.user_id);
        match self.payload {
            Payload::Nothing => {}
            Payload::GameOver => query.push_str("&gameOver=true"),
            Payload::Number(n) => query.push_str(&format!("&number={n}")),
        }
        query
    }
}

/// Parsed response line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerResponse {
    /// `None` when the status field was blank
    pub status: Option<RemoteStatus>,
    /// Value of a ball the opponent sent
    pub ball_value: Option<u32>,
}

/// Parse a response body. Nothing is applied unless the whole line is valid.
pub fn parse_response(body: &str) -> Result<PeerResponse, PeerError> {
    let malformed = |reason| PeerError::Malformed {
        body: body.to_string(),
        reason,
    };

    let fields: Vec<&str> = body.trim().split(',').map(str::trim).collect();

    let status = match fields[0] {
        "" => None,
        code => {
            let code = code.parse::<u8>().map_err(|_| malformed("status is not a number"))?;
            Some(RemoteStatus::from_code(code).ok_or_else(|| malformed("unknown status code"))?)
        }
    };

    let ball_value = match fields.len() {
        1 => None,
        3 => {
            let value = fields[1]
                .parse::<u32>()
                .map_err(|_| malformed("ball value is not a number"))?;
            // Earned points come from one divide: at least 2, never above the merge limit
            if !(2..=MAX_VALUE).contains(&value) {
                return Err(malformed("ball value out of range"));
            }
            // The sender's x is not used; the ball goes to a local slot
            Some(value)
        }
        _ => return Err(malformed("expected 1 or 3 fields")),
    };

    Ok(PeerResponse { status, ball_value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_encoding() {
        let mut request = PeerRequest {
            user_id: "123".into(),
            payload: Payload::Nothing,
        };
        assert_eq!(request.to_query(), "?userId=123");

        request.payload = Payload::GameOver;
        assert_eq!(request.to_query(), "?userId=123&gameOver=true");

        request.payload = Payload::Number(16);
        assert_eq!(request.to_query(), "?userId=123&number=16");
    }

    #[test]
    fn test_status_codes_round_trip() {
        for code in 1..=5 {
            let status = RemoteStatus::from_code(code).expect("known code");
            assert_eq!(status.code(), code);
        }
        assert_eq!(RemoteStatus::from_code(0), None);
        assert_eq!(RemoteStatus::from_code(6), None);
    }

    #[test]
    fn test_parse_status_only() {
        let response = parse_response("1\n").expect("valid");
        assert_eq!(response.status, Some(RemoteStatus::Pending));
        assert_eq!(response.ball_value, None);
    }

    #[test]
    fn test_parse_status_with_ball() {
        let response = parse_response(" 2, 15 ,0").expect("valid");
        assert_eq!(response.status, Some(RemoteStatus::InPlay));
        assert_eq!(response.ball_value, Some(15));
    }

    #[test]
    fn test_parse_accepts_largest_earnable_value() {
        let response = parse_response("2,99,0").expect("valid");
        assert_eq!(response.ball_value, Some(99));
    }

    #[test]
    fn test_parse_blank_status_keeps_ball() {
        let response = parse_response(",9,40").expect("valid");
        assert_eq!(response.status, None);
        assert_eq!(response.ball_value, Some(9));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_response("<html>").is_err());
        assert!(parse_response("7").is_err());
        assert!(parse_response("2,x,0").is_err());
        assert!(parse_response("2,1,0").is_err());
        assert!(parse_response("2,100,0").is_err());
        assert!(parse_response("2,4294967295,0").is_err());
        assert!(parse_response("2,15").is_err());
        assert!(parse_response("2,15,0,9").is_err());
    }
}
