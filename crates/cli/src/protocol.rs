//! The textual line protocol spoken between clients and the server.
//!
//! One request per connection, newline terminated:
//!
//! ```text
//! GET <key>
//! PUT <key> <value>
//! ```
//!
//! The token separator is a single space. A PUT value runs to the end of the
//! line, so it may itself contain spaces. Responses are `OK` (successful
//! put), `VALUE <value>` (get hit) or `ERROR <message>` (get miss, engine
//! failure, or an unparseable request).

/// A parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Get { key: String },
    Put { key: String, value: String },
    Unknown,
}

impl Request {
    /// Parses one request line. Trailing line terminators are stripped;
    /// anything that is not a well-formed `GET` or `PUT` with a non-empty
    /// key is [`Request::Unknown`].
    pub fn parse(line: &str) -> Request {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(key) = line.strip_prefix("GET ") {
            if !key.is_empty() {
                return Request::Get {
                    key: key.to_string(),
                };
            }
        } else if let Some(rest) = line.strip_prefix("PUT ") {
            if let Some((key, value)) = rest.split_once(' ') {
                if !key.is_empty() {
                    return Request::Put {
                        key: key.to_string(),
                        value: value.to_string(),
                    };
                }
            }
        }
        Request::Unknown
    }

    /// Renders the request as a wire line (without the trailing newline).
    pub fn serialize(&self) -> String {
        match self {
            Request::Get { key } => format!("GET {key}"),
            Request::Put { key, value } => format!("PUT {key} {value}"),
            Request::Unknown => "UNKNOWN".to_string(),
        }
    }
}

/// A server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok,
    Value(String),
    Error(String),
}

impl Response {
    /// Renders the response as a wire line (without the trailing newline).
    pub fn serialize(&self) -> String {
        match self {
            Response::Ok => "OK".to_string(),
            Response::Value(value) => format!("VALUE {value}"),
            Response::Error(message) => format!("ERROR {message}"),
        }
    }

    /// Parses one response line.
    pub fn parse(line: &str) -> Response {
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "OK" {
            Response::Ok
        } else if let Some(value) = line.strip_prefix("VALUE ") {
            Response::Value(value.to_string())
        } else if let Some(message) = line.strip_prefix("ERROR ") {
            Response::Error(message.to_string())
        } else {
            Response::Error("UNKNOWN_RESPONSE".to_string())
        }
    }
}
