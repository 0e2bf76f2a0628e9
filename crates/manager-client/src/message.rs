//! Manager interface frames
//!
//! Every frame on the wire is a block of `Key: Value` lines terminated by an
//! empty line. Actions flow from us to the switch; responses and events flow
//! back. Header names are case-insensitive, so parsed frames store them
//! lowercased and every lookup lowercases its key.
//!
//! ```text
//! Action: Originate          Response: Success          Event: Hangup
//! ActionID: call-1           ActionID: call-1           Channel: SIP/main-0001
//! Channel: SIP/main/...      Message: Originate ...     Cause-txt: Normal Clearing
//! <blank>                    <blank>                    <blank>
//! ```

use std::collections::HashMap;
use std::fmt;

/// Line terminator used by the manager protocol
pub const LINE_END: &str = "\r\n";

/// An outbound action, with its headers kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    name: String,
    headers: Vec<(String, String)>,
}

impl Action {
    /// Create an action with the given name (`Originate`, `Login`, ...)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header, replacing an existing one with the same name
    pub fn with_header(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set_header(key, value);
        self
    }

    /// Set a header in place
    pub fn set_header(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((key, value)),
        }
    }

    /// Action name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a header value
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The correlation id, if one has been set
    pub fn action_id(&self) -> Option<&str> {
        self.header("ActionID")
    }

    /// Serialize to the wire format, blank line included
    pub fn encode(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, "Action", &self.name);
        for (key, value) in &self.headers {
            push_line(&mut out, key, value);
        }
        out.push_str(LINE_END);
        out
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(id) = self.action_id() {
            write!(f, " ({})", id)?;
        }
        Ok(())
    }
}

fn push_line(out: &mut String, key: &str, value: &str) {
    // A stray CR or LF would terminate the frame early
    out.extend(key.chars().filter(|c| *c != '\r' && *c != '\n'));
    out.push_str(": ");
    out.extend(value.chars().filter(|c| *c != '\r' && *c != '\n'));
    out.push_str(LINE_END);
}

/// Parsed header block with lowercased keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: HashMap<String, String>,
}

impl Headers {
    /// Build from raw `(key, value)` pairs; later duplicates win
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        Self { fields }
    }

    /// Case-insensitive lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&key.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(&key.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Response to an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerResponse {
    headers: Headers,
}

impl ManagerResponse {
    pub fn new(headers: Headers) -> Self {
        Self { headers }
    }

    /// Value of the `Response` header (`Success`, `Error`, `Follows`, ...)
    pub fn status(&self) -> &str {
        self.headers.get("response").unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        !self.status().eq_ignore_ascii_case("error")
    }

    pub fn action_id(&self) -> Option<&str> {
        self.headers.get("actionid")
    }

    pub fn message(&self) -> Option<&str> {
        self.headers.get("message")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }
}

/// Unsolicited event from the switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerEvent {
    headers: Headers,
}

impl ManagerEvent {
    pub fn new(headers: Headers) -> Self {
        Self { headers }
    }

    /// Build an event from literal pairs, mostly useful in tests
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::new(Headers::from_pairs(pairs))
    }

    /// Event name (`Hangup`, `DTMFBegin`, `Newstate`, ...)
    pub fn name(&self) -> &str {
        self.headers.get("event").unwrap_or_default()
    }

    /// Case-insensitive header lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

/// Anything the switch can send us
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerMessage {
    Response(ManagerResponse),
    Event(ManagerEvent),
}

impl ManagerMessage {
    /// Classify a parsed header block.
    ///
    /// `Event` wins over `Response`: events such as `OriginateResponse` carry both.
    pub fn from_headers(headers: Headers) -> Option<Self> {
        if headers.contains("event") {
            Some(Self::Event(ManagerEvent::new(headers)))
        } else if headers.contains("response") {
            Some(Self::Response(ManagerResponse::new(headers)))
        } else {
            None
        }
    }
}

/// Split a single header line into key and value.
///
/// Returns `None` for lines without a colon, which the switch only sends in
/// `Response: Follows` command output.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim_start()))
}

/// Parse a complete frame given as text, blank terminator optional
pub fn parse_frame(text: &str) -> Option<ManagerMessage> {
    let pairs = text
        .lines()
        .take_while(|line| !line.trim().is_empty())
        .filter_map(parse_header_line)
        .map(|(k, v)| (k.to_string(), v.to_string()));
    ManagerMessage::from_headers(Headers::from_pairs(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_header_order() {
        let action = Action::new("Originate")
            .with_header("ActionID", "call-1")
            .with_header("Channel", "SIP/main/*8088*123*456")
            .with_header("Priority", 1);

        assert_eq!(
            action.encode(),
            "Action: Originate\r\nActionID: call-1\r\nChannel: SIP/main/*8088*123*456\r\nPriority: 1\r\n\r\n"
        );
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let action = Action::new("Login")
            .with_header("Username", "a")
            .with_header("username", "b");

        assert_eq!(action.header("USERNAME"), Some("b"));
        assert_eq!(action.encode().matches("sername").count(), 1);
    }

    #[test]
    fn test_encode_strips_line_breaks_from_values() {
        let action = Action::new("Login").with_header("Secret", "pw\r\nAction: Logoff");
        let encoded = action.encode();

        assert!(encoded.contains("Secret: pwAction: Logoff\r\n"));
        assert_eq!(encoded.matches("\r\n\r\n").count(), 1);
    }

    #[test]
    fn test_parse_event_frame() {
        let frame = "Event: DTMFBegin\r\nPrivilege: dtmf,all\r\nExten: 15551234567\r\nDigit: 1\r\n\r\n";
        let Some(ManagerMessage::Event(event)) = parse_frame(frame) else {
            panic!("expected event");
        };

        assert_eq!(event.name(), "DTMFBegin");
        assert_eq!(event.get("exten"), Some("15551234567"));
        assert_eq!(event.get("DIGIT"), Some("1"));
    }

    #[test]
    fn test_parse_response_keeps_colons_in_value() {
        let frame = "Response: Error\r\nActionID: 7\r\nMessage: Extension does not exist: 100\r\n";
        let Some(ManagerMessage::Response(response)) = parse_frame(frame) else {
            panic!("expected response");
        };

        assert!(!response.is_success());
        assert_eq!(response.action_id(), Some("7"));
        assert_eq!(response.message(), Some("Extension does not exist: 100"));
    }

    #[test]
    fn test_parse_rejects_unclassified_frames() {
        assert!(parse_frame("Foo: bar\r\n\r\n").is_none());
        assert!(parse_header_line("no colon here").is_none());
        assert!(parse_header_line(": empty key").is_none());
    }

    #[test]
    fn test_originate_response_is_an_event() {
        let frame = "Event: OriginateResponse\r\nActionID: call-1\r\nResponse: Failure\r\nReason: 0\r\n\r\n";
        let Some(ManagerMessage::Event(event)) = parse_frame(frame) else {
            panic!("expected event");
        };

        assert_eq!(event.name(), "OriginateResponse");
        assert_eq!(event.get("response"), Some("Failure"));
    }
}
