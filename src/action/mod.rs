//! Parsing of action instructions ("server-id:action-name {args json}") and
//! the argument bundle handed to every invoked action.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionInstruction {
    pub action_name: String,
    pub args_str: String,
    pub action_server_id: Option<String>,
}

/// Splits an instruction into its target and raw argument string. The first
/// space-delimited chunk is `[serverId:]actionName`; everything after the
/// first space is the argument payload, passed through verbatim.
pub fn parse_action_instruction(instruction: &str) -> ActionInstruction {
    let (head, args_str) = match instruction.split_once(' ') {
        Some((head, rest)) => (head, String::from(rest)),
        None => (instruction, String::new()),
    };
    let (action_server_id, action_name) = match head.split_once(':') {
        Some((server, name)) => (Some(String::from(server)), String::from(name)),
        None => (None, String::from(head)),
    };
    ActionInstruction {
        action_name,
        args_str,
        action_server_id,
    }
}

/// The per-scope conversation state an action may read or write.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct EventState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct IncomingEvent {
    #[serde(rename = "botId")]
    pub bot_id: String,
    pub channel: String,
    pub target: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub state: EventState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Builds the common argument object every action receives: the caller's own
/// args merged with the event and its state slices, each slice defaulting to
/// an empty object.
pub fn extract_event_common_args(
    event: &IncomingEvent,
    args: Option<Map<String, Value>>,
) -> Map<String, Value> {
    let slice = |v: &Option<Value>| v.clone().unwrap_or_else(|| Value::Object(Map::new()));
    let mut merged = args.unwrap_or_default();
    merged.insert(
        String::from("event"),
        serde_json::to_value(event).unwrap_or(Value::Null),
    );
    merged.insert(String::from("user"), slice(&event.state.user));
    merged.insert(String::from("session"), slice(&event.state.session));
    merged.insert(String::from("temp"), slice(&event.state.temp));
    merged.insert(String::from("bot"), slice(&event.state.bot));
    merged.insert(String::from("workflow"), slice(&event.state.workflow));
    merged
}
