//! Authored dialogue nodes as they arrive at the deserialization boundary.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::edge::{EdgeKind, Slot};

/// The reserved terminal target. Always valid as a reference, never a node.
pub const END: &str = "END";

/// Node kinds understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Dialogue,
    Test,
    End,
}

impl NodeKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Dialogue => "dialogue",
            Self::Test => "test",
            Self::End => "end",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authored node.
///
/// A missing or `null` `id` deserializes as the empty string so that the
/// engine can report it as a finding instead of rejecting the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, alias = "text", skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(flatten)]
    pub body: NodeBody,
}

/// Kind-specific reference slots, tagged by the JSON `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeBody {
    Dialogue(DialogueSlots),
    Test(TestSlots),
    End {},
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

/// A player choice on a dialogue node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        alias = "target",
        alias = "nextNode",
        skip_serializing_if = "Option::is_none"
    )]
    pub next: Option<String>,
}

/// Outcome slots of a skill test.
///
/// `success`/`failure` belong to the legacy two-outcome schema; the four
/// `*_node` slots belong to the current schema. Any subset may be populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(
        default,
        alias = "critical_failure_node",
        skip_serializing_if = "Option::is_none"
    )]
    pub critical_failure_node: Option<String>,
    #[serde(default, alias = "failure_node", skip_serializing_if = "Option::is_none")]
    pub failure_node: Option<String>,
    #[serde(default, alias = "success_node", skip_serializing_if = "Option::is_none")]
    pub success_node: Option<String>,
    #[serde(
        default,
        alias = "critical_success_node",
        skip_serializing_if = "Option::is_none"
    )]
    pub critical_success_node: Option<String>,
}

/// One populated reference slot of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    pub slot: Slot,
    pub kind: EdgeKind,
    pub target: &'a str,
}

impl Node {
    /// Convenience constructor for a dialogue node.
    #[must_use]
    pub fn dialogue(id: impl Into<String>, slots: DialogueSlots) -> Self {
        Self {
            id: id.into(),
            speaker: None,
            line: None,
            body: NodeBody::Dialogue(slots),
        }
    }

    /// Convenience constructor for a test node.
    #[must_use]
    pub fn test(id: impl Into<String>, slots: TestSlots) -> Self {
        Self {
            id: id.into(),
            speaker: None,
            line: None,
            body: NodeBody::Test(slots),
        }
    }

    /// Convenience constructor for an explicit end node.
    #[must_use]
    pub fn end(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            speaker: None,
            line: None,
            body: NodeBody::End {},
        }
    }

    #[must_use]
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Dialogue(_) => NodeKind::Dialogue,
            NodeBody::Test(_) => NodeKind::Test,
            NodeBody::End {} => NodeKind::End,
        }
    }

    /// `true` when the node carries a usable (non-blank) ID.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// `true` when the node has neither a speaker nor a line.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        is_blank(self.speaker.as_deref()) && is_blank(self.line.as_deref())
    }

    /// Populated targets of `slot`, in slot order. Blank values are skipped.
    #[must_use]
    pub fn slot_targets(&self, slot: Slot) -> Vec<&str> {
        if !slot.applies_to(self.kind()) {
            return Vec::new();
        }

        match (&self.body, slot) {
            (NodeBody::Dialogue(d), Slot::Next) => populated(d.next.as_deref()),
            (NodeBody::Dialogue(d), Slot::Choices) => d
                .choices
                .iter()
                .map(|choice| choice.next.as_deref().unwrap_or(""))
                .collect(),
            (NodeBody::Test(t), Slot::Next) => populated(t.next.as_deref()),
            (NodeBody::Test(t), Slot::Success) => populated(t.success.as_deref()),
            (NodeBody::Test(t), Slot::Failure) => populated(t.failure.as_deref()),
            (NodeBody::Test(t), Slot::CriticalFailureNode) => {
                populated(t.critical_failure_node.as_deref())
            }
            (NodeBody::Test(t), Slot::FailureNode) => populated(t.failure_node.as_deref()),
            (NodeBody::Test(t), Slot::SuccessNode) => populated(t.success_node.as_deref()),
            (NodeBody::Test(t), Slot::CriticalSuccessNode) => {
                populated(t.critical_success_node.as_deref())
            }
            _ => Vec::new(),
        }
    }

    /// Every populated reference of this node in traversal order.
    ///
    /// Choices keep their list position in the edge kind even when an earlier
    /// choice has no target, so `choice[2]` always means the third choice.
    #[must_use]
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut refs = Vec::new();
        for slot in Slot::ORDER {
            for (ordinal, target) in self.slot_targets(slot).into_iter().enumerate() {
                if target.trim().is_empty() {
                    continue;
                }
                refs.push(Reference {
                    slot,
                    kind: slot.edge_kind(ordinal),
                    target,
                });
            }
        }
        refs
    }

    /// Skill under test, for test nodes.
    #[must_use]
    pub fn skill(&self) -> Option<&str> {
        match &self.body {
            NodeBody::Test(t) => t.skill.as_deref().filter(|s| !s.trim().is_empty()),
            _ => None,
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn populated(value: Option<&str>) -> Vec<&str> {
    value
        .filter(|v| !v.trim().is_empty())
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Node {
        serde_json::from_str(json).expect("node should parse")
    }

    #[test]
    fn parses_dialogue_with_choices() {
        let node = parse(
            r#"{"id":"NODE_GREETING","type":"dialogue","speaker":"Guard","line":"Halt!",
                "choices":[{"text":"Who goes?","next":"NODE_ASK"},{"text":"Leave","next":"END"}]}"#,
        );
        assert_eq!(node.kind(), NodeKind::Dialogue);
        let refs = node.references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, EdgeKind::Choice(0));
        assert_eq!(refs[0].target, "NODE_ASK");
        assert_eq!(refs[1].kind, EdgeKind::Choice(1));
        assert_eq!(refs[1].target, END);
    }

    #[test]
    fn parses_current_test_schema() {
        let node = parse(
            r#"{"id":"NODE_LOCKPICK","type":"test","skill":"lockpicking",
                "criticalFailureNode":"NODE_ALARM","failureNode":"NODE_STUCK",
                "successNode":"NODE_OPEN","criticalSuccessNode":"NODE_LOOT"}"#,
        );
        let kinds: Vec<EdgeKind> = node.references().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EdgeKind::TestCriticalFailure,
                EdgeKind::TestFailure,
                EdgeKind::TestSuccess,
                EdgeKind::TestCriticalSuccess,
            ]
        );
        assert_eq!(node.skill(), Some("lockpicking"));
    }

    #[test]
    fn legacy_test_schema_only_yields_populated_slots() {
        let node = parse(r#"{"id":"NODE_T","type":"test","failureNode":"A","successNode":"B"}"#);
        let refs = node.references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].kind, EdgeKind::TestFailure);
        assert_eq!(refs[1].kind, EdgeKind::TestSuccess);
    }

    #[test]
    fn snake_case_aliases_are_accepted() {
        let node = parse(r#"{"id":"T","type":"test","critical_success_node":"WIN"}"#);
        assert_eq!(node.references()[0].kind, EdgeKind::TestCriticalSuccess);
    }

    #[test]
    fn blank_slots_produce_no_edges() {
        let node = parse(
            r#"{"id":"N","type":"dialogue","next":"  ","choices":[{"text":"a"},{"next":"X"}]}"#,
        );
        let refs = node.references();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].kind, EdgeKind::Choice(1));
    }

    #[test]
    fn missing_id_deserializes_as_empty() {
        let node = parse(r#"{"type":"dialogue","line":"orphaned text"}"#);
        assert!(!node.has_id());
        assert!(!node.is_silent());
    }

    #[test]
    fn null_id_deserializes_as_empty() {
        let node = parse(r#"{"id":null,"type":"dialogue","line":"pending"}"#);
        assert_eq!(node.id, "");
        assert!(!node.has_id());

        let result: Result<Node, _> = serde_json::from_str(r#"{"id":7,"type":"dialogue"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result: Result<Node, _> = serde_json::from_str(r#"{"id":"X","type":"cutscene"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn end_node_ignores_extra_fields() {
        let node = parse(r#"{"id":"THE_END","type":"end","position":{"x":1,"y":2}}"#);
        assert_eq!(node.kind(), NodeKind::End);
        assert!(node.references().is_empty());
    }

    #[test]
    fn serialization_keeps_type_tag() {
        let node = Node::dialogue(
            "A",
            DialogueSlots {
                next: Some("B".into()),
                choices: Vec::new(),
            },
        );
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["type"], "dialogue");
        assert_eq!(json["next"], "B");
    }
}
