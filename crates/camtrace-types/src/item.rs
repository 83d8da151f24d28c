use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::apdu::Apdu;
use crate::tlv::Tlv;

/// One `<interpretedresult>` node, preserving XML order and nesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InterpretationNode {
    pub content: String,
    pub children: Vec<InterpretationNode>,
}

impl InterpretationNode {
    pub fn leaf(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            children: Vec::new(),
        }
    }

    /// Depth-first search for the first node whose content contains `needle`
    /// (case-insensitive), returning the node's content.
    pub fn find_containing(&self, needle: &str) -> Option<&str> {
        let needle = needle.to_ascii_lowercase();
        if self.content.to_ascii_lowercase().contains(&needle) {
            return Some(self.content.as_str());
        }
        self.children.iter().find_map(|c| c.find_containing(&needle))
    }

    /// Flatten every node's content, depth-first.
    pub fn contents(&self) -> Vec<&str> {
        let mut out: Vec<&str> = vec![self.content.as_str()];
        for child in &self.children {
            out.extend(child.contents());
        }
        out
    }
}

/// One row of the trace: a `<traceitem>` record.
///
/// `index` is the stable ordering key; all derived structures reference items
/// by index rather than by pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceItem {
    pub index: usize,
    pub protocol: String,
    pub item_type: String,
    pub timestamp: Option<NaiveDateTime>,
    pub raw_hex: Option<Vec<u8>>,
    pub interpretation: Option<InterpretationNode>,
    pub summary: String,

    pub apdu: Option<Apdu>,
    pub tlvs: Option<Vec<Tlv>>,
}

impl TraceItem {
    /// Summary is the content of the first interpretation node, or empty.
    pub fn summary_for(interpretation: &Option<InterpretationNode>) -> String {
        interpretation
            .as_ref()
            .map(|n| n.content.clone())
            .unwrap_or_default()
    }

    pub fn type_contains(&self, needle: &str) -> bool {
        self.item_type.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
    }

    /// True when the interpretation tree names a given node anywhere.
    pub fn interpretation_contains(&self, needle: &str) -> bool {
        self.interpretation
            .as_ref()
            .map(|n| n.find_containing(needle).is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_is_first_interpretation_node() {
        let node = InterpretationNode {
            content: "Status: 90 00".into(),
            children: vec![InterpretationNode::leaf("detail")],
        };
        let interp = Some(node);
        assert_eq!(TraceItem::summary_for(&interp), "Status: 90 00");
        assert_eq!(TraceItem::summary_for(&None), "");
    }

    #[test]
    fn find_containing_descends_children() {
        let node = InterpretationNode {
            content: "Open Channel".into(),
            children: vec![InterpretationNode::leaf("Server name: smdp.example.com")],
        };
        assert_eq!(
            node.find_containing("server name"),
            Some("Server name: smdp.example.com")
        );
        assert!(node.find_containing("nonexistent").is_none());
    }
}
