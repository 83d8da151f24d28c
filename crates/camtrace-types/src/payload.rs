use serde::{Deserialize, Serialize};

/// Direction of a reassembled BIP payload stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    MeToSim,
    SimToMe,
}

/// One offset-range -> source-item mapping entry, for selection sync back to the
/// trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OffsetSpan {
    pub start: usize,
    pub end: usize,
    pub item_index: usize,
}

/// Contiguous concatenation of data TLV payloads for one channel+direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayloadStream {
    pub bytes: Vec<u8>,
    pub spans: Vec<OffsetSpan>,
}

impl PayloadStream {
    /// Item index that contributed the byte at `offset`, if any.
    pub fn item_for_offset(&self, offset: usize) -> Option<usize> {
        self.spans
            .iter()
            .find(|s| offset >= s.start && offset < s.end)
            .map(|s| s.item_index)
    }

    pub fn append(&mut self, item_index: usize, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        let start = self.bytes.len();
        self.bytes.extend_from_slice(data);
        self.spans.push(OffsetSpan {
            start,
            end: self.bytes.len(),
            item_index,
        });
    }
}
