/// One serialized child node of the restaurant table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Page the row came from.
    pub page: u32,
    /// Serialized markup for elements, the bare text for text nodes.
    pub markup: String,
    /// Child-node count for elements, character count for text nodes.
    /// Rows of length 1 are separators or whitespace and carry no data.
    pub len: usize,
}

impl RawRow {
    pub fn is_data(&self) -> bool {
        self.len != 1
    }
}
