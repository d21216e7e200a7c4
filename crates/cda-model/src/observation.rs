use serde::{Deserialize, Serialize};

use crate::timestamp::PartialTimestamp;

/// One codified result read from a section component.
///
/// Every field mirrors a source attribute verbatim. `None` means the
/// attribute was not declared; `Some("")` means it was declared empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// `code/@displayName`
    pub name: Option<String>,
    /// `code/@code`
    pub code: Option<String>,
    /// `code/@codeSystem` (an OID)
    pub code_system: Option<String>,
    /// `code/@codeSystemName`
    pub code_system_name: Option<String>,
    /// `value/@value`, never coerced to a number.
    pub value: Option<String>,
    /// `value/@unit`
    pub unit: Option<String>,
}

impl ResultRecord {
    /// True when no attribute at all was found for this component.
    pub fn is_blank(&self) -> bool {
        self.name.is_none()
            && self.code.is_none()
            && self.code_system.is_none()
            && self.code_system_name.is_none()
            && self.value.is_none()
            && self.unit.is_none()
    }
}

/// The results recorded by one section entry, with the entry's timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationGroup {
    pub date: Option<PartialTimestamp>,
    /// Component results in document order.
    pub results: Vec<ResultRecord>,
}

impl ObservationGroup {
    pub fn new(date: Option<PartialTimestamp>, results: Vec<ResultRecord>) -> Self {
        Self { date, results }
    }
}
