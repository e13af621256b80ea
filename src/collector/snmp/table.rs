//! Indexing and merging of SNMP interface table walks.
//!
//! A numeric bulk walk (`snmpwalk -O qn`) prints one line per table cell:
//!
//! ```text
//! .1.3.6.1.2.1.2.2.1.2.1 = "lo"
//! .1.3.6.1.2.1.2.2.1.2.2 = "eth0"
//! ```
//!
//! The last OID component is the interface index shared by every column of
//! the table, which is what lets separate walks be joined per interface.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Separator between OID and value in quick-print output.
pub const WALK_SEPARATOR: &str = " = ";

/// Code assumed when a status walk has no entry for an interface.
pub const MISSING_STATUS_CODE: &str = "0";

/// Interface table index (the last OID component of a table cell).
///
/// Kept as text: it is an identifier, not a position, and devices do not
/// guarantee dense or ordered indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceIndex(String);

impl InterfaceIndex {
    pub fn new(index: impl Into<String>) -> Self {
        Self(index.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InterfaceIndex {
    fn from(index: &str) -> Self {
        Self::new(index)
    }
}

/// Index-to-value mapping that iterates in first-insertion order.
///
/// Re-inserting an index replaces its value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexedValues {
    entries: Vec<(InterfaceIndex, String)>,
    positions: HashMap<InterfaceIndex, usize>,
}

impl IndexedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: InterfaceIndex, value: String) {
        match self.positions.get(&index) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.positions.insert(index.clone(), self.entries.len());
                self.entries.push((index, value));
            }
        }
    }

    pub fn get(&self, index: &InterfaceIndex) -> Option<&str> {
        self.positions
            .get(index)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains(&self, index: &InterfaceIndex) -> bool {
        self.positions.contains_key(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InterfaceIndex, &str)> {
        self.entries.iter().map(|(idx, value)| (idx, value.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for IndexedValues {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut values = Self::new();
        for (index, value) in iter {
            values.insert(InterfaceIndex::new(index), value.to_string());
        }
        values
    }
}

/// Parse quick-print walk output into an index-to-value mapping.
///
/// Lines without the `" = "` separator are skipped. The value is everything
/// right of the first separator, trimmed.
pub fn index_values(raw: &str) -> IndexedValues {
    let mut values = IndexedValues::new();

    for line in raw.lines() {
        let Some((oid, value)) = line.split_once(WALK_SEPARATOR) else {
            continue;
        };
        let index = oid.trim().rsplit('.').next().unwrap_or_default();
        values.insert(InterfaceIndex::new(index), value.trim().to_string());
    }

    values
}

/// Decoded `ifAdminStatus` / `ifOperStatus` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InterfaceStatus {
    Up,
    Down,
    Testing,
    /// Any other code, kept verbatim for display.
    Unknown(String),
}

impl InterfaceStatus {
    /// Decode an IF-MIB status code (`1` up, `2` down, `3` testing).
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => Self::Up,
            "2" => Self::Down,
            "3" => Self::Testing,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }
}

impl fmt::Display for InterfaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("UP"),
            Self::Down => f.write_str("DOWN"),
            Self::Testing => f.write_str("TESTING"),
            Self::Unknown(code) => write!(f, "Unknown({code})"),
        }
    }
}

impl FromStr for InterfaceStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "UP" => Self::Up,
            "DOWN" => Self::Down,
            "TESTING" => Self::Testing,
            other => Self::Unknown(
                other
                    .strip_prefix("Unknown(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .unwrap_or(other)
                    .to_string(),
            ),
        })
    }
}

impl Serialize for InterfaceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InterfaceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the interface table, joined across the three column walks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceRecord {
    pub index: InterfaceIndex,
    pub name: String,
    pub admin_status: InterfaceStatus,
    pub oper_status: InterfaceStatus,
}

impl InterfaceRecord {
    /// Administratively enabled but operationally down (link problem).
    pub fn is_link_fault(&self) -> bool {
        self.admin_status.is_up() && self.oper_status == InterfaceStatus::Down
    }
}

/// Join description, admin and oper status walks per interface index.
///
/// The description mapping defines both membership and order: indices that
/// only appear in a status walk are dropped.
pub fn merge_interfaces(
    descr: &IndexedValues,
    admin: &IndexedValues,
    oper: &IndexedValues,
) -> Vec<InterfaceRecord> {
    descr
        .iter()
        .map(|(index, name)| InterfaceRecord {
            index: index.clone(),
            name: name.trim_matches('"').to_string(),
            admin_status: InterfaceStatus::from_code(
                admin.get(index).unwrap_or(MISSING_STATUS_CODE),
            ),
            oper_status: InterfaceStatus::from_code(
                oper.get(index).unwrap_or(MISSING_STATUS_CODE),
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCR_WALK: &str = "\
.1.3.6.1.2.1.2.2.1.2.1 = \"lo\"
.1.3.6.1.2.1.2.2.1.2.2 = \"eth0\"
.1.3.6.1.2.1.2.2.1.2.10 = \"GigabitEthernet0/1\"
";

    #[test]
    fn test_index_values_uses_last_oid_component() {
        let values = index_values(DESCR_WALK);
        assert_eq!(values.len(), 3);
        assert_eq!(values.get(&"1".into()), Some("\"lo\""));
        assert_eq!(values.get(&"10".into()), Some("\"GigabitEthernet0/1\""));
    }

    #[test]
    fn test_index_values_preserves_walk_order() {
        let raw = "\
.1.3.6.1.2.1.2.2.1.7.10 = 1
.1.3.6.1.2.1.2.2.1.7.2 = 2
.1.3.6.1.2.1.2.2.1.7.1 = 1
";
        let values = index_values(raw);
        let order: Vec<&str> = values.iter().map(|(i, _)| i.as_str()).collect();
        assert_eq!(order, vec!["10", "2", "1"]);
    }

    #[test]
    fn test_index_values_skips_lines_without_separator() {
        let raw = "\
Timeout: No Response from 10.0.0.1

.1.3.6.1.2.1.2.2.1.8.3 =   2
garbage line
";
        let values = index_values(raw);
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(&"3".into()), Some("2"));
    }

    #[test]
    fn test_index_values_keeps_separator_inside_value() {
        let values = index_values(".1.3.6.1.2.1.2.2.1.2.7 = \"a = b\"");
        assert_eq!(values.get(&"7".into()), Some("\"a = b\""));
    }

    #[test]
    fn test_index_values_duplicate_index_overwrites_in_place() {
        let raw = "x.1 = first\nx.2 = second\nx.1 = third\n";
        let values = index_values(raw);
        let entries: Vec<(&str, &str)> = values.iter().map(|(i, v)| (i.as_str(), v)).collect();
        assert_eq!(entries, vec![("1", "third"), ("2", "second")]);
    }

    #[test]
    fn test_index_values_is_idempotent() {
        assert_eq!(index_values(DESCR_WALK), index_values(DESCR_WALK));
        assert_eq!(index_values(""), IndexedValues::new());
    }

    #[test]
    fn test_merge_single_interface() {
        let descr = index_values(".1.3.6.1.2.1.2.2.1.2.1 = \"eth0\"");
        let admin = index_values(".1.3.6.1.2.1.2.2.1.7.1 = 1");
        let oper = index_values(".1.3.6.1.2.1.2.2.1.8.1 = 2");

        let merged = merge_interfaces(&descr, &admin, &oper);
        assert_eq!(
            merged,
            vec![InterfaceRecord {
                index: "1".into(),
                name: "eth0".to_string(),
                admin_status: InterfaceStatus::Up,
                oper_status: InterfaceStatus::Down,
            }]
        );
        assert!(merged[0].is_link_fault());
    }

    #[test]
    fn test_merge_membership_follows_description() {
        let descr: IndexedValues = [("1", "\"eth0\"")].into_iter().collect();
        let admin: IndexedValues = [("1", "1"), ("2", "1")].into_iter().collect();
        let oper: IndexedValues = [("2", "1"), ("3", "2")].into_iter().collect();

        let merged = merge_interfaces(&descr, &admin, &oper);
        assert_eq!(merged.len(), 1);
        assert!(merged.iter().all(|r| descr.contains(&r.index)));
        // No oper entry for index 1.
        assert_eq!(merged[0].oper_status, InterfaceStatus::Unknown("0".to_string()));
    }

    #[test]
    fn test_merge_order_follows_description_walk() {
        let descr: IndexedValues = [("3", "c"), ("1", "a"), ("2", "b")].into_iter().collect();
        let merged = merge_interfaces(&descr, &IndexedValues::new(), &IndexedValues::new());
        let names: Vec<&str> = merged.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_status_decoding() {
        assert_eq!(InterfaceStatus::from_code("1"), InterfaceStatus::Up);
        assert_eq!(InterfaceStatus::from_code("2"), InterfaceStatus::Down);
        assert_eq!(InterfaceStatus::from_code("3"), InterfaceStatus::Testing);
        assert_eq!(
            InterfaceStatus::from_code("5"),
            InterfaceStatus::Unknown("5".to_string())
        );
        assert_eq!(InterfaceStatus::from_code("5").to_string(), "Unknown(5)");
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_value(InterfaceStatus::Unknown("7".to_string())).unwrap();
        assert_eq!(json, serde_json::json!("Unknown(7)"));

        let back: InterfaceStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, InterfaceStatus::Unknown("7".to_string()));

        let up: InterfaceStatus = serde_json::from_str("\"UP\"").unwrap();
        assert_eq!(up, InterfaceStatus::Up);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = InterfaceRecord {
            index: "2".into(),
            name: "eth1".to_string(),
            admin_status: InterfaceStatus::Up,
            oper_status: InterfaceStatus::Testing,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["index"], "2");
        assert_eq!(json["adminStatus"], "UP");
        assert_eq!(json["operStatus"], "TESTING");
    }
}
