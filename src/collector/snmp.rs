//! SNMP v2c system query and interface table collection.
//!
//! - [`SnmpClient`]: single-value gets and subtree walks via `snmpwalk`
//! - [`index_values`] / [`merge_interfaces`]: per-interface join of table walks

mod client;
mod table;

pub use client::{
    OID_IF_ADMIN_STATUS, OID_IF_DESCR, OID_IF_OPER_STATUS, OID_SYS_DESCR, OID_SYS_UPTIME,
    SnmpClient, SnmpConfig, SnmpError, SnmpSystemInfo,
};
pub use table::{
    IndexedValues, InterfaceIndex, InterfaceRecord, InterfaceStatus, MISSING_STATUS_CODE,
    index_values, merge_interfaces,
};
