//! Workload matching by IP address.

use crate::models::ManagedWorkload;

/// Whether `workload` owns `ip` as its public IP or on any interface.
///
/// Comparison is exact string equality; addresses are not normalized.
#[must_use]
pub fn matches_ip(workload: &ManagedWorkload, ip: &str) -> bool {
    workload.public_ip.as_deref() == Some(ip)
        || workload
            .interfaces
            .iter()
            .any(|iface| iface.address.as_deref() == Some(ip))
}

/// Every workload that owns `ip`, in fetched order.
#[must_use]
pub fn find_matches<'a>(workloads: &'a [ManagedWorkload], ip: &str) -> Vec<&'a ManagedWorkload> {
    workloads.iter().filter(|w| matches_ip(w, ip)).collect()
}
