//! Record translation between backend rows and endpoints
//!
//! ## Coalescing
//!
//! The backend stores one row per address, so an A record with three
//! addresses arrives as three rows. Rows of type A sharing a full name are
//! collapsed into a single [`Endpoint`] whose targets follow row order.
//! CNAME and TXT rows each become their own endpoint. Rows of any other
//! type are dropped.
//!
//! Output order: CNAME/TXT endpoints in encounter order, then the A groups.

use std::collections::HashMap;
use tracing::debug;

use crate::endpoint::{Endpoint, RecordType};
use crate::traits::{RawRecord, RecordChange};

/// Convert backend rows into endpoints
pub fn to_endpoints(records: &[RawRecord]) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    let mut groups: Vec<Endpoint> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();

    for rr in records {
        // Exact wire names only
        let record_type = match rr.record_type.as_str() {
            "A" => RecordType::A,
            "CNAME" => RecordType::Cname,
            "TXT" => RecordType::Txt,
            _ => continue,
        };
        debug!("Found {} record: {} -> {}", record_type, rr.name, rr.value);

        let ttl = parse_ttl(&rr.ttl);
        match record_type {
            RecordType::A => match group_index.get(rr.name.as_str()) {
                Some(&i) => groups[i].targets.push(rr.value.clone()),
                None => {
                    group_index.insert(rr.name.as_str(), groups.len());
                    groups.push(endpoint(rr, record_type, ttl));
                }
            },
            _ => endpoints.push(endpoint(rr, record_type, ttl)),
        }
    }

    endpoints.extend(groups);
    endpoints
}

/// Expand an endpoint into one backend mutation per target, in target order
pub fn changes_for(endpoint: &Endpoint) -> Vec<RecordChange> {
    endpoint
        .targets
        .iter()
        .map(|value| RecordChange {
            name: endpoint.dns_name.clone(),
            record_type: endpoint.record_type.clone(),
            ttl: endpoint.record_ttl,
            value: value.clone(),
        })
        .collect()
}

/// Backend TTL to endpoint TTL; missing, non-numeric and zero all mean unset
pub fn parse_ttl(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|ttl| *ttl > 0)
}

fn endpoint(rr: &RawRecord, record_type: RecordType, ttl: Option<u32>) -> Endpoint {
    Endpoint {
        dns_name: rr.name.clone(),
        record_type,
        targets: vec![rr.value.clone()],
        record_ttl: ttl,
        provider_specific: Vec::new(),
    }
}
