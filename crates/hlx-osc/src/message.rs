//! OSC message shape and address-pattern construction.

/// A single outbound OSC message, already fully formed: address pattern
/// resolved, values truncated to wire precision.
#[derive(Debug, Clone, PartialEq)]
pub struct OscMsg {
    pub address: String,
    pub args: Vec<f32>,
    pub affected_track_indices: Vec<u32>,
}

impl OscMsg {
    pub fn to_rosc(&self) -> rosc::OscMessage {
        rosc::OscMessage {
            addr: self.address.clone(),
            args: self.args.iter().map(|&f| rosc::OscType::Float(f)).collect(),
        }
    }
}

/// Build a `/track/<pat>/…` address, choosing the tightest pattern that
/// covers `indices` exactly. Never emits the `/track/*` wildcard.
pub fn address_pattern(indices: &[u32]) -> String {
    debug_assert!(!indices.is_empty());
    if indices.len() == 1 {
        return indices[0].to_string();
    }
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let is_consecutive = sorted.len() == indices.len()
        && sorted.windows(2).all(|w| w[1] == w[0] + 1);
    if is_consecutive {
        format!("[{}-{}]", sorted[0], sorted[sorted.len() - 1])
    } else {
        let parts: Vec<String> = sorted.iter().map(|i| i.to_string()).collect();
        format!("{{{}}}", parts.join(","))
    }
}

pub fn track_address(indices: &[u32], suffix: &str) -> String {
    format!("/track/{}/{}", address_pattern(indices), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_index_has_no_brackets() {
        assert_eq!(address_pattern(&[3]), "3");
    }

    #[test]
    fn consecutive_indices_use_range_syntax() {
        assert_eq!(address_pattern(&[2, 3, 4]), "[2-4]");
    }

    #[test]
    fn non_consecutive_indices_use_set_syntax() {
        assert_eq!(address_pattern(&[5, 1, 3]), "{1,3,5}");
    }

    #[test]
    fn track_address_builds_full_path() {
        assert_eq!(track_address(&[1, 2], "xyz"), "/track/[1-2]/xyz");
    }
}
