use serde::{Deserialize, Serialize};

/// Header row written when a creator sheet is created.
pub const CREATOR_SHEET_HEADERS: [&str; 4] = [
    "Creator Name",
    "Creator SecUid",
    "Account Link",
    "Follower Count",
];

pub const NAME_COLUMN: &str = CREATOR_SHEET_HEADERS[0];
pub const SEC_UID_COLUMN: &str = CREATOR_SHEET_HEADERS[1];
pub const ACCOUNT_LINK_COLUMN: &str = CREATOR_SHEET_HEADERS[2];
pub const FOLLOWER_COUNT_COLUMN: &str = CREATOR_SHEET_HEADERS[3];

/// Public profile URL for a creator identifier.
#[must_use]
pub fn profile_link(sec_uid: &str) -> String {
    format!("https://www.douyin.com/user/{sec_uid}")
}

/// One creator row in the creator sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    pub sec_uid: String,
    pub account_link: String,
    /// `None` is an empty cell, which is distinct from a count of zero.
    pub follower_count: Option<u64>,
}

impl Creator {
    /// A freshly discovered creator. The follower count is left for
    /// enrichment to fill in.
    #[must_use]
    pub fn discovered(name: impl Into<String>, sec_uid: impl Into<String>) -> Self {
        let sec_uid = sec_uid.into();
        Self {
            name: name.into(),
            account_link: profile_link(&sec_uid),
            sec_uid,
            follower_count: None,
        }
    }

    /// Cells in [`CREATOR_SHEET_HEADERS`] order.
    #[must_use]
    pub fn to_row(&self) -> Vec<serde_json::Value> {
        vec![
            self.name.clone().into(),
            self.sec_uid.clone().into(),
            self.account_link.clone().into(),
            self.follower_count
                .map_or_else(|| "".into(), serde_json::Value::from),
        ]
    }
}

/// Parse a follower-count cell. Blank, non-numeric and negative values are
/// all "unknown".
#[must_use]
pub fn parse_follower_count(cell: &str) -> Option<u64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Sheets renders large numbers with grouping separators under
    // USER_ENTERED formatting.
    let digits: String = trimmed.chars().filter(|c| *c != ',').collect();
    digits.parse::<u64>().ok().or_else(|| {
        digits
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n = f as u64;
                n
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovered_creator_has_profile_link_and_blank_followers() {
        let c = Creator::discovered("Alice", "MS4wLjABAAAA");
        assert_eq!(c.account_link, "https://www.douyin.com/user/MS4wLjABAAAA");
        assert_eq!(c.follower_count, None);
        assert_eq!(
            c.to_row(),
            vec![
                serde_json::json!("Alice"),
                serde_json::json!("MS4wLjABAAAA"),
                serde_json::json!("https://www.douyin.com/user/MS4wLjABAAAA"),
                serde_json::json!(""),
            ]
        );
    }

    #[test]
    fn parse_follower_count_handles_sheet_formats() {
        assert_eq!(parse_follower_count("1234"), Some(1234));
        assert_eq!(parse_follower_count(" 1,234,567 "), Some(1_234_567));
        assert_eq!(parse_follower_count("42.0"), Some(42));
        assert_eq!(parse_follower_count("0"), Some(0));
    }

    #[test]
    fn parse_follower_count_rejects_blank_and_garbage() {
        assert_eq!(parse_follower_count(""), None);
        assert_eq!(parse_follower_count("   "), None);
        assert_eq!(parse_follower_count("n/a"), None);
        assert_eq!(parse_follower_count("-5"), None);
        assert_eq!(parse_follower_count("1.5"), None);
    }
}
