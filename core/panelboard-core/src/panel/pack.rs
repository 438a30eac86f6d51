//! Label packing across the host's three 16-char row fields.
//!
//! A rendered row is `team prefix + entry name + team suffix`. Splitting a
//! long label across those three fields lets one row carry up to 48 chars
//! against the host's 16-char entry limit. Splits respect char boundaries;
//! anything over 48 chars is rejected outright, never truncated.

use panelboard_host::{unit_len, NAME_LIMIT};

use crate::error::{BoardError, Result};

/// Longest label a panel field accepts: prefix + name + suffix.
pub const FIELD_LABEL_LIMIT: usize = NAME_LIMIT * 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PackedLabel {
    pub prefix: String,
    pub name: String,
    pub suffix: String,
}

impl PackedLabel {
    /// Whether rendering this label needs a team for prefix/suffix carry.
    pub(crate) fn needs_team(&self) -> bool {
        !self.prefix.is_empty() || !self.suffix.is_empty()
    }
}

/// Rejects labels over the 48-char packing limit.
pub(crate) fn check(label: &str) -> Result<()> {
    let len = unit_len(label);
    if len > FIELD_LABEL_LIMIT {
        return Err(BoardError::LabelTooLong {
            len,
            max: FIELD_LABEL_LIMIT,
        });
    }
    Ok(())
}

fn take_chars(label: &str, from: usize, count: usize) -> String {
    label.chars().skip(from).take(count).collect()
}

/// Splits a label into the (prefix, name, suffix) triplet per its length
/// band. ≤16 fits the entry alone; 17–32 spills into the suffix; 33–48 uses
/// all three fields.
pub(crate) fn pack(label: &str) -> Result<PackedLabel> {
    check(label)?;
    let len = unit_len(label);

    let packed = if len <= NAME_LIMIT {
        PackedLabel {
            prefix: String::new(),
            name: label.to_string(),
            suffix: String::new(),
        }
    } else if len <= NAME_LIMIT * 2 {
        PackedLabel {
            prefix: String::new(),
            name: take_chars(label, 0, NAME_LIMIT),
            suffix: take_chars(label, NAME_LIMIT, NAME_LIMIT),
        }
    } else {
        PackedLabel {
            prefix: take_chars(label, 0, NAME_LIMIT),
            name: take_chars(label, NAME_LIMIT, NAME_LIMIT),
            suffix: take_chars(label, NAME_LIMIT * 2, NAME_LIMIT),
        }
    };
    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(packed: &PackedLabel) -> String {
        format!("{}{}{}", packed.prefix, packed.name, packed.suffix)
    }

    #[test]
    fn short_labels_fit_the_name_field() {
        let packed = pack("kills").unwrap();
        assert_eq!(packed.prefix, "");
        assert_eq!(packed.name, "kills");
        assert_eq!(packed.suffix, "");
        assert!(!packed.needs_team());
    }

    #[test]
    fn sixteen_chars_still_need_no_team() {
        let label = "x".repeat(16);
        assert!(!pack(&label).unwrap().needs_team());
    }

    #[test]
    fn seventeen_chars_spill_into_the_suffix() {
        let label: String = ('a'..='q').collect();
        let packed = pack(&label).unwrap();
        assert_eq!(packed.prefix, "");
        assert_eq!(unit_len(&packed.name), 16);
        assert_eq!(packed.suffix, "q");
        assert!(packed.needs_team());
        assert_eq!(rendered(&packed), label);
    }

    #[test]
    fn thirty_three_chars_use_all_three_fields() {
        let label = "p".repeat(16) + &"n".repeat(16) + "s";
        let packed = pack(&label).unwrap();
        assert_eq!(packed.prefix, "p".repeat(16));
        assert_eq!(packed.name, "n".repeat(16));
        assert_eq!(packed.suffix, "s");
        assert_eq!(rendered(&packed), label);
    }

    #[test]
    fn forty_eight_chars_is_the_ceiling() {
        assert!(pack(&"x".repeat(48)).is_ok());
        let err = pack(&"x".repeat(49)).unwrap_err();
        assert!(matches!(err, BoardError::LabelTooLong { len: 49, max: 48 }));
    }

    #[test]
    fn splits_count_chars_not_bytes() {
        // 20 four-byte chars: would overflow a byte-indexed split.
        let label = "🂡".repeat(20);
        let packed = pack(&label).unwrap();
        assert_eq!(unit_len(&packed.name), 16);
        assert_eq!(unit_len(&packed.suffix), 4);
        assert_eq!(rendered(&packed), label);
    }
}
