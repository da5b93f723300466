use std::collections::BTreeSet;

use fourd_db::models::Candidate;

/// Keeps the ASCII digits of `text`, in order.
pub fn only_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Every 4-character window of `digits`, deduplicated and ascending.
/// Empty when `digits` is shorter than 4 or holds anything but ASCII digits.
pub fn windows4(digits: &str) -> BTreeSet<Candidate> {
    if digits.len() < 4 || !digits.is_ascii() {
        return BTreeSet::new();
    }
    (0..=digits.len() - 4)
        .filter_map(|i| Candidate::parse(&digits[i..i + 4]).ok())
        .collect()
}

/// Left-pads `digits` with zeros to 4 characters and keeps the last 4.
pub fn pad4(digits: &str) -> Option<Candidate> {
    if !digits.is_ascii() {
        return None;
    }
    let padded = format!("{:0>4}", digits);
    Candidate::parse(&padded[padded.len() - 4..]).ok()
}
