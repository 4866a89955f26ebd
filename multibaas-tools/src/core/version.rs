// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Automatic contract version identifiers.

use std::cmp::Ordering;

/// Version assigned to the first upload of a contract label.
pub const INITIAL_VERSION: &str = "1.0";

/// Compares versions treating runs of digits as numbers, so `1.10` sorts after `1.9`.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut a = Segments(a);
    let mut b = Segments(b);
    loop {
        match (a.next(), b.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_segment(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let a_num = a.starts_with(|c: char| c.is_ascii_digit());
    let b_num = b.starts_with(|c: char| c.is_ascii_digit());
    match (a_num, b_num) {
        (true, true) => {
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        // numbers sort before text
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// Splits a string into alternating digit and non-digit runs.
struct Segments<'a>(&'a str);

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.0.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = self
            .0
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(self.0.len());
        let (segment, rest) = self.0.split_at(end);
        self.0 = rest;
        Some(segment)
    }
}

/// Returns the greatest version in natural order.
pub fn latest<'a>(versions: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    versions.into_iter().max_by(|a, b| compare(a, b))
}

/// Bumps the trailing number of a version, or appends `2` when there is none.
pub fn increment(version: &str) -> String {
    let prefix = version.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &version[prefix.len()..];
    if digits.is_empty() {
        return format!("{version}2");
    }
    format!("{prefix}{}", increment_decimal(digits))
}

/// Adds one to a decimal string of arbitrary length.
fn increment_decimal(digits: &str) -> String {
    let mut out: Vec<u8> = digits.bytes().collect();
    for d in out.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return String::from_utf8(out).unwrap_or_default();
        }
    }
    let mut carried = String::with_capacity(out.len() + 1);
    carried.push('1');
    carried.extend(out.iter().map(|d| *d as char));
    carried
}

/// Chooses the version for a new upload: strictly greater than every existing version.
pub fn next_version<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    match latest(existing) {
        Some(latest) => increment(latest),
        None => INITIAL_VERSION.to_owned(),
    }
}
