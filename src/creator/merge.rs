/// News-agency credit suffixes, in match priority order.
pub const AGENCY_SUFFIXES: &[&str] = &[
    "/AP", "/TT", "/SvD", "/Reuters", "/Getty", "/AFP", "/DPA", "/ AP", "/ TT", "/ SvD",
    "/ Reuters", "/ Getty", "/ AFP", "/ DPA",
];

/// Combine the left and right image credits into one caption.
///
/// An empty side yields the other side unchanged. When both credits end in
/// the same agency suffix, the suffix is written once:
///
/// ```rust
/// use banfinator::creator::merge;
///
/// assert_eq!(merge("Jane Doe/TT", "John Smith/TT"), "Jane Doe/John Smith/TT");
/// assert_eq!(merge("Jane Doe", "John Smith"), "Jane Doe/John Smith");
/// assert_eq!(merge("", "John Smith"), "John Smith");
/// ```
pub fn merge(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => String::new(),
        (false, true) => left.to_string(),
        (true, false) => right.to_string(),
        (false, false) => match common_agency_suffix(left, right) {
            Some(suffix) => format!(
                "{}/{}{suffix}",
                &left[..left.len() - suffix.len()],
                &right[..right.len() - suffix.len()]
            ),
            None => format!("{left}/{right}"),
        },
    }
}

/// First suffix from [`AGENCY_SUFFIXES`] that both credits end with.
pub fn common_agency_suffix(left: &str, right: &str) -> Option<&'static str> {
    AGENCY_SUFFIXES
        .iter()
        .copied()
        .find(|suffix| left.ends_with(suffix) && right.ends_with(suffix))
}
