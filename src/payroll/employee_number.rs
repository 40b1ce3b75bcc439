//! Sequential employee numbers: `EMP` followed by a counter padded to three digits.
//!
//! Counters past 999 widen (`EMP1000`) rather than wrap. Ordering is always
//! numeric, so a widened number still follows every three-digit one.

pub const EMPLOYEE_NUMBER_PREFIX: &str = "EMP";
const COUNTER_WIDTH: usize = 3;

pub fn format_employee_number(counter: u64) -> String {
    format!(
        "{}{:0width$}",
        EMPLOYEE_NUMBER_PREFIX,
        counter,
        width = COUNTER_WIDTH
    )
}

/// Returns the counter of a well-formed employee number.
pub fn parse_employee_number(number: &str) -> Option<u64> {
    let digits = number.strip_prefix(EMPLOYEE_NUMBER_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Greatest counter among `numbers`; malformed numbers are ignored.
pub fn highest_counter<'a, I>(numbers: I) -> Option<u64>
where
    I: IntoIterator<Item = &'a str>,
{
    numbers.into_iter().filter_map(parse_employee_number).max()
}

/// Number that follows the greatest of `numbers`, or `EMP001` when there is none.
pub fn next_employee_number<'a, I>(numbers: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    format_employee_number(highest_counter(numbers).map_or(1, |counter| counter + 1))
}
