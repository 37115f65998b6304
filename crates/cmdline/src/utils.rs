const SIZE_SUFFIXES: [(char, u64); 3] = [('K', 1 << 10), ('M', 1 << 20), ('G', 1 << 30)];

/// Parses a byte count with an optional `K`, `M` or `G` suffix (powers of 1024)
pub fn parse_size(value: &str) -> Result<u64, String> {
    let value = value.trim();
    let invalid = || {
        format!(
            "Invalid size '{}', expected a number with an optional K, M or G suffix",
            value
        )
    };

    let (digits, multiplier) = match value.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some(last) => match SIZE_SUFFIXES.iter().find(|(suffix, _)| *suffix == last) {
            Some(&(_, multiplier)) => (&value[..value.len() - 1], multiplier),
            None => (value, 1),
        },
        None => return Err(invalid()),
    };

    let count: u64 = digits.trim().parse().map_err(|_| invalid())?;
    count
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Size '{}' is too large", value))
}
