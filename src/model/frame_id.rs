// Frame id naming helpers

pub const DEFAULT_PADDING: usize = 5;

/// `prefix` followed by `n` zero-padded to `padding` digits.
pub fn padded_id(prefix: &str, n: u32, padding: usize) -> String {
    format!("{}{:0width$}", prefix, n, width = padding)
}

/// Splits a numbered frame name like `walk_0007` into `("walk_", 7, 4)`.
///
/// Returns `None` when the name has no trailing digits.
pub fn split_numbered(name: &str) -> Option<(&str, u32, usize)> {
    let digits = name
        .bytes()
        .rev()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }

    let (prefix, number) = name.split_at(name.len() - digits);
    let n = number.parse().ok()?;
    Some((prefix, n, digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_id() {
        assert_eq!(padded_id("f_", 3, 2), "f_03");
        assert_eq!(padded_id("walk", 42, 5), "walk00042");
        // wider numbers are never truncated
        assert_eq!(padded_id("x", 1234, 2), "x1234");
        assert_eq!(padded_id("", 0, 0), "0");
    }

    #[test]
    fn test_split_numbered() {
        assert_eq!(split_numbered("walk_0007"), Some(("walk_", 7, 4)));
        assert_eq!(split_numbered("12"), Some(("", 12, 2)));
        assert_eq!(split_numbered("idle"), None);
    }
}
