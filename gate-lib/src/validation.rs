/// true if the given string has no control or whitespace characters and is
/// at most `max_chars` long when a max is given
pub fn check_control_whitespace<G>(
    given: G,
    max_chars: Option<usize>
) -> bool
where
    G: AsRef<str>
{
    let mut char_count = 0;

    for ch in given.as_ref().chars() {
        if ch.is_control() || ch.is_whitespace() {
            return false;
        }

        char_count += 1;

        if let Some(max) = max_chars {
            if char_count > max {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn check_control_whitespace_whitespace_chars() {
        let leading = String::from(" test");
        let trailing = String::from("test ");
        let contains = String::from("test test");

        assert!(!check_control_whitespace(leading, None), "leading whitespace characters");
        assert!(!check_control_whitespace(trailing, None), "trailing whitespace characters");
        assert!(!check_control_whitespace(contains, None), "contains whitespace characters");
    }

    #[test]
    pub fn check_control_whitespace_control_chars() {
        let trailing = String::from("test\u{0000}");
        let contains = String::from("test\u{0007}test");

        assert!(!check_control_whitespace(trailing, None), "trailing control characters");
        assert!(!check_control_whitespace(contains, None), "contains control characters");
    }

    #[test]
    pub fn check_control_whitespace_max_length() {
        assert!(check_control_whitespace("abcd", Some(4)));
        assert!(!check_control_whitespace("abcde", Some(4)));
    }
}
