//! The mutation guard for the migration binary. The decision itself is a
//! pure function over the operator's answer so it can be tested without a
//! terminal; the binary feeds it from stdin.

use std::io::{self, BufRead, Write};

/// Only an explicit "yes" (any casing, surrounding whitespace ignored)
/// authorizes a mutating run.
pub fn should_proceed(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

/// Prints the prompt and reads one line from the given input. End of input
/// counts as a decline.
pub fn confirm(prompt: &str, input: &mut impl BufRead) -> io::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }

    Ok(should_proceed(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_in_any_casing_proceeds() {
        assert!(should_proceed("yes"));
        assert!(should_proceed("YES"));
        assert!(should_proceed("  Yes \n"));
    }

    #[test]
    fn anything_else_declines() {
        assert!(!should_proceed("no"));
        assert!(!should_proceed("y"));
        assert!(!should_proceed(""));
        assert!(!should_proceed("yes please"));
    }

    #[test]
    fn confirm_reads_from_the_injected_input() {
        let mut input = "yes\n".as_bytes();
        assert!(confirm("proceed? ", &mut input).unwrap());

        let mut input = "no\n".as_bytes();
        assert!(!confirm("proceed? ", &mut input).unwrap());

        // An exhausted input (e.g. a closed stdin) declines.
        let mut input = "".as_bytes();
        assert!(!confirm("proceed? ", &mut input).unwrap());
    }
}
