//! Wildcard name matching.
//!
//! `*` matches any run of characters, including none. Every other character
//! is literal, and the whole candidate must be consumed.

/// Returns true if `candidate` matches `pattern` over its full length.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();
    match_from(&pattern, &candidate)
}

// Recursion depth is bounded by pattern length plus candidate length.
fn match_from(pattern: &[char], candidate: &[char]) -> bool {
    match pattern.split_first() {
        None => candidate.is_empty(),
        Some(('*', rest)) => {
            // Runs of '*' behave as one.
            let rest = trim_stars(rest);
            if rest.is_empty() {
                return true;
            }
            (0..=candidate.len()).any(|skip| match_from(rest, &candidate[skip..]))
        }
        Some((&literal, rest)) => match candidate.split_first() {
            Some((&c, remaining)) if c == literal => match_from(rest, remaining),
            _ => false,
        },
    }
}

fn trim_stars(pattern: &[char]) -> &[char] {
    let start = pattern.iter().take_while(|&&c| c == '*').count();
    &pattern[start..]
}
