//! String similarity for sage_core
//!
//! Ratcliff/Obershelp ratio used by the error corrector to rank candidate
//! commands, flags, and filenames. Scores are in [0, 1] where 1.0 means the
//! strings are identical.

use std::collections::HashMap;

/// Similarity ratio between two strings.
///
/// Recursively decomposes both strings around their longest matching block
/// and returns 2*M/T, where M is the total number of matched characters and
/// T the combined length. Two empty strings rate 1.0.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0;
    }
    let matches = match_count(&a_chars, &b_chars);
    2.0 * matches as f64 / total as f64
}

/// Characters covered by matching blocks, recursing on both sides of the
/// longest match.
fn match_count(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (ai, bi, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + match_count(&a[..ai], &b[..bi]) + match_count(&a[ai + len..], &b[bi + len..])
}

/// Longest contiguous matching block between `a` and `b` as
/// (start in a, start in b, length). Ties resolve to the block found
/// earliest while scanning `a`, then `b`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, &ac) in a.iter().enumerate() {
        let mut row: HashMap<usize, usize> = HashMap::new();
        for (j, &bc) in b.iter().enumerate() {
            if ac == bc {
                let k = if j > 0 {
                    j2len.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                row.insert(j, k);
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        j2len = row;
    }

    best
}
