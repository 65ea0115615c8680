//! Hint label generation.
//!
//! Labels are drawn from a fixed typing-friendly alphabet. A batch is
//! allocated as the leaves of a B-ary expansion: it starts as the B
//! single characters, and whenever more labels are needed the shortest
//! assigned label is withdrawn and replaced by its B one-character
//! extensions. A label leaves the batch the moment it grows children,
//! so no emitted label is ever a prefix of another. That matters
//! because the dispatcher matches typed input against labels by prefix;
//! a prefix collision would make a single keystroke simultaneously a
//! complete selection and an ambiguous partial one.
//!
//! Expansion always takes the current shortest label, so batches come
//! out in non-decreasing length order, and any batch of at most B
//! candidates gets single-character labels only.

use std::collections::VecDeque;

/// Label alphabet, home row first. Order matters: earlier characters are
/// assigned to earlier candidates.
pub const ALPHABET: &[char] = &[
    'a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', // home row
    'q', 'w', 'e', 'r', 't', 'y', 'u', 'i', // top row
];

/// Longest label the generator will produce.
///
/// Three characters over a 17-character alphabet covers 4913 candidates;
/// pages with more visible clickables than that leave the excess
/// unlabeled for the session.
pub const MAX_LABEL_LEN: usize = 3;

/// Whether `c` can ever appear in a generated label.
#[must_use]
pub fn in_alphabet(c: char) -> bool {
    ALPHABET.contains(&c)
}

/// Number of distinct labels representable within [`MAX_LABEL_LEN`].
///
/// A prefix-free batch is largest when every label sits at the maximum
/// length, one per leaf of the full B-ary tree.
#[must_use]
pub fn capacity() -> usize {
    ALPHABET.len().pow(MAX_LABEL_LEN as u32)
}

/// Generate labels for `n` candidates, in assignment order.
///
/// Returns `min(n, capacity())` labels; when `n` exceeds capacity the
/// caller is expected to surface the shortfall as a diagnostic and leave
/// the excess candidates unlabeled.
#[must_use]
pub fn generate(n: usize) -> Vec<String> {
    let wanted = n.min(capacity());
    let mut labels: VecDeque<String> = ALPHABET.iter().map(|c| c.to_string()).collect();

    while labels.len() < wanted {
        // The front is a shortest label; withdraw it and emit its
        // extensions instead.
        let Some(parent) = labels.pop_front() else {
            break;
        };
        if parent.len() >= MAX_LABEL_LEN {
            labels.push_front(parent);
            break;
        }
        for c in ALPHABET {
            let mut child = parent.clone();
            child.push(*c);
            labels.push_back(child);
        }
    }

    labels.into_iter().take(wanted).collect()
}
