//! Track-to-track navigation over playlist order.
//!
//! `current` is the index of the playing track, or `None` when it is not in
//! the list any more; in that case every direction lands on the first track.

use rand::Rng;

/// Index after `current`, wrapping to the first track.
pub fn next_index(len: usize, current: Option<usize>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        Some(i) if i < len => Some((i + 1) % len),
        _ => Some(0),
    }
}

/// Index before `current`, wrapping to the last track.
pub fn prev_index(len: usize, current: Option<usize>) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        Some(0) => Some(len - 1),
        Some(i) if i < len => Some(i - 1),
        _ => Some(0),
    }
}

/// Random index other than `current` (when there is a choice).
pub fn shuffled_index<R: Rng + ?Sized>(
    len: usize,
    current: Option<usize>,
    rng: &mut R,
) -> Option<usize> {
    match (len, current) {
        (0, _) => None,
        (1, _) => Some(0),
        (_, Some(cur)) if cur < len => {
            // Draw from len - 1 slots and skip over the current one.
            let pick = rng.random_range(0..len - 1);
            Some(if pick >= cur { pick + 1 } else { pick })
        }
        _ => Some(rng.random_range(0..len)),
    }
}
