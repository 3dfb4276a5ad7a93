//! Algorithms for uniform random sampling without replacement. These are written to be generic
//! over the container type; the population pools handed to them are plain ranges or vectors of
//! `PersonId`s.

use rand::seq::index::sample as choose_range;
use rand::Rng;

use crate::error::EpiError;

/// Chooses `requested` distinct positions in `0..len`, in increasing order.
fn choose_sorted_indexes<R: Rng>(
    rng: &mut R,
    len: usize,
    requested: usize,
) -> Result<Vec<usize>, EpiError> {
    if requested > len {
        return Err(EpiError::CapacityError {
            requested,
            available: len,
        });
    }
    let mut indexes = Vec::with_capacity(requested);
    indexes.extend(choose_range(rng, len, requested));
    indexes.sort_unstable();
    Ok(indexes)
}

/// Sample multiple random elements uniformly without replacement from a container of known
/// length.
///
/// We do not assume the container is randomly indexable, only that it can be iterated over.
/// Selected items are returned in iteration order.
///
/// # Errors
///
/// `EpiError::CapacityError` when `requested` exceeds the length of `iter`. The request is
/// never silently truncated.
pub fn sample_multiple_from_known_length<I, R, T>(
    rng: &mut R,
    iter: I,
    requested: usize,
) -> Result<Vec<T>, EpiError>
where
    R: Rng,
    I: IntoIterator<Item = T> + ExactSizeIterator<Item = T>,
{
    let indexes = choose_sorted_indexes(rng, iter.len(), requested)?;
    let mut index_iterator = indexes.into_iter();
    let Some(mut next_idx) = index_iterator.next() else {
        return Ok(Vec::new());
    };
    let mut selected = Vec::with_capacity(requested);

    for (idx, item) in iter.enumerate() {
        if idx == next_idx {
            selected.push(item);
            if let Some(i) = index_iterator.next() {
                next_idx = i;
            } else {
                break;
            }
        }
    }

    Ok(selected)
}

/// Like `sample_multiple_from_known_length`, but consumes the pool and also hands back the
/// elements that were not selected, as `(selected, rest)`. Both halves keep pool order.
///
/// # Errors
///
/// `EpiError::CapacityError` when `requested > pool.len()`.
pub fn sample_and_split<R: Rng, T>(
    rng: &mut R,
    pool: Vec<T>,
    requested: usize,
) -> Result<(Vec<T>, Vec<T>), EpiError> {
    let indexes = choose_sorted_indexes(rng, pool.len(), requested)?;
    let mut selected = Vec::with_capacity(requested);
    let mut rest = Vec::with_capacity(pool.len() - requested);
    let mut index_iterator = indexes.into_iter().peekable();

    for (idx, item) in pool.into_iter().enumerate() {
        if index_iterator.next_if_eq(&idx).is_some() {
            selected.push(item);
        } else {
            rest.push(item);
        }
    }

    Ok((selected, rest))
}
