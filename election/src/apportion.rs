//! Seat apportionment and the seeded ordering of elected validators.
//!
//! Seats are handed out one at a time with the highest-averages (D'Hondt)
//! method: the next seat goes to the group with the largest
//! `votes / (seats_so_far + 1)` that still has unelected members. Ties go to
//! the group ranked first. Everything here is a pure function of its inputs.

use crate::error::ElectionError;
use std::cmp::Ordering;
use valelect_crypto::next_seed;
use valelect_types::{cmp_ratios, Address, Seed};

/// A group taking part in an election.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub group: Address,
    pub votes: u128,
    /// Members in election priority order.
    pub members: Vec<Address>,
}

/// Seats won by each candidate, in candidate order. At most `seats` are assigned.
pub fn apportion_seats(candidates: &[Candidate], seats: usize) -> Vec<usize> {
    let mut won = vec![0usize; candidates.len()];
    for _ in 0..seats {
        let mut best: Option<usize> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.votes == 0 || won[i] >= candidate.members.len() {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => {
                    cmp_ratios(
                        candidate.votes,
                        won[i] as u128 + 1,
                        candidates[b].votes,
                        won[b] as u128 + 1,
                    ) == Ordering::Greater
                }
            };
            if better {
                best = Some(i);
            }
        }
        match best {
            Some(i) => won[i] += 1,
            None => break,
        }
    }
    won
}

/// Elect between `min` and `max` validators from ranked candidates and order
/// them with `seed`.
pub fn elect(
    candidates: &[Candidate],
    min: usize,
    max: usize,
    seed: Seed,
) -> Result<Vec<Address>, ElectionError> {
    let seats = apportion_seats(candidates, max);
    let mut elected: Vec<Address> = candidates
        .iter()
        .zip(&seats)
        .flat_map(|(candidate, &n)| candidate.members.iter().take(n).copied())
        .collect();
    if elected.len() < min {
        return Err(ElectionError::InsufficientElectableValidators {
            elected: elected.len(),
            minimum: min,
        });
    }
    shuffle(&mut elected, seed);
    Ok(elected)
}

/// Fisher–Yates shuffle. The seed is rehashed after every swap.
pub fn shuffle(items: &mut [Address], seed: Seed) {
    let mut seed = seed;
    for i in (1..items.len()).rev() {
        let j = (seed.leading_u128() % (i as u128 + 1)) as usize;
        items.swap(i, j);
        seed = next_seed(&seed);
    }
}
