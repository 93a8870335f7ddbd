// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Building blocks shared by the repair passes.
//!
//! The passes all reason about covers that temporarily hold redundant
//! members: some subset is inserted and the question is which of the
//! members it makes redundant can go. `min_cost_without_redundant` answers
//! how cheap the cover can get, `best_reduced_family` actually removes the
//! members, and `complete_family` regrows a cover after members were torn
//! out. Redundant sets up to `full_opt_border` members are searched
//! exhaustively, larger ones greedily through the selection.

use crate::{
    creation::{CandidateCreation, Creation},
    rating::Rating,
    selection::BestRatingSelection,
};
use fixedbitset::FixedBitSet;
use mantle_model::{family::Family, index::SubsetIndex};
use rand::Rng;

/// The strategies a repair pass works with.
#[derive(Debug, Clone, Copy)]
pub struct RepairContext<'a> {
    pub creation: &'a Creation,
    pub rating: &'a Rating,
    pub selection: &'a BestRatingSelection,
    pub full_opt_border: usize,
}

impl<'a> RepairContext<'a> {
    #[inline]
    pub fn new(
        creation: &'a Creation,
        rating: &'a Rating,
        selection: &'a BestRatingSelection,
        full_opt_border: usize,
    ) -> Self {
        Self {
            creation,
            rating,
            selection,
            full_opt_border,
        }
    }
}

/// Returns `true` if `subset` shares no element with any other entry of `others`.
fn is_disjoint_with_all(cover: &Family<'_>, subset: SubsetIndex, others: &[SubsetIndex]) -> bool {
    let problem = cover.problem();
    let bits = problem.subset(subset).bits();
    others
        .iter()
        .filter(|&&o| o != subset)
        .all(|&o| bits.is_disjoint(problem.subset(o).bits()))
}

/// Splits the unnecessary entries of `redundant` into the ones disjoint from
/// all other entries, which can be removed without affecting the rest, and
/// the ones whose removal has to be decided jointly. Necessary entries are
/// dropped.
fn partition_redundant(
    cover: &Family<'_>,
    redundant: &[SubsetIndex],
) -> (Vec<SubsetIndex>, Vec<SubsetIndex>) {
    let mut disjoint = Vec::new();
    let mut joint = Vec::new();
    for &s in redundant {
        if !cover.contains(s) || cover.is_necessary(s) {
            continue;
        }
        if is_disjoint_with_all(cover, s, redundant) {
            disjoint.push(s);
        } else {
            joint.push(s);
        }
    }
    (disjoint, joint)
}

/// Returns the lowest cost `cover` reaches by removing members of
/// `redundant` without losing coverage. `cover` is left unchanged.
pub fn min_cost_without_redundant<R>(
    cover: &mut Family<'_>,
    redundant: &[SubsetIndex],
    ctx: &RepairContext<'_>,
    rng: &mut R,
) -> f64
where
    R: Rng + ?Sized,
{
    if cover.unnecessary_count() == 0 {
        return cover.cost();
    }

    let (disjoint, mut joint) = partition_redundant(cover, redundant);
    for &s in &disjoint {
        cover.remove(s);
    }

    let min_cost = match joint.len() {
        0 => cover.cost(),
        1 => cover.cost() - cover.remove_cost(joint[0]),
        n if n > ctx.full_opt_border => {
            match ctx
                .selection
                .select_remove(&joint, cover, ctx.rating, rng)
            {
                Some(removed) => {
                    joint.retain(|&s| s != removed);
                    cover.remove(removed);
                    let cost = min_cost_without_redundant(cover, &joint, ctx, rng);
                    cover.insert(removed);
                    cost
                }
                None => cover.cost(),
            }
        }
        _ => {
            let mut min_cost = cover.cost();
            for k in 0..joint.len() {
                let removed = joint[k];
                cover.remove(removed);
                let cost = min_cost_without_redundant(cover, &joint[k + 1..], ctx, rng);
                min_cost = min_cost.min(cost);
                cover.insert(removed);
            }
            min_cost
        }
    };

    for &s in &disjoint {
        cover.insert(s);
    }
    min_cost
}

/// Removes members of `redundant` from `cover` until none of them can go
/// without making the cover more expensive than the best reachable cost.
pub fn best_reduced_family<R>(
    cover: &mut Family<'_>,
    redundant: &[SubsetIndex],
    ctx: &RepairContext<'_>,
    rng: &mut R,
) where
    R: Rng + ?Sized,
{
    let mut redundant = redundant.to_vec();
    loop {
        if cover.unnecessary_count() == 0 {
            return;
        }

        let (disjoint, joint) = partition_redundant(cover, &redundant);
        for &s in &disjoint {
            cover.remove(s);
        }

        let best = match joint.len() {
            0 => None,
            1 => Some(joint[0]),
            n if n > ctx.full_opt_border => {
                ctx.selection.select_remove(&joint, cover, ctx.rating, rng)
            }
            _ => {
                let mut min_cost = cover.cost();
                let mut best = None;
                for k in 0..joint.len() {
                    let removed = joint[k];
                    cover.remove(removed);
                    let cost = min_cost_without_redundant(cover, &joint[k + 1..], ctx, rng);
                    if cost < min_cost {
                        min_cost = cost;
                        best = Some(removed);
                    }
                    cover.insert(removed);
                }
                best
            }
        };

        let Some(best) = best else {
            return;
        };
        cover.remove(best);
        redundant = joint;
        redundant.retain(|&s| s != best);
    }
}

/// Regrows `cover` into a complete cover, never adding a subset of `excluded`
/// in the first step. After every addition all unnecessary members are
/// dropped again. Returns `false` if no subset covers the remaining elements.
pub fn complete_family<R>(
    cover: &mut Family<'_>,
    best: Option<&Family<'_>>,
    excluded: &[SubsetIndex],
    ctx: &RepairContext<'_>,
    rng: &mut R,
) -> bool
where
    R: Rng + ?Sized,
{
    let problem = cover.problem();
    let mut blocked = FixedBitSet::with_capacity(problem.len());
    for s in excluded {
        blocked.insert(s.get());
    }
    let mut pool: Vec<SubsetIndex> = problem
        .indices()
        .filter(|s| !blocked.contains(s.get()))
        .collect();
    let mut first = true;

    while cover.uncovered_count() > 0 {
        let candidates = ctx.creation.add_candidates(&pool, cover, best);
        if first {
            pool = problem.indices().collect();
            first = false;
        }

        let added = ctx.selection.select_add(&candidates, cover, ctx.rating, rng);
        if let Some(added) = added {
            cover.insert(added);
            pool.retain(|&s| s != added);
        }

        let dropped = cover.unnecessary_subsets();
        for &s in &dropped {
            cover.remove(s);
        }
        pool.extend_from_slice(&dropped);

        if added.is_none() && dropped.is_empty() && !candidates_left(cover, &pool) {
            return false;
        }
    }
    true
}

/// Removes unnecessary members one by one, in ascending index order, until
/// every member is necessary. Coverage is never lost.
pub fn strip_unnecessary(cover: &mut Family<'_>) {
    while cover.unnecessary_count() > 0 {
        let Some(s) = cover.members().find(|&s| !cover.is_necessary(s)) else {
            return;
        };
        cover.remove(s);
    }
}

#[inline]
fn candidates_left(cover: &Family<'_>, pool: &[SubsetIndex]) -> bool {
    pool.iter()
        .any(|&s| !cover.contains(s) && cover.alone_covered(s) > 0)
}
