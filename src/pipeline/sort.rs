//! Depth ordering
//!
//! Builds the draw order: opaque faces first in the configured order, then
//! translucent faces back to front so each one blends over what is behind
//! it. The per-pixel depth buffer stays authoritative; the order only
//! matters for blending and when the depth test is off.
//!
//! Both sorts are stable, so faces at equal depth keep submission order
//! from frame to frame.

use serde::{Deserialize, Serialize};

use super::{CoordSpace, RenderList};
use crate::error::RenderResult;
use crate::math::EPSILON;

/// Order of opaque faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortPolicy {
    /// Submission order
    None,
    /// Painter's algorithm: farthest first
    #[default]
    BackToFront,
    /// Nearest first, so the depth test rejects more pixels early
    FrontToBack,
}

/// Fill `list.order` with the active faces in drawing order.
///
/// With `buckets > 0` faces are ordered by a counting sort over that many
/// depth buckets spanning the frame's depth range; otherwise by a
/// comparison sort on mean depth.
pub fn sort_faces(list: &mut RenderList, policy: SortPolicy, buckets: usize) -> RenderResult<()> {
    list.require("sort_faces", CoordSpace::Screen)?;

    let mut order = std::mem::take(&mut list.order);
    let mut counts = std::mem::take(&mut list.sort_counts);
    let mut tmp = std::mem::take(&mut list.sort_tmp);

    order.clear();
    order.extend((0..list.faces.len()).filter(|&i| list.faces[i].active && !list.faces[i].translucent));
    let split = order.len();
    order.extend((0..list.faces.len()).filter(|&i| list.faces[i].active && list.faces[i].translucent));

    {
        let depth = |i: usize| list.face_depth(&list.faces[i]);
        let (opaque, translucent) = order.split_at_mut(split);
        let mut sort = |items: &mut [usize], far_first: bool| {
            if buckets > 0 {
                bucket_sort(items, &depth, buckets, far_first, &mut counts, &mut tmp);
            } else if far_first {
                items.sort_by(|&a, &b| depth(b).total_cmp(&depth(a)));
            } else {
                items.sort_by(|&a, &b| depth(a).total_cmp(&depth(b)));
            }
        };
        match policy {
            SortPolicy::None => {}
            SortPolicy::BackToFront => sort(opaque, true),
            SortPolicy::FrontToBack => sort(opaque, false),
        }
        sort(translucent, true);
    }

    list.order = order;
    list.sort_counts = counts;
    list.sort_tmp = tmp;
    Ok(())
}

/// Stable counting sort of face indices by quantized depth.
fn bucket_sort<F: Fn(usize) -> f32>(
    items: &mut [usize],
    depth: &F,
    buckets: usize,
    far_first: bool,
    counts: &mut Vec<usize>,
    tmp: &mut Vec<usize>,
) {
    if items.len() < 2 || buckets < 2 {
        return;
    }
    let (lo, hi) = items.iter().fold((f32::MAX, f32::MIN), |(lo, hi), &i| {
        let z = depth(i);
        (lo.min(z), hi.max(z))
    });
    let range = hi - lo;
    if !(range > EPSILON) {
        return;
    }
    let scale = (buckets - 1) as f32 / range;
    let bucket_of = |i: usize| {
        let b = (((depth(i) - lo) * scale) as usize).min(buckets - 1);
        if far_first {
            buckets - 1 - b
        } else {
            b
        }
    };

    counts.clear();
    counts.resize(buckets, 0);
    for &i in items.iter() {
        counts[bucket_of(i)] += 1;
    }
    let mut start = 0;
    for c in counts.iter_mut() {
        let n = *c;
        *c = start;
        start += n;
    }
    tmp.clear();
    tmp.resize(items.len(), 0);
    for &i in items.iter() {
        let b = bucket_of(i);
        tmp[counts[b]] = i;
        counts[b] += 1;
    }
    items.copy_from_slice(tmp);
}
