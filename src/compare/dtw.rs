use serde::{Deserialize, Serialize};

use super::cents::cents_deviation;
use super::error::{CompareError, Result};
use super::series::PitchSeries;
use super::CompareConfig;

/// One step of the warp path: reference frame i is aligned with student
/// frame j. The full path is monotonic in both coordinates, starts at
/// (0, 0), and ends at the last frame of each series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub reference: usize,
    pub student: usize,
}

/// Local cost of matching reference frame i against student frame j.
///
/// Both voiced: absolute cents distance. Either side unvoiced: a fixed
/// finite penalty; large enough that the path avoids voiced↔unvoiced
/// matches when it can, small enough that the path stays feasible when a
/// track has long silent stretches.
fn local_cost(ref_hz: Option<f32>, student_hz: Option<f32>, unvoiced_penalty: f32) -> f64 {
    match (ref_hz, student_hz) {
        (Some(r), Some(s)) => cents_deviation(r, s).abs() as f64,
        _ => unvoiced_penalty as f64,
    }
}

/// Align the student series onto the reference series with dynamic time
/// warping, returning the forward warp path.
///
/// Classic full-matrix DTW:
///   D[0][0] = cost(0,0)
///   D[i][0] = D[i-1][0] + cost(i,0)        (and symmetrically for row 0)
///   D[i][j] = cost(i,j) + min(D[i-1][j-1], D[i-1][j], D[i][j-1])
///
/// The accumulated-cost matrix is one flat Vec<f64> indexed `i * m + j` -
/// no per-cell allocation, and the O(n·m) footprint is checked against
/// `config.max_dtw_cells` before anything is allocated.
///
/// Backtracking ties are broken in a fixed order (diagonal first, then
/// reference-advance, then student-advance), so the result is deterministic
/// and two identical series always produce the identity path.
pub fn align(
    reference: &PitchSeries,
    student: &PitchSeries,
    config: &CompareConfig,
) -> Result<Vec<AlignedPair>> {
    let n = reference.len();
    let m = student.len();

    // PitchSeries guarantees n, m >= 1, but align() may be called with
    // series built elsewhere in the crate; keep the contract explicit.
    if n == 0 || m == 0 {
        return Err(CompareError::InvalidInput(
            "cannot align an empty pitch series".into(),
        ));
    }

    let cells = n
        .checked_mul(m)
        .ok_or(CompareError::ResourceLimitExceeded {
            cells: usize::MAX,
            limit: config.max_dtw_cells,
        })?;
    if cells > config.max_dtw_cells {
        return Err(CompareError::ResourceLimitExceeded {
            cells,
            limit: config.max_dtw_cells,
        });
    }

    let penalty = config.unvoiced_penalty_cents;
    let cost = |i: usize, j: usize| {
        local_cost(reference.frequency(i), student.frequency(j), penalty)
    };

    // Accumulated cost matrix, row-major.
    let mut acc = vec![0.0f64; cells];
    acc[0] = cost(0, 0);

    for i in 1..n {
        acc[i * m] = acc[(i - 1) * m] + cost(i, 0);
    }
    for j in 1..m {
        acc[j] = acc[j - 1] + cost(0, j);
    }

    for i in 1..n {
        for j in 1..m {
            let diag = acc[(i - 1) * m + (j - 1)];
            let up = acc[(i - 1) * m + j];
            let left = acc[i * m + (j - 1)];
            acc[i * m + j] = cost(i, j) + diag.min(up).min(left);
        }
    }

    // Walk back from the far corner, re-deriving the predecessor at each
    // step. Tie-break: diagonal, then reference-advance (up), then
    // student-advance (left).
    let mut path = Vec::with_capacity(n.max(m));
    let mut i = n - 1;
    let mut j = m - 1;
    path.push(AlignedPair {
        reference: i,
        student: j,
    });

    while i > 0 || j > 0 {
        if i == 0 {
            j -= 1;
        } else if j == 0 {
            i -= 1;
        } else {
            let diag = acc[(i - 1) * m + (j - 1)];
            let up = acc[(i - 1) * m + j];
            let left = acc[i * m + (j - 1)];

            if diag <= up && diag <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        path.push(AlignedPair {
            reference: i,
            student: j,
        });
    }

    path.reverse();
    Ok(path)
}
