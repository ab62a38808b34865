//! The ground-truth loader collaborator (§6): "numRows, numCols,
//! numTimeSlots, valuesByTimeSlot, timeSlotOfExample, indicesByTimeSlot".

use crate::error::{Result, RuleInductionError};

/// Ground truth and time-slot structure, independent of any feature data.
pub trait LabelMatrix: Send + Sync {
    /// `N`: total number of training examples.
    fn num_rows(&self) -> usize;
    /// `T`: total number of time slots.
    fn num_time_slots(&self) -> usize;
    /// The ground-truth count for each time slot, length `num_time_slots()`.
    fn ground_truth(&self) -> &[u32];
    /// The zero-based time-slot index example `i` belongs to.
    fn time_slot_of(&self, example: usize) -> usize;
    /// The `[start, end)` example-index range of time slot `t`.
    fn slot_range(&self, slot: usize) -> (usize, usize);
}

/// The crate's own in-memory [`LabelMatrix`], built directly from a
/// ground-truth count per time slot and an example-to-slot mapping.
///
/// Mirrors this corpus's convention of shipping one concrete, no-dependency
/// implementation of each external collaborator interface (see e.g.
/// `storage::history::HistoryStorage` as the concrete backing for a trait
/// elsewhere in this codebase) so the induction core is callable without an
/// embedding application writing its own loader first.
#[derive(Debug, Clone)]
pub struct InMemoryLabelMatrix {
    ground_truth: Vec<u32>,
    example_slot: Vec<usize>,
    slot_ranges: Vec<(usize, usize)>,
}

impl InMemoryLabelMatrix {
    /// Build from a per-slot ground-truth count vector and a per-example
    /// slot assignment. Validates that `example_slot` is sorted by slot
    /// (input is assumed sorted by time marker, §3) and that every slot in
    /// `[0, ground_truth.len())` is non-empty and contiguous.
    pub fn new(ground_truth: Vec<u32>, example_slot: Vec<usize>) -> Result<Self> {
        if ground_truth.is_empty() || example_slot.is_empty() {
            return Err(RuleInductionError::EmptyLabelMatrix);
        }
        let num_slots = ground_truth.len();
        let mut slot_ranges = vec![(0_usize, 0_usize); num_slots];
        let mut prev_slot: Option<usize> = None;
        let mut start = 0;
        for (i, &slot) in example_slot.iter().enumerate() {
            if slot >= num_slots {
                return Err(RuleInductionError::InvalidConfig {
                    reason: format!(
                        "example {i} assigned to slot {slot}, but ground_truth has only {num_slots} slots"
                    ),
                });
            }
            match prev_slot {
                Some(p) if p == slot => {}
                Some(p) if slot == p + 1 => {
                    slot_ranges[p] = (start, i);
                    start = i;
                }
                None => {}
                Some(p) => {
                    return Err(RuleInductionError::InvalidConfig {
                        reason: format!(
                            "example_slot is not sorted/contiguous: example {i} jumps from slot {p} to {slot}"
                        ),
                    });
                }
            }
            prev_slot = Some(slot);
        }
        if let Some(last_slot) = prev_slot {
            slot_ranges[last_slot] = (start, example_slot.len());
        }
        if slot_ranges.iter().any(|&(s, e)| s == e) {
            return Err(RuleInductionError::InvalidConfig {
                reason: "every time slot must contain at least one example".to_string(),
            });
        }
        Ok(Self {
            ground_truth,
            example_slot,
            slot_ranges,
        })
    }
}

impl LabelMatrix for InMemoryLabelMatrix {
    fn num_rows(&self) -> usize {
        self.example_slot.len()
    }

    fn num_time_slots(&self) -> usize {
        self.ground_truth.len()
    }

    fn ground_truth(&self) -> &[u32] {
        &self.ground_truth
    }

    fn time_slot_of(&self, example: usize) -> usize {
        self.example_slot[example]
    }

    fn slot_range(&self, slot: usize) -> (usize, usize) {
        self.slot_ranges[slot]
    }
}
