//! Per-instance area status: temporary blocks and permanent area flags.
//!
//! Temporary blocks are double-buffered. A disabled-zone update first
//! shifts every area's current bit into the old bit, then marks the new
//! set, and finally diffs the two to find the areas whose routing caches
//! are stale.

use aasroute_core::{area_flags, AasWorld};

const CURRENT: u8 = 1;
const OLD: u8 = 2;

/// Blocked-area bookkeeping owned by one router instance.
#[derive(Clone, Debug)]
pub(crate) struct AreaStatus {
    temporary: Vec<u8>,
    area_flags: Vec<u32>,
}

impl AreaStatus {
    pub(crate) fn new(world: &dyn AasWorld) -> Self {
        Self {
            temporary: vec![0; world.num_areas()],
            area_flags: world.area_settings().iter().map(|s| s.area_flags).collect(),
        }
    }

    /// Blocked by the current disabled-zone set.
    pub(crate) fn temporarily_disabled(&self, area: usize) -> bool {
        self.temporary[area] & CURRENT != 0
    }

    /// Blocked either temporarily or by the `DISABLED` area flag.
    pub(crate) fn area_disabled(&self, area: usize) -> bool {
        self.temporarily_disabled(area) || self.area_flags[area] & area_flags::DISABLED != 0
    }

    /// Move the current set into the old set and clear the current set.
    pub(crate) fn begin_update(&mut self) {
        for status in &mut self.temporary {
            *status = (*status & CURRENT) << 1;
        }
    }

    pub(crate) fn disable(&mut self, area: usize) {
        self.temporary[area] |= CURRENT;
    }

    /// Append every area whose current bit differs from its old bit.
    pub(crate) fn changed_areas(&self, out: &mut Vec<usize>) {
        out.extend(
            self.temporary
                .iter()
                .enumerate()
                .filter(|&(_, &s)| (s & CURRENT != 0) != (s & OLD != 0))
                .map(|(area, _)| area),
        );
    }

    /// Set or clear the permanent `DISABLED` flag; returns whether the
    /// area was enabled before.
    pub(crate) fn set_enabled(&mut self, area: usize, enabled: bool) -> bool {
        let flags = &mut self.area_flags[area];
        let was_enabled = *flags & area_flags::DISABLED == 0;
        if enabled {
            *flags &= !area_flags::DISABLED;
        } else {
            *flags |= area_flags::DISABLED;
        }
        was_enabled
    }
}
