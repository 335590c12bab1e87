//! Disabled-zone requests.

use aasroute_core::{AasWorld, Vec3};
use tracing::warn;

/// A set of areas to block until the next disabled-zone update.
#[derive(Clone, Debug, PartialEq)]
pub enum DisabledZoneRequest {
    /// Explicit area ids.
    Areas(Vec<usize>),
    /// Every area whose bounds intersect the box `[mins, maxs]`.
    Region {
        /// Lower corner.
        mins: Vec3,
        /// Upper corner.
        maxs: Vec3,
        /// If the region touches this area, the whole region is ignored.
        /// Keeps an agent from blocking the area it stands in.
        no_block_area: Option<usize>,
    },
}

impl DisabledZoneRequest {
    /// Append the areas this request blocks to `out`, never letting `out`
    /// grow past `world.num_areas()`. Ids outside `[1, num_areas)` are
    /// dropped with a warning.
    pub(crate) fn fill(&self, world: &dyn AasWorld, out: &mut Vec<usize>) {
        let num_areas = world.num_areas();
        let room = num_areas.saturating_sub(out.len());
        match self {
            Self::Areas(areas) => {
                for &area in areas.iter().take(room) {
                    if area == 0 || area >= num_areas {
                        warn!(area, num_areas, "disabled zone names an unknown area");
                        continue;
                    }
                    out.push(area);
                }
            }
            Self::Region {
                mins,
                maxs,
                no_block_area,
            } => {
                // The whole box is checked before the budget cuts it.
                let areas = world.bbox_areas(mins, maxs, num_areas);
                if no_block_area.is_some_and(|keep| areas.contains(&keep)) {
                    return;
                }
                out.extend(areas.into_iter().take(room));
            }
        }
    }
}
