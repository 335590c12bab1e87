//! Travel flags, travel types, and area classification constants.
//!
//! [`TravelFlags`] is the capability mask a caller composes for a query.
//! Every reachability carries a raw travel type which maps to exactly one
//! travel flag (plus optional team-exclusion bits) through
//! [`travel_flag_for_type`]; an edge is usable only if that flag is in the
//! query mask.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Bit set of allowed movement capabilities and terrain types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TravelFlags(u32);

impl TravelFlags {
    /// Travelling temporarily not possible.
    pub const INVALID: Self = Self(0x0000_0001);
    /// Walking.
    pub const WALK: Self = Self(0x0000_0002);
    /// Crouching.
    pub const CROUCH: Self = Self(0x0000_0004);
    /// Jumping onto a barrier.
    pub const BARRIER_JUMP: Self = Self(0x0000_0008);
    /// Jumping.
    pub const JUMP: Self = Self(0x0000_0010);
    /// Climbing a ladder.
    pub const LADDER: Self = Self(0x0000_0020);
    /// Walking off a ledge.
    pub const WALK_OFF_LEDGE: Self = Self(0x0000_0080);
    /// Swimming.
    pub const SWIM: Self = Self(0x0000_0100);
    /// Jumping out of the water.
    pub const WATER_JUMP: Self = Self(0x0000_0200);
    /// Teleporting.
    pub const TELEPORT: Self = Self(0x0000_0400);
    /// Riding an elevator.
    pub const ELEVATOR: Self = Self(0x0000_0800);
    /// Rocket jumping.
    pub const ROCKET_JUMP: Self = Self(0x0000_1000);
    /// BFG jumping.
    pub const BFG_JUMP: Self = Self(0x0000_2000);
    /// Grappling hook.
    pub const GRAPPLE_HOOK: Self = Self(0x0000_4000);
    /// Double jump.
    pub const DOUBLE_JUMP: Self = Self(0x0000_8000);
    /// Ramp jump.
    pub const RAMP_JUMP: Self = Self(0x0001_0000);
    /// Strafe jump.
    pub const STRAFE_JUMP: Self = Self(0x0002_0000);
    /// Jump pad.
    pub const JUMP_PAD: Self = Self(0x0004_0000);
    /// Travel through air.
    pub const AIR: Self = Self(0x0008_0000);
    /// Travel through water.
    pub const WATER: Self = Self(0x0010_0000);
    /// Travel through slime.
    pub const SLIME: Self = Self(0x0020_0000);
    /// Travel through lava.
    pub const LAVA: Self = Self(0x0040_0000);
    /// Travel through a do-not-enter area.
    pub const DO_NOT_ENTER: Self = Self(0x0080_0000);
    /// Riding a bobbing platform.
    pub const FUNC_BOB: Self = Self(0x0100_0000);
    /// Flight.
    pub const FLIGHT: Self = Self(0x0200_0000);
    /// Move over a bridge.
    pub const BRIDGE: Self = Self(0x0400_0000);
    /// Not usable by team 1.
    pub const NOT_TEAM1: Self = Self(0x0800_0000);
    /// Not usable by team 2.
    pub const NOT_TEAM2: Self = Self(0x1000_0000);

    /// The capability set of an ordinary ground agent.
    pub const DEFAULT: Self = Self(
        Self::WALK.0
            | Self::CROUCH.0
            | Self::BARRIER_JUMP.0
            | Self::JUMP.0
            | Self::LADDER.0
            | Self::WALK_OFF_LEDGE.0
            | Self::SWIM.0
            | Self::WATER_JUMP.0
            | Self::TELEPORT.0
            | Self::ELEVATOR.0
            | Self::AIR.0
            | Self::WATER.0
            | Self::JUMP_PAD.0
            | Self::FUNC_BOB.0,
    );

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share any flag.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for TravelFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TravelFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for TravelFlags {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for TravelFlags {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for TravelFlags {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Display for TravelFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Number of slots in the travel-type lookup table.
pub const MAX_TRAVEL_TYPES: usize = 32;

/// Mask selecting the travel type id from a raw reachability travel type.
pub const TRAVEL_TYPE_MASK: u32 = 0x00FF_FFFF;
/// Raw travel type bit: the reachability is not usable by team 1.
pub const TRAVEL_FLAG_NOT_TEAM1: u32 = 1 << 24;
/// Raw travel type bit: the reachability is not usable by team 2.
pub const TRAVEL_FLAG_NOT_TEAM2: u32 = 2 << 24;

/// Movement required to traverse a reachability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TravelType {
    /// Temporarily not possible.
    Invalid = 1,
    /// Walking.
    Walk = 2,
    /// Crouching.
    Crouch = 3,
    /// Jumping onto a barrier.
    BarrierJump = 4,
    /// Jumping.
    Jump = 5,
    /// Climbing a ladder.
    Ladder = 6,
    /// Walking off a ledge.
    WalkOffLedge = 7,
    /// Swimming.
    Swim = 8,
    /// Jumping out of the water.
    WaterJump = 9,
    /// Teleportation.
    Teleport = 10,
    /// Elevator ride.
    Elevator = 11,
    /// Rocket jump.
    RocketJump = 12,
    /// BFG jump.
    BfgJump = 13,
    /// Grappling hook.
    GrappleHook = 14,
    /// Double jump.
    DoubleJump = 15,
    /// Ramp jump.
    RampJump = 16,
    /// Strafe jump.
    StrafeJump = 17,
    /// Jump pad.
    JumpPad = 18,
    /// Bobbing platform.
    FuncBob = 19,
}

impl TravelType {
    const ALL: [Self; 19] = [
        Self::Invalid,
        Self::Walk,
        Self::Crouch,
        Self::BarrierJump,
        Self::Jump,
        Self::Ladder,
        Self::WalkOffLedge,
        Self::Swim,
        Self::WaterJump,
        Self::Teleport,
        Self::Elevator,
        Self::RocketJump,
        Self::BfgJump,
        Self::GrappleHook,
        Self::DoubleJump,
        Self::RampJump,
        Self::StrafeJump,
        Self::JumpPad,
        Self::FuncBob,
    ];

    /// Decode the type id of a raw reachability travel type, ignoring team bits.
    pub fn from_raw(raw: u32) -> Option<Self> {
        let id = raw & TRAVEL_TYPE_MASK;
        Self::ALL.iter().copied().find(|t| *t as u32 == id)
    }

    /// Raw travel type value without team bits.
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// The travel flag a query must allow to use this kind of edge.
    pub const fn flag(self) -> TravelFlags {
        match self {
            Self::Invalid => TravelFlags::INVALID,
            Self::Walk => TravelFlags::WALK,
            Self::Crouch => TravelFlags::CROUCH,
            Self::BarrierJump => TravelFlags::BARRIER_JUMP,
            Self::Jump => TravelFlags::JUMP,
            Self::Ladder => TravelFlags::LADDER,
            Self::WalkOffLedge => TravelFlags::WALK_OFF_LEDGE,
            Self::Swim => TravelFlags::SWIM,
            Self::WaterJump => TravelFlags::WATER_JUMP,
            Self::Teleport => TravelFlags::TELEPORT,
            Self::Elevator => TravelFlags::ELEVATOR,
            Self::RocketJump => TravelFlags::ROCKET_JUMP,
            Self::BfgJump => TravelFlags::BFG_JUMP,
            Self::GrappleHook => TravelFlags::GRAPPLE_HOOK,
            Self::DoubleJump => TravelFlags::DOUBLE_JUMP,
            Self::RampJump => TravelFlags::RAMP_JUMP,
            Self::StrafeJump => TravelFlags::STRAFE_JUMP,
            Self::JumpPad => TravelFlags::JUMP_PAD,
            Self::FuncBob => TravelFlags::FUNC_BOB,
        }
    }
}

/// Build the per-type flag lookup table indexed by travel type id.
///
/// Slots without a known travel type map to [`TravelFlags::INVALID`].
pub fn travel_flag_table() -> [TravelFlags; MAX_TRAVEL_TYPES] {
    let mut table = [TravelFlags::INVALID; MAX_TRAVEL_TYPES];
    for t in TravelType::ALL {
        table[t as usize] = t.flag();
    }
    table
}

/// Map a raw reachability travel type (type id plus team bits) to flags.
pub fn travel_flag_for_type(table: &[TravelFlags; MAX_TRAVEL_TYPES], raw: u32) -> TravelFlags {
    let mut flags = TravelFlags::empty();
    if raw & TRAVEL_FLAG_NOT_TEAM1 != 0 {
        flags |= TravelFlags::NOT_TEAM1;
    }
    if raw & TRAVEL_FLAG_NOT_TEAM2 != 0 {
        flags |= TravelFlags::NOT_TEAM2;
    }
    let id = (raw & TRAVEL_TYPE_MASK) as usize;
    if id >= MAX_TRAVEL_TYPES {
        return TravelFlags::INVALID;
    }
    flags | table[id]
}

/// Area contents bits (`AreaSettings::contents`).
pub mod area_contents {
    /// Water volume.
    pub const WATER: u32 = 1;
    /// Lava volume.
    pub const LAVA: u32 = 2;
    /// Slime volume.
    pub const SLIME: u32 = 4;
    /// Cluster portal.
    pub const CLUSTER_PORTAL: u32 = 8;
    /// Teleporter destination portal.
    pub const TELEPORTAL: u32 = 16;
    /// Route portal.
    pub const ROUTE_PORTAL: u32 = 32;
    /// Teleporter trigger.
    pub const TELEPORTER: u32 = 64;
    /// Jump pad trigger.
    pub const JUMP_PAD: u32 = 128;
    /// Agents should not enter this area.
    pub const DO_NOT_ENTER: u32 = 256;
    /// View portal.
    pub const VIEW_PORTAL: u32 = 512;
    /// Contains a mover.
    pub const MOVER: u32 = 1024;
    /// Not usable by team 1.
    pub const NOT_TEAM1: u32 = 2048;
    /// Not usable by team 2.
    pub const NOT_TEAM2: u32 = 4096;
}

/// Area flag bits (`AreaSettings::area_flags`).
pub mod area_flags {
    /// An agent can stand on the ground.
    pub const GROUNDED: u32 = 1;
    /// Contains ladder faces.
    pub const LADDER: u32 = 2;
    /// Contains a liquid.
    pub const LIQUID: u32 = 4;
    /// Permanently disabled for routing.
    pub const DISABLED: u32 = 8;
    /// On top of a bridge.
    pub const BRIDGE: u32 = 16;
}

/// Presence type bits (`AreaSettings::presence_type`).
pub mod presence {
    /// No presence.
    pub const NONE: u32 = 1;
    /// Standing.
    pub const NORMAL: u32 = 2;
    /// Crouching.
    pub const CROUCH: u32 = 4;
}
