use serde::{Deserialize, Serialize};

/// XP needed for each level.
pub const XP_PER_LEVEL: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Starts at 1.
    pub level: u64,
    pub xp_in_level: u64,
    pub xp_per_level: u64,
}

pub fn level_info(xp: u64) -> LevelInfo {
    LevelInfo {
        level: xp / XP_PER_LEVEL + 1,
        xp_in_level: xp % XP_PER_LEVEL,
        xp_per_level: XP_PER_LEVEL,
    }
}
