//! Blind-box items
//!
//! Every blind box hides one [`ItemType`]. Items are split into two pools:
//! strengthening items help the player who opened the box, weakening items
//! handicap them. Opponent acceleration and slip penalty sit in the weakening
//! pool even though they act on the other side.

pub mod blind_box;

use serde::{Deserialize, Serialize};

pub use blind_box::{BlindBox, ItemSystem, DEFAULT_STRENGTHENING_BIAS};

/// When an item's effect takes hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTiming {
    /// Resolves as soon as the box opens
    Instant,
    /// Applies at the next turn boundary
    Delayed,
    /// Stays active until consumed
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    ChaosStrike,
    PreciseStrike,
    AcceleratedMove,
    StrategyGuide,
    ToughenHeart,
    SelfMistake,
    OpponentAcceleration,
    SlipPenalty,
}

/// Static item metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub timing: EffectTiming,
    pub strengthening: bool,
    pub icon: &'static str,
}

impl ItemType {
    pub const ALL: [ItemType; 8] = [
        ItemType::ChaosStrike,
        ItemType::PreciseStrike,
        ItemType::AcceleratedMove,
        ItemType::StrategyGuide,
        ItemType::ToughenHeart,
        ItemType::SelfMistake,
        ItemType::OpponentAcceleration,
        ItemType::SlipPenalty,
    ];

    pub const STRENGTHENING: [ItemType; 5] = [
        ItemType::ChaosStrike,
        ItemType::PreciseStrike,
        ItemType::AcceleratedMove,
        ItemType::StrategyGuide,
        ItemType::ToughenHeart,
    ];

    pub const WEAKENING: [ItemType; 3] = [
        ItemType::SelfMistake,
        ItemType::OpponentAcceleration,
        ItemType::SlipPenalty,
    ];

    /// Catalog entry for this item
    pub const fn info(self) -> &'static ItemInfo {
        match self {
            ItemType::ChaosStrike => &CHAOS_STRIKE,
            ItemType::PreciseStrike => &PRECISE_STRIKE,
            ItemType::AcceleratedMove => &ACCELERATED_MOVE,
            ItemType::StrategyGuide => &STRATEGY_GUIDE,
            ItemType::ToughenHeart => &TOUGHEN_HEART,
            ItemType::SelfMistake => &SELF_MISTAKE,
            ItemType::OpponentAcceleration => &OPPONENT_ACCELERATION,
            ItemType::SlipPenalty => &SLIP_PENALTY,
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.info().name
    }

    #[inline]
    pub fn is_strengthening(self) -> bool {
        self.info().strengthening
    }

    /// Attacks that remove a stone and can be absorbed by Toughen Heart
    #[inline]
    pub fn is_removal_attack(self) -> bool {
        matches!(
            self,
            ItemType::ChaosStrike | ItemType::PreciseStrike | ItemType::SelfMistake
        )
    }
}

const CHAOS_STRIKE: ItemInfo = ItemInfo {
    name: "Chaos Strike",
    description: "Remove one random opponent stone",
    timing: EffectTiming::Instant,
    strengthening: true,
    icon: "💥",
};

const PRECISE_STRIKE: ItemInfo = ItemInfo {
    name: "Precise Strike",
    description: "Choose one opponent stone to remove",
    timing: EffectTiming::Instant,
    strengthening: true,
    icon: "🎯",
};

const ACCELERATED_MOVE: ItemInfo = ItemInfo {
    name: "Accelerated Move",
    description: "Place one extra stone right away",
    timing: EffectTiming::Instant,
    strengthening: true,
    icon: "⚡",
};

const STRATEGY_GUIDE: ItemInfo = ItemInfo {
    name: "Strategy Guide",
    description: "Gain an extra move and see the three best spots",
    timing: EffectTiming::Instant,
    strengthening: true,
    icon: "📖",
};

const TOUGHEN_HEART: ItemInfo = ItemInfo {
    name: "Toughen Heart",
    description: "Block the next attack that would remove your stone",
    timing: EffectTiming::Continuous,
    strengthening: true,
    icon: "🛡",
};

const SELF_MISTAKE: ItemInfo = ItemInfo {
    name: "Self Mistake",
    description: "One of your own stones is removed",
    timing: EffectTiming::Instant,
    strengthening: false,
    icon: "💔",
};

const OPPONENT_ACCELERATION: ItemInfo = ItemInfo {
    name: "Opponent Acceleration",
    description: "Your opponent gets an extra move on their next turn",
    timing: EffectTiming::Delayed,
    strengthening: false,
    icon: "🏃",
};

const SLIP_PENALTY: ItemInfo = ItemInfo {
    name: "Slip Penalty",
    description: "Your opponent may only play one of three random cells next turn",
    timing: EffectTiming::Delayed,
    strengthening: false,
    icon: "🍌",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_partition_catalog() {
        for item in ItemType::ALL {
            let in_strong = ItemType::STRENGTHENING.contains(&item);
            let in_weak = ItemType::WEAKENING.contains(&item);
            assert!(in_strong ^ in_weak, "{:?} must be in exactly one pool", item);
            assert_eq!(item.is_strengthening(), in_strong);
        }
    }

    #[test]
    fn test_removal_attacks() {
        let attacks: Vec<ItemType> = ItemType::ALL
            .into_iter()
            .filter(|i| i.is_removal_attack())
            .collect();
        assert_eq!(
            attacks,
            vec![ItemType::ChaosStrike, ItemType::PreciseStrike, ItemType::SelfMistake]
        );
    }

    #[test]
    fn test_timing_classes() {
        assert_eq!(ItemType::ToughenHeart.info().timing, EffectTiming::Continuous);
        assert_eq!(ItemType::SlipPenalty.info().timing, EffectTiming::Delayed);
        assert_eq!(ItemType::OpponentAcceleration.info().timing, EffectTiming::Delayed);
        assert_eq!(ItemType::ChaosStrike.info().timing, EffectTiming::Instant);
    }
}
