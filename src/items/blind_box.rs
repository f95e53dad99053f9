//! Blind boxes and random item generation

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ItemType;
use crate::board::Pos;

/// Default chance that a generated item comes from the strengthening pool
pub const DEFAULT_STRENGTHENING_BIAS: f64 = 0.5;

/// A face-down item marker on the board.
///
/// The item is bound when the box is created, not when it opens. Opened
/// boxes stay in the game's list; only `opened` changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindBox {
    pub pos: Pos,
    pub item: ItemType,
    pub opened: bool,
    /// Creation order key
    pub created_at: u64,
}

/// Random item and blind-box factory. Holds no state; every draw comes from
/// the caller's RNG.
pub struct ItemSystem;

impl ItemSystem {
    /// Draw an item type. With probability `strengthening_bias` the item comes
    /// from the strengthening pool, otherwise from the weakening pool; each
    /// pool is sampled uniformly.
    pub fn generate_random_item_type<R: Rng + ?Sized>(rng: &mut R, strengthening_bias: f64) -> ItemType {
        let bias = strengthening_bias.clamp(0.0, 1.0);
        let pool: &[ItemType] = if rng.gen::<f64>() < bias {
            &ItemType::STRENGTHENING
        } else {
            &ItemType::WEAKENING
        };
        pool[rng.gen_range(0..pool.len())]
    }

    /// Create an unopened box on one uniformly chosen cell of
    /// `available_positions`, which the caller restricts to empty cells
    /// without an unopened box. `None` when no position is available.
    pub fn generate_blind_box<R: Rng + ?Sized>(
        rng: &mut R,
        available_positions: &[Pos],
        created_at: u64,
    ) -> Option<BlindBox> {
        let pos = *available_positions.choose(rng)?;
        let item = Self::generate_random_item_type(rng, DEFAULT_STRENGTHENING_BIAS);
        Some(BlindBox {
            pos,
            item,
            opened: false,
            created_at,
        })
    }
}
