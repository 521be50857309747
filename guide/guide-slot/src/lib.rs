//! Osteotomy cut slots for surgical guides.
//!
//! Where a planned bone cut passes through the guide, the guide must leave
//! a slot for the saw. Link surfaces that bridge across the cut must stay
//! continuous, so they are turned into a protection volume that the cut
//! geometry is trimmed against before it is subtracted from the base.
//!
//! See [`CutSlotSubtractor`] for the rules.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod subtract;

pub use error::{SlotError, SlotResult};
pub use subtract::CutSlotSubtractor;
