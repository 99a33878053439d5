//! Service layer module.
//!
//! Contains the ID generation engine: the bit-layout codec, the per-domain
//! sequencers and the generator that owns them.

pub mod clock;
pub mod codec;
pub mod generator;
pub mod sequencer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use generator::Generator;
pub use sequencer::{Advance, Sequencer, SequencerState};
