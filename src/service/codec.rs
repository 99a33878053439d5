//! Bit-layout codec.
//!
//! Packs four fields into one `u64`, most significant first:
//!
//! ```text
//! | timestamp | counter | instance_id | domain |
//! ```
//!
//! Every field is masked to its width before it is shifted in, so a value
//! that does not fit is silently truncated. In particular the timestamp field
//! wraps once `2^timestamp_bits` seconds have passed since the epoch; ids
//! issued after the wrap repeat earlier bit patterns. Decoding an overflowed
//! value therefore yields the truncated value, not the original.

use crate::domain::bounds::max_value;
use crate::domain::{BitLayout, IdComponents};

/// Encode id components into a single id.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn encode(components: &IdComponents, layout: &BitLayout) -> u64 {
    let offset = components
        .timestamp
        .wrapping_sub(layout.epoch_start_second) as u64;

    let mut id = 0;
    id = push_field(id, offset, layout.timestamp_bits);
    id = push_field(id, components.counter, layout.counter_bits);
    id = push_field(id, components.instance_id, layout.instance_id_bits);
    push_field(id, components.domain, layout.domain_bits)
}

/// Decode an id back into its components.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn decode(id: u64, layout: &BitLayout) -> IdComponents {
    let (domain, id) = pop_field(id, layout.domain_bits);
    let (instance_id, id) = pop_field(id, layout.instance_id_bits);
    let (counter, id) = pop_field(id, layout.counter_bits);
    let (offset, _) = pop_field(id, layout.timestamp_bits);

    IdComponents {
        timestamp: layout.epoch_start_second.wrapping_add(offset as i64),
        counter,
        instance_id,
        domain,
    }
}

fn push_field(id: u64, value: u64, bits: u8) -> u64 {
    shl(id, bits) | (value & max_value(bits))
}

fn pop_field(id: u64, bits: u8) -> (u64, u64) {
    (id & max_value(bits), shr(id, bits))
}

// `<<`/`>>` by 64 would overflow; a full-width shift empties the word.
fn shl(value: u64, bits: u8) -> u64 {
    value.checked_shl(u32::from(bits)).unwrap_or(0)
}

fn shr(value: u64, bits: u8) -> u64 {
    value.checked_shr(u32::from(bits)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bounds, GeneratorConfig};

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            timestamp_bits: 35,
            counter_bits: 14,
            instance_id_bits: 6,
            domain_bits: 8,
            epoch_start_second: 1_672_531_200,
            ..GeneratorConfig::with_instance_id(3)
        }
    }

    fn sample() -> IdComponents {
        IdComponents::new(1_673_989_769, 1, 5, 9)
    }

    #[test]
    fn test_encode_known_id() {
        let layout = config().layout();
        assert_eq!(encode(&sample(), &layout), 391_531_634_640_137);
    }

    #[test]
    fn test_decode_known_id() {
        let layout = config().layout();
        assert_eq!(decode(391_531_634_640_137, &layout), sample());
    }

    #[test]
    fn test_timestamp_overflow_wraps() {
        let config = config();
        let layout = config.layout();
        let bounds = Bounds::resolve(&config).unwrap();

        #[allow(clippy::cast_possible_wrap)]
        let wrapped = IdComponents {
            timestamp: bounds.max_timestamp as i64 + 1 + config.epoch_start_second + 10,
            ..sample()
        };
        let plain = IdComponents {
            timestamp: config.epoch_start_second + 10,
            ..sample()
        };

        let id = encode(&wrapped, &layout);
        assert_eq!(id, 2_684_372_233);
        assert_eq!(id, encode(&plain, &layout));
        assert_eq!(decode(id, &layout), plain);
    }

    #[test]
    fn test_fields_are_truncated_to_width() {
        let layout = config().layout();
        let oversized = IdComponents {
            domain: 256 + 9,
            instance_id: 64 + 5,
            ..sample()
        };
        assert_eq!(decode(encode(&oversized, &layout), &layout), sample());
    }

    #[test]
    fn test_round_trip_at_bounds() {
        let config = config();
        let layout = config.layout();
        let bounds = Bounds::resolve(&config).unwrap();

        #[allow(clippy::cast_possible_wrap)]
        let max = IdComponents {
            timestamp: config.epoch_start_second + bounds.max_timestamp as i64,
            counter: bounds.max_counter,
            instance_id: bounds.max_instance_id,
            domain: bounds.max_domain,
        };
        let min = IdComponents::new(config.epoch_start_second, 0, 0, 0);

        assert_eq!(encode(&min, &layout), 0);
        assert_eq!(encode(&max, &layout), (1u64 << 63) - 1);
        assert_eq!(decode(encode(&max, &layout), &layout), max);
        assert_eq!(decode(encode(&min, &layout), &layout), min);
    }

    #[test]
    fn test_full_width_fields() {
        let layout = BitLayout {
            timestamp_bits: 0,
            counter_bits: 0,
            instance_id_bits: 0,
            domain_bits: 64,
            epoch_start_second: 0,
        };
        let components = IdComponents::new(0, 0, 0, u64::MAX - 1);
        let id = encode(&components, &layout);
        assert_eq!(id, u64::MAX - 1);
        assert_eq!(decode(id, &layout), components);
    }

    #[test]
    fn test_ids_order_by_timestamp_then_counter() {
        let layout = config().layout();
        let a = encode(&IdComponents::new(1_700_000_000, 16_383, 63, 255), &layout);
        let b = encode(&IdComponents::new(1_700_000_001, 0, 0, 0), &layout);
        let c = encode(&IdComponents::new(1_700_000_001, 1, 0, 0), &layout);
        assert!(a < b);
        assert!(b < c);
    }
}
