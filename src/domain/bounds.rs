//! Per-field maxima derived from a [`GeneratorConfig`].

use serde::Serialize;

use super::GeneratorConfig;
use crate::error::GeneratorError;

/// Largest value representable in a field of `bits` width.
///
/// Computed with integer shifts so widths near 64 stay exact.
#[must_use]
pub const fn max_value(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Maximum value of every id field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    /// Largest encodable timestamp offset.
    pub max_timestamp: u64,
    /// Largest counter value within one second.
    pub max_counter: u64,
    /// Largest instance id.
    pub max_instance_id: u64,
    /// Largest domain value.
    pub max_domain: u64,
    /// `reserved_seconds_count` in the sequencers' signed second arithmetic.
    pub reserved_seconds: i64,
}

impl Bounds {
    /// Resolve bounds for a configuration and check it is consistent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the field widths sum to more than 64 bits
    /// - the number of domains cannot be used as an allocation size
    /// - the configured instance id does not fit its field
    /// - `reserved_seconds_count` does not fit an `i64`
    pub fn resolve(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let total_bits = config.total_bits();
        if total_bits > 64 {
            return Err(GeneratorError::WidthOverflow { total_bits });
        }

        let reserved_seconds = i64::try_from(config.reserved_seconds_count).map_err(|_| {
            GeneratorError::ReservedSecondsOutOfRange {
                value: config.reserved_seconds_count,
            }
        })?;

        let bounds = Self {
            max_timestamp: max_value(config.timestamp_bits),
            max_counter: max_value(config.counter_bits),
            max_instance_id: max_value(config.instance_id_bits),
            max_domain: max_value(config.domain_bits),
            reserved_seconds,
        };

        if domain_count(bounds.max_domain).is_none() {
            return Err(GeneratorError::DomainCountUnrepresentable {
                max_domain: bounds.max_domain,
            });
        }

        if config.instance_id > bounds.max_instance_id {
            return Err(GeneratorError::InstanceIdOutOfRange {
                instance_id: config.instance_id,
                max: bounds.max_instance_id,
            });
        }

        Ok(bounds)
    }

    /// Number of sequencers needed to cover `[0, max_domain]`.
    #[must_use]
    pub fn domain_count(&self) -> usize {
        // Checked in `resolve`.
        domain_count(self.max_domain).unwrap_or(usize::MAX)
    }

    /// Whether `domain` lies within `[0, max_domain]`.
    #[must_use]
    pub const fn contains_domain(&self, domain: u64) -> bool {
        domain <= self.max_domain
    }
}

fn domain_count(max_domain: u64) -> Option<usize> {
    usize::try_from(max_domain)
        .ok()
        .and_then(|max| max.checked_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig::with_instance_id(3)
    }

    #[test]
    fn test_default_bounds() {
        let bounds = Bounds::resolve(&config()).unwrap();
        assert_eq!(bounds.max_timestamp, 34_359_738_367);
        assert_eq!(bounds.max_counter, 16_383);
        assert_eq!(bounds.max_instance_id, 63);
        assert_eq!(bounds.max_domain, 255);
        assert_eq!(bounds.domain_count(), 256);
        assert_eq!(bounds.reserved_seconds, 60);
        assert!(bounds.contains_domain(255));
        assert!(!bounds.contains_domain(256));
    }

    #[test]
    fn test_max_value_edges() {
        assert_eq!(max_value(0), 0);
        assert_eq!(max_value(1), 1);
        assert_eq!(max_value(63), i64::MAX as u64);
        assert_eq!(max_value(64), u64::MAX);
    }

    #[test]
    fn test_timestamp_lifetime() {
        let bounds = Bounds::resolve(&config()).unwrap();
        let years = bounds.max_timestamp / 60 / 60 / 24 / 365;
        assert!(years >= 1000, "id lifespan is only {years} years");
    }

    #[test]
    fn test_widths_over_64_bits_rejected() {
        let config = GeneratorConfig {
            timestamp_bits: 40,
            ..config()
        };
        let err = Bounds::resolve(&config).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::WidthOverflow { total_bits: 68 }
        ));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_full_64_bit_timestamp() {
        let config = GeneratorConfig {
            timestamp_bits: 64,
            counter_bits: 0,
            instance_id_bits: 0,
            domain_bits: 0,
            instance_id: 0,
            ..GeneratorConfig::default()
        };
        let bounds = Bounds::resolve(&config).unwrap();
        assert_eq!(bounds.max_timestamp, u64::MAX);
        assert_eq!(bounds.max_domain, 0);
        assert_eq!(bounds.domain_count(), 1);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_domain_count_unrepresentable() {
        let config = GeneratorConfig {
            timestamp_bits: 0,
            counter_bits: 0,
            instance_id_bits: 0,
            domain_bits: 64,
            instance_id: 0,
            ..GeneratorConfig::default()
        };
        let err = Bounds::resolve(&config).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::DomainCountUnrepresentable { max_domain: u64::MAX }
        ));
    }

    #[test]
    fn test_reserved_seconds_must_fit_i64() {
        let config = GeneratorConfig {
            reserved_seconds_count: u64::MAX,
            ..config()
        };
        let err = Bounds::resolve(&config).unwrap_err();
        assert_eq!(
            err,
            GeneratorError::ReservedSecondsOutOfRange { value: u64::MAX }
        );
        assert!(err.is_config_error());

        let config = GeneratorConfig {
            reserved_seconds_count: i64::MAX as u64,
            ..self::config()
        };
        assert_eq!(Bounds::resolve(&config).unwrap().reserved_seconds, i64::MAX);
    }

    #[test]
    fn test_instance_id_must_fit() {
        let config = GeneratorConfig {
            instance_id: 64,
            ..config()
        };
        let err = Bounds::resolve(&config).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::InstanceIdOutOfRange {
                instance_id: 64,
                max: 63
            }
        ));
    }
}
