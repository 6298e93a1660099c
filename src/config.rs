use thiserror::Error;

const MAX: i64 = i32::MAX as i64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("number of philosophers must be at least 1")]
    NoPhilosophers,
    #[error("{field}: not a valid value between {min} and 2147483647 (got {value})")]
    OutOfRange {
        field: &'static str,
        min: i64,
        value: i64,
    },
}

/// Validated simulation parameters. Immutable once built; everything
/// downstream takes it by copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub philosophers: usize,
    pub time_to_die: u64,
    pub time_to_eat: u64,
    pub time_to_sleep: u64,
    /// `None` means run until someone starves.
    pub required_meals: Option<u32>,
}

impl Config {
    /// Validates raw integer inputs. All values are bounded to the i32
    /// range; the three durations must be non-zero, the meal count may be
    /// zero (which short-circuits the whole run to immediate success).
    pub fn new(
        philosophers: i64,
        time_to_die: i64,
        time_to_eat: i64,
        time_to_sleep: i64,
        required_meals: Option<i64>,
    ) -> Result<Self, ConfigError> {
        if philosophers == 0 {
            return Err(ConfigError::NoPhilosophers);
        }
        check("number_of_philosophers", philosophers, 1)?;
        check("time_to_die", time_to_die, 1)?;
        check("time_to_eat", time_to_eat, 1)?;
        check("time_to_sleep", time_to_sleep, 1)?;
        if let Some(meals) = required_meals {
            check("number_of_times_each_philosopher_must_eat", meals, 0)?;
        }
        Ok(Config {
            philosophers: philosophers as usize,
            time_to_die: time_to_die as u64,
            time_to_eat: time_to_eat as u64,
            time_to_sleep: time_to_sleep as u64,
            required_meals: required_meals.map(|m| m as u32),
        })
    }
}

fn check(field: &'static str, value: i64, min: i64) -> Result<(), ConfigError> {
    if value < min || value > MAX {
        return Err(ConfigError::OutOfRange { field, min, value });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_accepts_plain_config() {
        let config = Config::new(5, 800, 200, 200, None).unwrap();
        assert_eq!(config.philosophers, 5);
        assert_eq!(config.time_to_die, 800);
        assert_eq!(config.required_meals, None);
    }

    #[test]
    fn test_single_philosopher_is_valid() {
        assert!(Config::new(1, 100, 100, 100, None).is_ok());
    }

    #[test]
    fn test_rejects_zero_philosophers() {
        assert_eq!(
            Config::new(0, 100, 100, 100, None),
            Err(ConfigError::NoPhilosophers)
        );
    }

    #[test]
    fn test_rejects_zero_durations() {
        assert!(Config::new(2, 0, 100, 100, None).is_err());
        assert!(Config::new(2, 100, 0, 100, None).is_err());
        assert!(Config::new(2, 100, 100, 0, None).is_err());
    }

    #[test]
    fn test_zero_meals_is_valid() {
        let config = Config::new(2, 100, 100, 100, Some(0)).unwrap();
        assert_eq!(config.required_meals, Some(0));
    }

    #[test]
    fn test_rejects_values_over_i32_max() {
        let over = i32::MAX as i64 + 1;
        assert!(Config::new(over, 100, 100, 100, None).is_err());
        assert!(Config::new(2, over, 100, 100, None).is_err());
        assert!(Config::new(2, 100, 100, 100, Some(over)).is_err());
    }

    #[test]
    fn test_i32_max_is_accepted() {
        assert!(Config::new(2, i32::MAX as i64, 100, 100, None).is_ok());
    }

    #[test]
    fn test_rejects_negative_values() {
        assert!(Config::new(-1, 100, 100, 100, None).is_err());
        assert!(Config::new(2, -5, 100, 100, None).is_err());
        assert!(Config::new(2, 100, 100, 100, Some(-1)).is_err());
    }
}
