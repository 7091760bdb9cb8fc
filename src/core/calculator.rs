use crate::domain::model::{EquipmentRequirement, SessionParameters, UnitType};

// 浮點誤差容許值，避免 30 * 0.1 這類結果被進位成 4
const ROUNDING_EPSILON: f64 = 1e-9;

/// 計算一項器材這堂課需要準備的數量。
///
/// 純函式：同樣的輸入永遠得到同樣的結果。
/// 無法辨識的計算方式視為 0，再套用最低數量。
pub fn required_quantity(requirement: &EquipmentRequirement, session: &SessionParameters) -> u32 {
    let raw = match requirement.unit_type {
        UnitType::PerClass => 1.0,
        UnitType::PerPupil => f64::from(session.pupil_count()) * requirement.ratio,
        UnitType::PerGroup => f64::from(session.group_count()) * requirement.ratio,
        UnitType::Unrecognized(_) => 0.0,
    };

    // NaN 與負數經 `as` 轉換後皆為 0
    let rounded = (raw - ROUNDING_EPSILON).ceil().max(0.0) as u32;
    rounded.max(requirement.minimum_quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(unit: &str, ratio: f64, minimum: u32) -> EquipmentRequirement {
        EquipmentRequirement::new(UnitType::parse(unit), ratio, minimum)
    }

    fn session(pupils: u32, group_size: u32) -> SessionParameters {
        SessionParameters::new(pupils, group_size).unwrap()
    }

    #[test]
    fn test_per_pupil_one_each() {
        assert_eq!(required_quantity(&req("per_pupil", 1.0, 0), &session(30, 4)), 30);
    }

    #[test]
    fn test_per_group_rounds_groups_up() {
        // 30 / 4 -> 8 組，每組 2
        assert_eq!(required_quantity(&req("Per Group", 2.0, 5), &session(30, 4)), 16);
    }

    #[test]
    fn test_per_class_is_one_unless_minimum_higher() {
        assert_eq!(required_quantity(&req("per class", 99.0, 3), &session(1, 1)), 3);
        assert_eq!(required_quantity(&req("per class", 99.0, 0), &session(1, 1)), 1);
    }

    #[test]
    fn test_minimum_acts_as_floor() {
        // ceil(15 * 0.5) = 8 < 10
        assert_eq!(required_quantity(&req("PER_PUPIL", 0.5, 10), &session(15, 4)), 10);
    }

    #[test]
    fn test_unknown_unit_only_gets_minimum() {
        assert_eq!(required_quantity(&req("unknown_type", 5.0, 2), &session(30, 4)), 2);
        assert_eq!(required_quantity(&req("unknown_type", 5.0, 0), &session(12, 3)), 0);
    }

    #[test]
    fn test_single_group_for_whole_class() {
        assert_eq!(required_quantity(&req("per_group", 1.0, 0), &session(30, 30)), 1);
    }

    #[test]
    fn test_fractional_ratio_rounds_up() {
        assert_eq!(required_quantity(&req("per pupil", 0.5, 0), &session(15, 4)), 8);
        assert_eq!(required_quantity(&req("per group", 0.5, 0), &session(30, 4)), 4);
    }

    #[test]
    fn test_float_noise_does_not_add_an_item() {
        assert_eq!(required_quantity(&req("per pupil", 0.1, 0), &session(30, 4)), 3);
        assert_eq!(required_quantity(&req("per pupil", 0.3, 0), &session(10, 4)), 3);
        assert_eq!(required_quantity(&req("per pupil", 0.25, 0), &session(30, 4)), 8);
    }

    #[test]
    fn test_negative_or_nan_ratio_never_goes_below_zero() {
        assert_eq!(required_quantity(&req("per pupil", -2.0, 0), &session(30, 4)), 0);
        assert_eq!(required_quantity(&req("per pupil", -2.0, 4), &session(30, 4)), 4);
        assert_eq!(required_quantity(&req("per group", f64::NAN, 1), &session(30, 4)), 1);
    }

    #[test]
    fn test_output_never_below_minimum() {
        let units = ["per class", "per pupil", "per group", "per table"];
        for unit in units {
            for minimum in [0, 1, 7, 40] {
                for pupils in [1, 5, 30, 31] {
                    for group_size in [1, 3, 4, 12] {
                        let qty = required_quantity(&req(unit, 0.75, minimum), &session(pupils, group_size));
                        assert!(qty >= minimum, "{unit} {minimum} {pupils} {group_size}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_per_class_ignores_session() {
        let requirement = req("per_class", 3.5, 0);
        for pupils in 1..=40 {
            for group_size in 1..=12 {
                assert_eq!(required_quantity(&requirement, &session(pupils, group_size)), 1);
            }
        }
    }

    #[test]
    fn test_per_pupil_monotonic_in_pupils() {
        for ratio in [0.25, 0.5, 1.0, 1.5, 3.0] {
            let requirement = req("per pupil", ratio, 2);
            let mut previous = 0;
            for pupils in 1..=60 {
                let qty = required_quantity(&requirement, &session(pupils, 4));
                assert!(qty >= previous, "ratio {ratio} pupils {pupils}");
                previous = qty;
            }
        }
    }

    #[test]
    fn test_per_group_monotonic() {
        for ratio in [0.5, 1.0, 2.0] {
            let requirement = req("per group", ratio, 0);

            for group_size in 1..=12 {
                let mut previous = 0;
                for pupils in 1..=60 {
                    let qty = required_quantity(&requirement, &session(pupils, group_size));
                    assert!(qty >= previous);
                    previous = qty;
                }
            }

            for pupils in 1..=60 {
                let mut previous = u32::MAX;
                for group_size in 1..=12 {
                    let qty = required_quantity(&requirement, &session(pupils, group_size));
                    assert!(qty <= previous);
                    previous = qty;
                }
            }
        }
    }

    #[test]
    fn test_repeated_calls_agree() {
        let requirement = req("per group", 1.5, 1);
        let session = session(27, 5);
        let first = required_quantity(&requirement, &session);
        for _ in 0..10 {
            assert_eq!(required_quantity(&requirement, &session), first);
        }
    }
}
