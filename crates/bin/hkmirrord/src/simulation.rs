//! Value simulation: picks a watched characteristic of the home at random
//! and computes a new value for it, as if someone flipped a switch.

use hkmirror_domain::characteristic::{CharacteristicCategory, CharacteristicValue};
use hkmirror_domain::home::Home;
use hkmirror_domain::id::ServiceId;
use rand::Rng;
use rand::seq::SliceRandom;

/// Number of security system states (stay, away, night, disarmed, triggered).
const SECURITY_STATES: i64 = 5;

/// One simulated change.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub service: ServiceId,
    pub service_name: String,
    pub category: CharacteristicCategory,
    pub value: CharacteristicValue,
}

/// Pick a random (service, category) pair among `categories` present in
/// `home` and compute its next value.
///
/// Returns `None` when no service of the home hosts any of `categories`.
pub fn next_change<R: Rng + ?Sized>(
    home: &Home,
    categories: &[CharacteristicCategory],
    rng: &mut R,
) -> Option<Change> {
    let candidates: Vec<_> = home
        .services()
        .flat_map(|service| {
            categories
                .iter()
                .copied()
                .filter(|category| service.characteristic(*category).is_some())
                .map(move |category| (service, category))
        })
        .collect();
    let (service, category) = candidates.choose(rng)?;
    Some(Change {
        service: service.id(),
        service_name: service.name().to_string(),
        category: *category,
        value: next_value(*category, service.value(*category), rng),
    })
}

fn next_value<R: Rng + ?Sized>(
    category: CharacteristicCategory,
    current: Option<&CharacteristicValue>,
    rng: &mut R,
) -> CharacteristicValue {
    if category == CharacteristicCategory::CurrentSecuritySystemState {
        let current = current
            .and_then(CharacteristicValue::as_i64)
            .unwrap_or(0)
            .rem_euclid(SECURITY_STATES);
        let step = rng.gen_range(1..SECURITY_STATES);
        return CharacteristicValue::Int((current + step) % SECURITY_STATES);
    }
    match current {
        Some(CharacteristicValue::Bool(on)) => CharacteristicValue::Bool(!on),
        Some(CharacteristicValue::Int(value)) => CharacteristicValue::Int(i64::from(*value == 0)),
        Some(CharacteristicValue::Float(value)) => {
            CharacteristicValue::Float(value + rng.gen_range(-1.0..1.0))
        }
        Some(CharacteristicValue::String(_)) | None => CharacteristicValue::Bool(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkmirror_adapter_virtual::previews;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn should_pick_only_watched_categories() {
        let home = previews::home().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..32 {
            let change = next_change(&home, &[CharacteristicCategory::MotionDetected], &mut rng)
                .unwrap();
            assert_eq!(change.category, CharacteristicCategory::MotionDetected);
            assert!(home.service(change.service).is_some());
        }
    }

    #[test]
    fn should_return_none_when_nothing_matches() {
        let home = previews::home().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        assert!(next_change(&home, &[CharacteristicCategory::Brightness], &mut rng).is_none());
    }

    #[test]
    fn should_flip_power_state() {
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            next_value(
                CharacteristicCategory::PowerState,
                Some(&CharacteristicValue::Bool(true)),
                &mut rng
            ),
            CharacteristicValue::Bool(false)
        );
    }

    #[test]
    fn should_flip_sensor_reading() {
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            next_value(
                CharacteristicCategory::ContactState,
                Some(&CharacteristicValue::Int(0)),
                &mut rng
            ),
            CharacteristicValue::Int(1)
        );
    }

    #[test]
    fn should_move_security_system_to_another_state() {
        let mut rng = StdRng::seed_from_u64(3);

        for current in 0..SECURITY_STATES {
            let next = next_value(
                CharacteristicCategory::CurrentSecuritySystemState,
                Some(&CharacteristicValue::Int(current)),
                &mut rng,
            );
            let next = next.as_i64().unwrap();
            assert_ne!(next, current);
            assert!((0..SECURITY_STATES).contains(&next));
        }
    }

    #[test]
    fn should_stay_in_range_when_source_reports_out_of_range_state() {
        let mut rng = StdRng::seed_from_u64(5);

        for current in [i64::MAX, i64::MIN, -1] {
            let next = next_value(
                CharacteristicCategory::CurrentSecuritySystemState,
                Some(&CharacteristicValue::Int(current)),
                &mut rng,
            );
            let next = next.as_i64().unwrap();
            assert!((0..SECURITY_STATES).contains(&next));
            assert_ne!(next, current.rem_euclid(SECURITY_STATES));
        }
    }
}
