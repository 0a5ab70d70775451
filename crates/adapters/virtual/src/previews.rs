//! Preview fixtures: a small detached home used by demos and tests.
//!
//! Every object built here is [`Backing::Detached`]; adopt the home into a
//! [`VirtualHome`](crate::VirtualHome) to make it live.
//!
//! [`Backing::Detached`]: hkmirror_domain::backing::Backing::Detached

use hkmirror_domain::accessory::{Accessory, AccessoryCategory};
use hkmirror_domain::action_set::{ActionSet, ActionSetKind};
use hkmirror_domain::characteristic::{
    CharacteristicCategory, CharacteristicProperties, CharacteristicValue,
};
use hkmirror_domain::error::MirrorError;
use hkmirror_domain::home::Home;
use hkmirror_domain::room::Room;
use hkmirror_domain::service::{Service, ServiceCategory};
use hkmirror_domain::service_group::ServiceGroup;
use hkmirror_domain::trigger::Trigger;
use hkmirror_domain::zone::Zone;

/// Name of the preview home.
pub const HOME_NAME: &str = "Demo Home";

/// Number of preview services (and accessories, one service each).
pub const SERVICE_COUNT: usize = 16;

struct ServiceFixture {
    service: ServiceCategory,
    accessory: AccessoryCategory,
    characteristic: CharacteristicCategory,
    initial: i64,
}

const fn fixture(
    service: ServiceCategory,
    accessory: AccessoryCategory,
    characteristic: CharacteristicCategory,
    initial: i64,
) -> ServiceFixture {
    ServiceFixture {
        service,
        accessory,
        characteristic,
        initial,
    }
}

const FIXTURES: [ServiceFixture; SERVICE_COUNT] = {
    use AccessoryCategory as A;
    use CharacteristicCategory as C;
    use ServiceCategory as S;
    [
        fixture(S::Lightbulb, A::Lightbulb, C::PowerState, 0),
        fixture(S::Lightbulb, A::Lightbulb, C::PowerState, 1),
        fixture(S::Lightbulb, A::Lightbulb, C::PowerState, 0),
        fixture(S::Lightbulb, A::Lightbulb, C::PowerState, 1),
        fixture(S::Outlet, A::Outlet, C::PowerState, 0),
        fixture(S::Outlet, A::Outlet, C::PowerState, 1),
        fixture(S::Switch, A::Switch, C::PowerState, 0),
        fixture(S::Switch, A::Switch, C::PowerState, 1),
        fixture(S::ContactSensor, A::Sensor, C::ContactState, 0),
        fixture(S::ContactSensor, A::Sensor, C::ContactState, 1),
        fixture(S::MotionSensor, A::Sensor, C::MotionDetected, 0),
        fixture(S::MotionSensor, A::Sensor, C::MotionDetected, 1),
        fixture(S::SecuritySystem, A::SecuritySystem, C::CurrentSecuritySystemState, 3),
        fixture(S::SecuritySystem, A::SecuritySystem, C::CurrentSecuritySystemState, 1),
        fixture(S::SecuritySystem, A::SecuritySystem, C::CurrentSecuritySystemState, 2),
        fixture(S::SecuritySystem, A::SecuritySystem, C::CurrentSecuritySystemState, 4),
    ]
};

/// Which accessories (by fixture index) go to which room.
const ROOMS: [(&str, &[usize]); 7] = [
    ("Kitchen", &[0, 1, 2, 5]),
    ("Hallway", &[3, 9]),
    ("Office", &[4, 10]),
    ("Patio", &[6, 11]),
    ("Porch", &[7, 8, 12]),
    ("Bathroom", &[13]),
    ("Workshop", &[14]),
];

/// Which rooms (by index into [`ROOMS`]) each zone holds.
const ZONES: [(&str, &[usize]); 6] = [
    ("Ground floor", &[0, 1, 2]),
    ("Outside", &[3, 4]),
    ("First floor", &[5]),
    ("Garage", &[6]),
    ("Second floor", &[]),
    ("Basement", &[]),
];

fn initial_value(fixture: &ServiceFixture) -> CharacteristicValue {
    match fixture.characteristic {
        CharacteristicCategory::PowerState => CharacteristicValue::Bool(fixture.initial != 0),
        _ => CharacteristicValue::Int(fixture.initial),
    }
}

fn properties(fixture: &ServiceFixture) -> CharacteristicProperties {
    match fixture.characteristic {
        CharacteristicCategory::PowerState => CharacteristicProperties::CONTROL,
        _ => CharacteristicProperties::SENSOR,
    }
}

/// The preview services, in fixture order.
///
/// # Errors
///
/// Returns a validation error if a builder fails (should not happen with
/// hardcoded inputs).
pub fn services() -> Result<Vec<Service>, MirrorError> {
    FIXTURES
        .iter()
        .map(|f| {
            Service::builder()
                .category(f.service)
                .with_value(f.characteristic, properties(f), initial_value(f))
                .build()
        })
        .collect()
}

/// The preview accessories, one per preview service, in fixture order.
///
/// # Errors
///
/// Returns a validation error if a builder fails.
pub fn accessories() -> Result<Vec<Accessory>, MirrorError> {
    FIXTURES
        .iter()
        .zip(services()?)
        .map(|(f, service)| {
            Accessory::builder()
                .category(f.accessory)
                .manufacturer("hkmirror")
                .model("Preview")
                .service(service)
                .build()
        })
        .collect()
}

/// The preview home: seven rooms, six zones, one scene, one trigger and one
/// service group. The last accessory is left unassigned.
///
/// # Errors
///
/// Returns a validation error if a builder fails.
pub fn home() -> Result<Home, MirrorError> {
    let mut accessories: Vec<Option<Accessory>> = accessories()?.into_iter().map(Some).collect();

    let mut rooms = Vec::with_capacity(ROOMS.len());
    for (name, members) in ROOMS {
        let mut builder = Room::builder().name(name);
        for accessory in members.iter().filter_map(|i| accessories[*i].take()) {
            builder = builder.accessory(accessory);
        }
        rooms.push(builder.build()?);
    }

    let first_service = rooms
        .first()
        .and_then(|room| room.accessories().first())
        .and_then(Accessory::primary_service)
        .map(Service::id);

    let mut builder = Home::builder().name(HOME_NAME).primary(true);
    for (name, members) in ZONES {
        let room_ids = members.iter().map(|i| rooms[*i].id()).collect();
        builder = builder.zone(Zone::new(Some(name.to_string()), room_ids)?);
    }
    for room in rooms {
        builder = builder.room(room);
    }
    for accessory in accessories.into_iter().flatten() {
        builder = builder.accessory(accessory);
    }

    let scene = ActionSet::new(Some("Good night".to_string()), ActionSetKind::Sleep, 4)?;
    let trigger = Trigger::new("At bedtime", vec![scene.id()])?;
    builder = builder
        .action_set(scene)
        .trigger(trigger)
        .service_group(ServiceGroup::new(None, first_service.into_iter().collect())?);

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_sixteen_services_with_initial_values() {
        let services = services().unwrap();

        assert_eq!(services.len(), SERVICE_COUNT);
        assert_eq!(
            services[1].value(CharacteristicCategory::PowerState),
            Some(&CharacteristicValue::Bool(true))
        );
        assert_eq!(
            services[12].value(CharacteristicCategory::CurrentSecuritySystemState),
            Some(&CharacteristicValue::Int(3))
        );
    }

    #[test]
    fn should_generate_names_from_category() {
        let services = services().unwrap();

        assert!(services[8].name().starts_with("Contact Sensor "));
    }

    #[test]
    fn should_place_every_accessory_exactly_once() {
        let home = home().unwrap();

        assert_eq!(home.accessories().count(), SERVICE_COUNT);
        assert_eq!(home.unassigned_accessories().len(), 1);
        assert_eq!(home.rooms().len(), 7);
        assert_eq!(home.rooms()[0].accessories().len(), 4);
    }

    #[test]
    fn should_lay_out_zones_over_rooms() {
        let home = home().unwrap();

        let outside = &home.zones()[1];
        let names: Vec<_> = home.rooms_in(outside.id()).iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Patio", "Porch"]);
        assert!(home.rooms_in(home.zones()[5].id()).is_empty());
    }

    #[test]
    fn should_only_build_detached_objects() {
        let mut home = home().unwrap();

        let mut live = 0;
        home.for_each_backing_mut(|_, _, backing| live += usize::from(backing.is_live()));
        assert_eq!(live, 0);
    }
}
