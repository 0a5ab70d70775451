//! Home service: room, zone, scene and trigger passthroughs.
//!
//! Every operation takes the home snapshot it applies to. When all objects
//! involved are live the source performs the change and the snapshot is
//! updated afterwards; when all are detached only the snapshot changes.
//! Mixing live and detached objects is refused.

use std::sync::Arc;

use hkmirror_domain::backing::{Mirrored, SourceHandle};
use hkmirror_domain::error::{DetachedError, MirrorError, NotFoundError, ValidationError};
use hkmirror_domain::home::Home;
use hkmirror_domain::id::{ActionSetId, RoomId, TriggerId, ZoneId};
use hkmirror_domain::room::Room;
use hkmirror_domain::zone::Zone;

use crate::ports::HomeSource;

fn not_found(entity: &'static str, id: impl ToString) -> MirrorError {
    NotFoundError {
        entity,
        id: id.to_string(),
    }
    .into()
}

/// Handles of two objects that must be both live or both detached.
fn paired_handles<A: Mirrored, B: Mirrored>(
    a: &A,
    b: &B,
) -> Result<Option<(SourceHandle, SourceHandle)>, DetachedError> {
    if !a.backing().is_live() && !b.backing().is_live() {
        return Ok(None);
    }
    Ok(Some((a.live_handle()?.clone(), b.live_handle()?.clone())))
}

fn zone_and_room(
    home: &Home,
    zone: ZoneId,
    room: RoomId,
) -> Result<Option<(SourceHandle, SourceHandle)>, MirrorError> {
    let zone = home.zone(zone).ok_or_else(|| not_found("Zone", zone))?;
    let room = home.room(room).ok_or_else(|| not_found("Room", room))?;
    Ok(paired_handles(zone, room)?)
}

pub struct HomeService<S> {
    source: Arc<S>,
}

impl<S: HomeSource> HomeService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Create a room named `name` in `home`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] for an empty name, or the source's
    /// error.
    #[tracing::instrument(skip(self, home), fields(home = %home.id()))]
    pub async fn add_room(&self, home: &mut Home, name: &str) -> Result<Room, MirrorError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let room = match home.backing().handle().cloned() {
            Some(handle) => self.source.add_room(&handle, name).await?,
            None => Room::builder().name(name).build()?,
        };
        home.push_room(room.clone());
        Ok(room)
    }

    /// Remove a room; its accessories become unassigned.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if the room is not in `home`,
    /// [`MirrorError::Detached`] when mixing live and detached objects, or
    /// the source's error.
    #[tracing::instrument(skip(self, home), fields(home = %home.id()))]
    pub async fn remove_room(&self, home: &mut Home, room: RoomId) -> Result<(), MirrorError> {
        let target = home.room(room).ok_or_else(|| not_found("Room", room))?;
        if let Some((home_handle, room_handle)) = paired_handles(&*home, target)? {
            self.source.remove_room(&home_handle, &room_handle).await?;
        }
        home.remove_room(room);
        Ok(())
    }

    /// Create a zone named `name` in `home`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Validation`] for an empty name, or the source's
    /// error.
    #[tracing::instrument(skip(self, home), fields(home = %home.id()))]
    pub async fn add_zone(&self, home: &mut Home, name: &str) -> Result<Zone, MirrorError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let zone = match home.backing().handle().cloned() {
            Some(handle) => self.source.add_zone(&handle, name).await?,
            None => Zone::new(Some(name.to_string()), Vec::new())?,
        };
        home.push_zone(zone.clone());
        Ok(zone)
    }

    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if the zone is not in `home`,
    /// [`MirrorError::Detached`] when mixing live and detached objects, or
    /// the source's error.
    #[tracing::instrument(skip(self, home), fields(home = %home.id()))]
    pub async fn remove_zone(&self, home: &mut Home, zone: ZoneId) -> Result<(), MirrorError> {
        let target = home.zone(zone).ok_or_else(|| not_found("Zone", zone))?;
        if let Some((home_handle, zone_handle)) = paired_handles(&*home, target)? {
            self.source.remove_zone(&home_handle, &zone_handle).await?;
        }
        home.remove_zone(zone);
        Ok(())
    }

    /// Put `room` in `zone`. Adding a room twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if either object is not in `home`,
    /// [`MirrorError::Detached`] when mixing live and detached objects, or
    /// the source's error.
    #[tracing::instrument(skip(self, home), fields(home = %home.id()))]
    pub async fn add_room_to_zone(
        &self,
        home: &mut Home,
        zone: ZoneId,
        room: RoomId,
    ) -> Result<(), MirrorError> {
        let handles = zone_and_room(home, zone, room)?;
        if home.zone(zone).is_some_and(|z| z.contains(room)) {
            return Ok(());
        }
        if let Some((zone_handle, room_handle)) = handles {
            self.source
                .add_room_to_zone(&zone_handle, &room_handle)
                .await?;
        }
        if let Some(target) = home.zone_mut(zone) {
            target.add_room(room);
        }
        Ok(())
    }

    /// Take `room` out of `zone`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if either object is not in `home`,
    /// [`MirrorError::Detached`] when mixing live and detached objects, or
    /// the source's error.
    #[tracing::instrument(skip(self, home), fields(home = %home.id()))]
    pub async fn remove_room_from_zone(
        &self,
        home: &mut Home,
        zone: ZoneId,
        room: RoomId,
    ) -> Result<(), MirrorError> {
        if let Some((zone_handle, room_handle)) = zone_and_room(home, zone, room)? {
            self.source
                .remove_room_from_zone(&zone_handle, &room_handle)
                .await?;
        }
        if let Some(target) = home.zone_mut(zone) {
            target.remove_room(room);
        }
        Ok(())
    }

    /// Run every action of a scene.
    ///
    /// A detached scene has nothing to run; the call only logs.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if the scene is not in `home`,
    /// [`MirrorError::Detached`] when mixing live and detached objects, or
    /// the source's error.
    #[tracing::instrument(skip(self, home), fields(home = %home.id()))]
    pub async fn execute(&self, home: &Home, action_set: ActionSetId) -> Result<(), MirrorError> {
        let scene = home
            .action_set(action_set)
            .ok_or_else(|| not_found("ActionSet", action_set))?;
        match paired_handles(home, scene)? {
            Some((home_handle, scene_handle)) => {
                self.source
                    .execute_action_set(&home_handle, &scene_handle)
                    .await
            }
            None => {
                tracing::info!(scene = scene.name(), "detached scene, nothing to execute");
                Ok(())
            }
        }
    }

    /// Enable or disable a trigger.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NotFound`] if the trigger is not in `home`, or
    /// the source's error.
    #[tracing::instrument(skip(self, home), fields(home = %home.id()))]
    pub async fn set_trigger_enabled(
        &self,
        home: &mut Home,
        trigger: TriggerId,
        enabled: bool,
    ) -> Result<(), MirrorError> {
        let target = home
            .trigger(trigger)
            .ok_or_else(|| not_found("Trigger", trigger))?;
        if let Some(handle) = target.backing().handle().cloned() {
            self.source.enable_trigger(&handle, enabled).await?;
        }
        if let Some(target) = home.trigger_mut(trigger) {
            target.set_enabled(enabled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSource, live_home};
    use hkmirror_domain::action_set::{ActionSet, ActionSetKind};
    use hkmirror_domain::backing::Backing;
    use hkmirror_domain::trigger::Trigger;

    fn service(source: &Arc<FakeSource>) -> HomeService<FakeSource> {
        HomeService::new(Arc::clone(source))
    }

    fn detached_home() -> Home {
        Home::builder().name("Preview").build().unwrap()
    }

    #[tokio::test]
    async fn should_add_room_locally_when_home_detached() {
        let source = Arc::new(FakeSource::default());
        let mut home = detached_home();

        let room = service(&source).add_room(&mut home, "Attic").await.unwrap();

        assert!(!room.backing().is_live());
        assert_eq!(home.rooms().len(), 1);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn should_add_room_through_source_when_home_live() {
        let source = Arc::new(FakeSource::default());
        let mut home = live_home("Demo", vec![]);

        let room = service(&source).add_room(&mut home, "Attic").await.unwrap();

        assert!(room.backing().is_live());
        assert_eq!(home.room(room.id()).map(Room::name), Some("Attic"));
        assert_eq!(source.calls(), vec!["add_room home:Demo Attic".to_string()]);
    }

    #[tokio::test]
    async fn should_refuse_mixing_live_home_and_detached_room() {
        let source = Arc::new(FakeSource::default());
        let mut home = live_home("Demo", vec![]);
        let room = Room::builder().name("Preview room").build().unwrap();
        let room_id = room.id();
        home.push_room(room);

        let result = service(&source).remove_room(&mut home, room_id).await;

        assert!(matches!(result, Err(MirrorError::Detached(ref e)) if e.entity == "Room"));
        assert_eq!(home.rooms().len(), 1);
    }

    #[tokio::test]
    async fn should_report_missing_room() {
        let source = Arc::new(FakeSource::default());
        let mut home = detached_home();

        let result = service(&source).remove_room(&mut home, RoomId::new()).await;

        assert!(matches!(result, Err(MirrorError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_manage_zone_membership_locally() {
        let source = Arc::new(FakeSource::default());
        let service = service(&source);
        let mut home = detached_home();
        let room = service.add_room(&mut home, "Porch").await.unwrap();
        let zone = service.add_zone(&mut home, "Outside").await.unwrap();

        service
            .add_room_to_zone(&mut home, zone.id(), room.id())
            .await
            .unwrap();
        service
            .add_room_to_zone(&mut home, zone.id(), room.id())
            .await
            .unwrap();
        assert_eq!(home.rooms_in(zone.id()).len(), 1);

        service
            .remove_room_from_zone(&mut home, zone.id(), room.id())
            .await
            .unwrap();
        assert!(home.rooms_in(zone.id()).is_empty());

        service.remove_zone(&mut home, zone.id()).await.unwrap();
        assert!(home.zones().is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn should_forward_zone_membership_when_live() {
        let source = Arc::new(FakeSource::default());
        let service = service(&source);
        let mut home = live_home("Demo", vec![]);
        let room = service.add_room(&mut home, "Porch").await.unwrap();
        let zone = service.add_zone(&mut home, "Outside").await.unwrap();

        service
            .add_room_to_zone(&mut home, zone.id(), room.id())
            .await
            .unwrap();

        assert!(home.zone(zone.id()).unwrap().contains(room.id()));
        assert_eq!(
            source.calls().last().map(String::as_str),
            Some("add_room_to_zone zone:Outside room:Porch")
        );
    }

    #[tokio::test]
    async fn should_execute_live_scene_through_source() {
        let source = Arc::new(FakeSource::default());
        let scene = ActionSet::new(Some("Good night".into()), ActionSetKind::Sleep, 4)
            .unwrap()
            .with_backing(Backing::Live(SourceHandle::new("scene:1")));
        let scene_id = scene.id();
        let mut home = live_home("Demo", vec![]);
        home.push_action_set(scene);

        service(&source).execute(&home, scene_id).await.unwrap();

        assert_eq!(source.calls(), vec!["execute home:Demo scene:1".to_string()]);
    }

    #[tokio::test]
    async fn should_treat_detached_scene_as_noop() {
        let source = Arc::new(FakeSource::default());
        let scene = ActionSet::new(None, ActionSetKind::UserDefined, 0).unwrap();
        let scene_id = scene.id();
        let mut home = detached_home();
        home.push_action_set(scene);

        service(&source).execute(&home, scene_id).await.unwrap();

        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn should_toggle_trigger() {
        let source = Arc::new(FakeSource::default());
        let trigger = Trigger::new("Sunset", vec![])
            .unwrap()
            .with_backing(Backing::Live(SourceHandle::new("trigger:1")));
        let trigger_id = trigger.id();
        let mut home = live_home("Demo", vec![]);
        home.push_trigger(trigger);

        service(&source)
            .set_trigger_enabled(&mut home, trigger_id, false)
            .await
            .unwrap();

        assert!(!home.trigger(trigger_id).unwrap().is_enabled());
        assert_eq!(source.calls(), vec!["enable_trigger trigger:1 false".to_string()]);
    }
}
