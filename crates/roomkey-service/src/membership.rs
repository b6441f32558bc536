//! Room membership: create, join, leave.

use std::sync::Arc;

use tracing::{info, warn};

use roomkey_alloc::RoomAllocator;
use roomkey_core::error::AppError;
use roomkey_core::events::RoomEvent;
use roomkey_core::result::AppResult;
use roomkey_core::traits::StoreProvider;
use roomkey_core::types::{RoomId, UserId};
use roomkey_realtime::EventPublisher;
use roomkey_store::keys;

/// A room exists while it has at least one member.
pub(crate) async fn room_exists(store: &dyn StoreProvider, room_id: RoomId) -> AppResult<bool> {
    Ok(store.set_card(&keys::room_users(room_id)).await? > 0)
}

/// Fails with `NotFound` unless the room has members.
pub(crate) async fn ensure_room_exists(store: &dyn StoreProvider, room_id: RoomId) -> AppResult<()> {
    if room_exists(store, room_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(format!(
            "There is no room by that id: {room_id}"
        )))
    }
}

/// Tracks which users are in which rooms and announces changes.
#[derive(Debug, Clone)]
pub struct MembershipService {
    /// Backing store.
    store: Arc<dyn StoreProvider>,
    /// Room id source.
    allocator: Arc<RoomAllocator>,
    /// Membership event publisher.
    publisher: EventPublisher,
}

impl MembershipService {
    /// Creates a new membership service.
    pub fn new(
        store: Arc<dyn StoreProvider>,
        allocator: Arc<RoomAllocator>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            store,
            allocator,
            publisher,
        }
    }

    /// Creates a room with `user` as its first member.
    pub async fn create_room(&self, user: &UserId) -> AppResult<RoomId> {
        let room_id = self.allocator.next_room_id().await?;
        self.join_room(user, room_id).await?;
        info!(room_id = %room_id, user = %user, "Room created");
        Ok(room_id)
    }

    /// Adds `user` to the room. Joining twice is a no-op.
    ///
    /// A join event is published only when membership actually changed.
    pub async fn join_room(&self, user: &UserId, room_id: RoomId) -> AppResult<RoomId> {
        let added = self
            .store
            .set_add(&keys::room_users(room_id), user.as_str())
            .await?;

        if added {
            let users = self.users(room_id).await?;
            info!(room_id = %room_id, user = %user, members = users.len(), "User joined room");
            self.announce(RoomEvent::join(room_id, user.clone(), users))
                .await;
        }

        Ok(room_id)
    }

    /// Removes `user` from the room and returns how many members remain.
    ///
    /// Fails with `NotFound` if the room has no members or the user is not
    /// one of them.
    pub async fn leave_room(&self, user: &UserId, room_id: RoomId) -> AppResult<u64> {
        ensure_room_exists(self.store.as_ref(), room_id)
            .await
            .map_err(|_| AppError::not_found(format!("No room with the id: {room_id}")))?;

        let removed = self
            .store
            .set_remove(&keys::room_users(room_id), user.as_str())
            .await?;
        if !removed {
            return Err(AppError::not_found(format!(
                "User {user} is not in the room: {room_id}"
            )));
        }

        let users = self.users(room_id).await?;
        let remaining = users.len() as u64;
        info!(room_id = %room_id, user = %user, remaining, "User left room");
        self.announce(RoomEvent::leave(room_id, user.clone(), users))
            .await;

        Ok(remaining)
    }

    /// Members of the room, sorted.
    pub async fn users(&self, room_id: RoomId) -> AppResult<Vec<UserId>> {
        let mut users: Vec<UserId> = self
            .store
            .set_members(&keys::room_users(room_id))
            .await?
            .into_iter()
            .map(UserId)
            .collect();
        users.sort();
        Ok(users)
    }

    /// Number of members in the room.
    pub async fn user_count(&self, room_id: RoomId) -> AppResult<u64> {
        self.store.set_card(&keys::room_users(room_id)).await
    }

    /// Whether the room currently has members.
    pub async fn room_exists(&self, room_id: RoomId) -> AppResult<bool> {
        room_exists(self.store.as_ref(), room_id).await
    }

    /// Whether `user` is a member of the room.
    pub async fn is_member(&self, user: &UserId, room_id: RoomId) -> AppResult<bool> {
        self.store
            .set_is_member(&keys::room_users(room_id), user.as_str())
            .await
    }

    /// Publishes a membership event. Failures are logged, not returned: the
    /// membership change itself has already been applied.
    async fn announce(&self, event: RoomEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            warn!(
                room_id = %event.room_id,
                action = %event.action,
                error = %e,
                "Failed to publish room event"
            );
        }
    }
}
