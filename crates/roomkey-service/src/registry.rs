//! The room registry: one handle wiring every room service to a store.

use std::sync::Arc;

use tracing::info;

use roomkey_alloc::RoomAllocator;
use roomkey_core::config::AppConfig;
use roomkey_core::result::AppResult;
use roomkey_core::traits::StoreProvider;
use roomkey_realtime::EventPublisher;

use crate::data::RoomDataService;
use crate::keys::RoomKeyService;
use crate::membership::MembershipService;
use crate::public::PublicRoomService;

/// Entry point for room lifecycle operations.
///
/// Cloning is cheap; all services share the same store and allocator.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    allocator: Arc<RoomAllocator>,
    membership: MembershipService,
    keys: RoomKeyService,
    data: RoomDataService,
    public: PublicRoomService,
}

impl RoomRegistry {
    /// Builds every service on top of `store`.
    pub fn new(store: Arc<dyn StoreProvider>, config: &AppConfig) -> AppResult<Self> {
        let allocator = Arc::new(RoomAllocator::new(Arc::clone(&store), &config.rooms)?);
        let publisher = EventPublisher::new(Arc::clone(&store), config.relay.channel.clone());

        Ok(Self {
            membership: MembershipService::new(
                Arc::clone(&store),
                Arc::clone(&allocator),
                publisher,
            ),
            keys: RoomKeyService::new(Arc::clone(&store), Arc::clone(&allocator)),
            data: RoomDataService::new(Arc::clone(&store)),
            public: PublicRoomService::new(store),
            allocator,
        })
    }

    /// Wipes the store, resets the room counter, and fills the key pool.
    ///
    /// Destructive: every room, key binding, and metadata entry is lost.
    pub async fn init(&self) -> AppResult<u64> {
        let generated = self.allocator.init().await?;
        info!(keys = generated, "Room registry initialized");
        Ok(generated)
    }

    /// Room id and key pool allocator.
    pub fn allocator(&self) -> &RoomAllocator {
        &self.allocator
    }

    /// Membership operations.
    pub fn membership(&self) -> &MembershipService {
        &self.membership
    }

    /// Room key operations.
    pub fn keys(&self) -> &RoomKeyService {
        &self.keys
    }

    /// Room metadata operations.
    pub fn data(&self) -> &RoomDataService {
        &self.data
    }

    /// Public room listing.
    pub fn public(&self) -> &PublicRoomService {
        &self.public
    }
}
