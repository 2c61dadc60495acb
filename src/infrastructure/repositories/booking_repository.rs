//! Booking Repository Implementation
//!
//! In-memory implementation of the BookingRepository trait.
//! Records live for the lifetime of the process.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{Booking, BookingId, BookingRepository, ClientId};
use crate::shared::error::AppError;

/// DashMap-backed booking store.
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: DashMap<BookingId, Booking>,
    by_client: DashMap<ClientId, Vec<BookingId>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<(), AppError> {
        let client_id = booking.client_id.clone();
        let id = booking.id;

        match self.bookings.entry(id) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(format!("Booking {} already exists", id)));
            }
            Entry::Vacant(slot) => {
                slot.insert(booking);
            }
        }

        self.by_client.entry(client_id).or_default().push(id);
        Ok(())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Option<Booking>, AppError> {
        Ok(self.bookings.get(&id).map(|b| b.value().clone()))
    }

    async fn find_by_client(&self, client_id: &ClientId) -> Result<Vec<Booking>, AppError> {
        let ids = self
            .by_client
            .get(client_id)
            .map(|ids| ids.value().clone())
            .unwrap_or_default();

        let mut bookings: Vec<Booking> = ids
            .into_iter()
            .filter_map(|id| self.bookings.get(&id).map(|b| b.value().clone()))
            .collect();
        bookings.sort_by_key(|b| (b.booked_at, b.id));
        Ok(bookings)
    }

    async fn discard(&self, id: BookingId) -> Result<(), AppError> {
        if let Some((_, booking)) = self.bookings.remove(&id) {
            if let Some(mut ids) = self.by_client.get_mut(&booking.client_id) {
                ids.retain(|existing| *existing != id);
            }
        }
        Ok(())
    }
}
