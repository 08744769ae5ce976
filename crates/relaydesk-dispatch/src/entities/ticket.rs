// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket entity and the instance-owned ticket cache.
//!
//! The cache maps ticket id to the last known record. Entries are added on
//! creation or first lookup and evicted exactly when a ticket transitions to
//! CLOSED; every cache miss re-derives from the repository.

use std::collections::HashMap;

use relaydesk_core::{
    RelaydeskError, Repository, TicketRecord, TicketStatus, TransportClient,
};
use tokio::sync::Mutex;
use tracing::info;

/// Process-local cache of ticket records, owned by the dispatcher instance.
#[derive(Default)]
pub struct TicketCache {
    inner: Mutex<HashMap<i64, TicketRecord>>,
}

impl TicketCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, ticket_id: i64) -> Option<TicketRecord> {
        self.inner.lock().await.get(&ticket_id).cloned()
    }

    pub async fn put(&self, record: TicketRecord) {
        self.inner.lock().await.insert(record.id, record);
    }

    pub async fn evict(&self, ticket_id: i64) {
        self.inner.lock().await.remove(&ticket_id);
    }
}

pub struct Ticket {
    pub record: TicketRecord,
}

impl Ticket {
    /// The display name a ticket room carries, embedding the ticket id.
    pub fn room_name(&self) -> String {
        format!("Ticket #{} ({})", self.record.id, self.record.ticket_name)
    }

    /// Create a new OPEN ticket, inserting it into the store and the cache.
    pub async fn create(
        repo: &dyn Repository,
        cache: &TicketCache,
        anon_id: &str,
        ticket_name: &str,
    ) -> Result<Self, RelaydeskError> {
        let id = repo.create_ticket(anon_id, ticket_name).await?;
        let record = TicketRecord {
            id,
            anon_id: anon_id.to_string(),
            ticket_room_id: None,
            status: TicketStatus::Open,
            ticket_name: ticket_name.to_string(),
        };
        cache.put(record.clone()).await;
        info!(ticket_id = id, anon_id = anon_id, "created ticket");
        Ok(Self { record })
    }

    /// Cache-first lookup, falling back to the store with cache population.
    pub async fn get_existing(
        repo: &dyn Repository,
        cache: &TicketCache,
        ticket_id: i64,
    ) -> Result<Option<Self>, RelaydeskError> {
        if let Some(record) = cache.get(ticket_id).await {
            return Ok(Some(Self { record }));
        }
        match repo.get_ticket(ticket_id).await? {
            Some(record) => {
                cache.put(record.clone()).await;
                Ok(Some(Self { record }))
            }
            None => Ok(None),
        }
    }

    /// Create the dedicated ticket room and persist its id on success.
    pub async fn create_room(
        &mut self,
        transport: &dyn TransportClient,
        repo: &dyn Repository,
        cache: &TicketCache,
        invitees: &[String],
    ) -> Result<String, RelaydeskError> {
        let room_id = transport.create_room(&self.room_name(), invitees).await?;
        self.set_room_id(repo, cache, &room_id).await?;
        Ok(room_id)
    }

    pub async fn set_room_id(
        &mut self,
        repo: &dyn Repository,
        cache: &TicketCache,
        room_id: &str,
    ) -> Result<(), RelaydeskError> {
        repo.set_ticket_room_id(self.record.id, room_id).await?;
        self.record.ticket_room_id = Some(room_id.to_string());
        cache.put(self.record.clone()).await;
        Ok(())
    }

    /// Invite a user into the ticket room.
    pub async fn invite_to_room(
        &self,
        transport: &dyn TransportClient,
        user_id: &str,
    ) -> Result<(), RelaydeskError> {
        let room_id = self.record.ticket_room_id.as_deref().ok_or_else(|| {
            RelaydeskError::StateResolution(format!(
                "ticket {} has no room to invite into",
                self.record.id
            ))
        })?;
        transport.invite(room_id, user_id).await
    }

    /// Assign a staff member. A no-op if the staff id is already assigned.
    pub async fn claim(
        &self,
        repo: &dyn Repository,
        staff_id: &str,
    ) -> Result<(), RelaydeskError> {
        if repo
            .assigned_staff(self.record.id)
            .await?
            .iter()
            .any(|s| s == staff_id)
        {
            return Ok(());
        }
        repo.assign_staff(self.record.id, staff_id).await?;
        info!(ticket_id = self.record.id, staff_id = staff_id, "ticket claimed");
        Ok(())
    }

    /// Assign a secondary support actor, with the same idempotence rule.
    pub async fn claim_for_support(
        &self,
        repo: &dyn Repository,
        user_id: &str,
    ) -> Result<(), RelaydeskError> {
        if repo
            .assigned_support(self.record.id)
            .await?
            .iter()
            .any(|s| s == user_id)
        {
            return Ok(());
        }
        repo.assign_support(self.record.id, user_id).await
    }

    pub async fn assigned_support(
        &self,
        repo: &dyn Repository,
    ) -> Result<Vec<String>, RelaydeskError> {
        repo.assigned_support(self.record.id).await
    }

    /// Persist a status change. Evicts the cache entry iff the new status is
    /// CLOSED, so a closed id can never resolve to a stale cached instance.
    pub async fn set_status(
        &mut self,
        repo: &dyn Repository,
        cache: &TicketCache,
        status: TicketStatus,
    ) -> Result<(), RelaydeskError> {
        repo.set_ticket_status(self.record.id, status).await?;
        self.record.status = status;
        if status == TicketStatus::Closed {
            cache.evict(self.record.id).await;
        } else {
            cache.put(self.record.clone()).await;
        }
        info!(ticket_id = self.record.id, status = %status, "ticket status changed");
        Ok(())
    }

    /// The owner's current ticket, if any.
    pub async fn owner_current_ticket(
        repo: &dyn Repository,
        cache: &TicketCache,
        anon_id: &str,
    ) -> Result<Option<Self>, RelaydeskError> {
        match repo.get_user_current_ticket(anon_id).await? {
            Some(ticket_id) => Self::get_existing(repo, cache, ticket_id).await,
            None => Ok(None),
        }
    }
}
