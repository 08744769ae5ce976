// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`Repository`] implementation for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use relaydesk_core::{
    ChatRecord, EncryptedEventRecord, RelaydeskError, Repository, StaffRecord,
    TicketRecord, TicketStatus, UserRecord,
};

/// A repository over plain hash maps. Mirrors the uniqueness rules of the
/// SQLite schema.
#[derive(Default)]
pub struct MemoryRepository {
    users: Mutex<HashMap<String, UserRecord>>,
    tickets: Mutex<HashMap<i64, TicketRecord>>,
    ticket_staff: Mutex<HashMap<i64, Vec<String>>>,
    ticket_support: Mutex<HashMap<i64, Vec<String>>>,
    chats: Mutex<HashMap<String, ChatRecord>>,
    staff: Mutex<Vec<String>>,
    encrypted: Mutex<Vec<EncryptedEventRecord>>,
    event_pairs: Mutex<HashMap<String, (String, String)>>,
    next_ticket_id: AtomicI64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            next_ticket_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    /// Number of stored undecryptable events, across all sessions.
    pub fn encrypted_event_count(&self) -> usize {
        self.encrypted.lock().unwrap().len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user_id: &str, anon_id: &str) -> Result<(), RelaydeskError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(user_id) || users.values().any(|u| u.anon_id == anon_id) {
            return Err(RelaydeskError::Internal(format!(
                "duplicate user {user_id}"
            )));
        }
        users.insert(
            user_id.to_string(),
            UserRecord {
                user_id: user_id.to_string(),
                anon_id: anon_id.to_string(),
                room_id: None,
                current_ticket_id: None,
                current_chat_room_id: None,
            },
        );
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, RelaydeskError> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn get_user_by_anon_id(
        &self,
        anon_id: &str,
    ) -> Result<Option<UserRecord>, RelaydeskError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.anon_id == anon_id)
            .cloned())
    }

    async fn set_user_room(
        &self,
        user_id: &str,
        room_id: Option<&str>,
    ) -> Result<(), RelaydeskError> {
        if let Some(user) = self.users.lock().unwrap().get_mut(user_id) {
            user.room_id = room_id.map(|s| s.to_string());
        }
        Ok(())
    }

    async fn set_user_current_ticket(
        &self,
        anon_id: &str,
        ticket_id: Option<i64>,
    ) -> Result<(), RelaydeskError> {
        if let Some(user) = self
            .users
            .lock()
            .unwrap()
            .values_mut()
            .find(|u| u.anon_id == anon_id)
        {
            user.current_ticket_id = ticket_id;
        }
        Ok(())
    }

    async fn get_user_current_ticket(
        &self,
        anon_id: &str,
    ) -> Result<Option<i64>, RelaydeskError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.anon_id == anon_id)
            .and_then(|u| u.current_ticket_id))
    }

    async fn set_user_current_chat_room(
        &self,
        user_id: &str,
        chat_room_id: Option<&str>,
    ) -> Result<(), RelaydeskError> {
        if let Some(user) = self.users.lock().unwrap().get_mut(user_id) {
            user.current_chat_room_id = chat_room_id.map(|s| s.to_string());
        }
        Ok(())
    }

    async fn create_ticket(
        &self,
        anon_id: &str,
        ticket_name: &str,
    ) -> Result<i64, RelaydeskError> {
        let id = self.next_ticket_id.fetch_add(1, Ordering::SeqCst);
        self.tickets.lock().unwrap().insert(
            id,
            TicketRecord {
                id,
                anon_id: anon_id.to_string(),
                ticket_room_id: None,
                status: TicketStatus::Open,
                ticket_name: ticket_name.to_string(),
            },
        );
        Ok(id)
    }

    async fn get_ticket(&self, ticket_id: i64) -> Result<Option<TicketRecord>, RelaydeskError> {
        Ok(self.tickets.lock().unwrap().get(&ticket_id).cloned())
    }

    async fn set_ticket_room_id(
        &self,
        ticket_id: i64,
        room_id: &str,
    ) -> Result<(), RelaydeskError> {
        if let Some(ticket) = self.tickets.lock().unwrap().get_mut(&ticket_id) {
            ticket.ticket_room_id = Some(room_id.to_string());
        }
        Ok(())
    }

    async fn set_ticket_status(
        &self,
        ticket_id: i64,
        status: TicketStatus,
    ) -> Result<(), RelaydeskError> {
        if let Some(ticket) = self.tickets.lock().unwrap().get_mut(&ticket_id) {
            ticket.status = status;
        }
        Ok(())
    }

    async fn assigned_staff(&self, ticket_id: i64) -> Result<Vec<String>, RelaydeskError> {
        Ok(self
            .ticket_staff
            .lock()
            .unwrap()
            .get(&ticket_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn assigned_support(&self, ticket_id: i64) -> Result<Vec<String>, RelaydeskError> {
        Ok(self
            .ticket_support
            .lock()
            .unwrap()
            .get(&ticket_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn assign_staff(&self, ticket_id: i64, staff_id: &str) -> Result<(), RelaydeskError> {
        let mut map = self.ticket_staff.lock().unwrap();
        let assigned = map.entry(ticket_id).or_default();
        if !assigned.iter().any(|s| s == staff_id) {
            assigned.push(staff_id.to_string());
        }
        Ok(())
    }

    async fn assign_support(
        &self,
        ticket_id: i64,
        support_id: &str,
    ) -> Result<(), RelaydeskError> {
        let mut map = self.ticket_support.lock().unwrap();
        let assigned = map.entry(ticket_id).or_default();
        if !assigned.iter().any(|s| s == support_id) {
            assigned.push(support_id.to_string());
        }
        Ok(())
    }

    async fn create_chat(&self, chat_room_id: &str, anon_id: &str) -> Result<(), RelaydeskError> {
        self.chats.lock().unwrap().insert(
            chat_room_id.to_string(),
            ChatRecord {
                chat_room_id: chat_room_id.to_string(),
                anon_id: anon_id.to_string(),
            },
        );
        Ok(())
    }

    async fn get_chat(&self, chat_room_id: &str) -> Result<Option<ChatRecord>, RelaydeskError> {
        Ok(self.chats.lock().unwrap().get(chat_room_id).cloned())
    }

    async fn get_staff(&self, user_id: &str) -> Result<Option<StaffRecord>, RelaydeskError> {
        Ok(self
            .staff
            .lock()
            .unwrap()
            .iter()
            .find(|s| *s == user_id)
            .map(|s| StaffRecord { user_id: s.clone() }))
    }

    async fn add_staff(&self, user_id: &str) -> Result<(), RelaydeskError> {
        let mut staff = self.staff.lock().unwrap();
        if !staff.iter().any(|s| s == user_id) {
            staff.push(user_id.to_string());
        }
        Ok(())
    }

    async fn put_encrypted_event(
        &self,
        record: &EncryptedEventRecord,
    ) -> Result<(), RelaydeskError> {
        let mut encrypted = self.encrypted.lock().unwrap();
        encrypted.retain(|r| r.event_id != record.event_id);
        encrypted.push(record.clone());
        Ok(())
    }

    async fn encrypted_events_by_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<EncryptedEventRecord>, RelaydeskError> {
        Ok(self
            .encrypted
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn encrypted_events_by_sender(
        &self,
        sender: &str,
    ) -> Result<Vec<EncryptedEventRecord>, RelaydeskError> {
        Ok(self
            .encrypted
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.sender == sender)
            .cloned()
            .collect())
    }

    async fn remove_encrypted_event(&self, event_id: &str) -> Result<(), RelaydeskError> {
        self.encrypted
            .lock()
            .unwrap()
            .retain(|r| r.event_id != event_id);
        Ok(())
    }

    async fn put_event_pair(
        &self,
        origin_event_id: &str,
        relayed_event_id: &str,
        relayed_room_id: &str,
    ) -> Result<(), RelaydeskError> {
        self.event_pairs.lock().unwrap().insert(
            origin_event_id.to_string(),
            (relayed_event_id.to_string(), relayed_room_id.to_string()),
        );
        Ok(())
    }

    async fn get_related(
        &self,
        origin_event_id: &str,
    ) -> Result<Option<(String, String)>, RelaydeskError> {
        Ok(self
            .event_pairs
            .lock()
            .unwrap()
            .get(origin_event_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ticket_ids_are_sequential() {
        let repo = MemoryRepository::new();
        let a = repo.create_ticket("SwiftHeron42", "first").await.unwrap();
        let b = repo.create_ticket("SwiftHeron42", "second").await.unwrap();
        assert_eq!(b, a + 1);
    }

    #[tokio::test]
    async fn duplicate_user_is_rejected() {
        let repo = MemoryRepository::new();
        repo.create_user("@a:example.org", "AnonA").await.unwrap();
        assert!(repo.create_user("@a:example.org", "AnonB").await.is_err());
    }
}
