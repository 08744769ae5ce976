// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Redaction relay: when an origin event is redacted, redact its relayed
//! clone in the target room, resolved through the stored event pair.

use relaydesk_core::{EventMeta, RelaydeskError, RoomInfo};
use tracing::{debug, error};

use crate::dispatcher::Dispatcher;

pub struct RedactionRelay<'a> {
    ctx: &'a Dispatcher,
    room: &'a RoomInfo,
    meta: &'a EventMeta,
    redacts: &'a str,
    reason: Option<&'a str>,
}

impl<'a> RedactionRelay<'a> {
    pub fn new(
        ctx: &'a Dispatcher,
        room: &'a RoomInfo,
        meta: &'a EventMeta,
        redacts: &'a str,
        reason: Option<&'a str>,
    ) -> Self {
        Self { ctx, room, meta, redacts, reason }
    }

    pub async fn process(self) -> Result<(), RelaydeskError> {
        let Some((relayed_event_id, relayed_room_id)) =
            self.ctx.repo.get_related(self.redacts).await?
        else {
            error!(
                room_id = %self.room.room_id,
                redacts = self.redacts,
                "no relayed clone found for redacted event"
            );
            return Ok(());
        };
        let redaction_id = self
            .ctx
            .transport
            .send_redaction(&relayed_room_id, &relayed_event_id, self.reason)
            .await?;
        debug!(
            sender = %self.meta.sender,
            origin = self.redacts,
            relayed = %relayed_event_id,
            redaction = %redaction_id,
            "relayed redaction"
        );
        Ok(())
    }
}
