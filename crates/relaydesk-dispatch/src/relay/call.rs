// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call signaling handler. The bot cannot participate in calls; the caller
//! gets a notice and the attempt is logged.

use relaydesk_core::{EventMeta, RelaydeskError, RoomInfo};
use tracing::info;

use crate::dispatcher::Dispatcher;

pub struct CallRelay<'a> {
    ctx: &'a Dispatcher,
    room: &'a RoomInfo,
    meta: &'a EventMeta,
    call_type: &'a str,
}

impl<'a> CallRelay<'a> {
    pub fn new(
        ctx: &'a Dispatcher,
        room: &'a RoomInfo,
        meta: &'a EventMeta,
        call_type: &'a str,
    ) -> Self {
        Self { ctx, room, meta, call_type }
    }

    pub async fn process(self) -> Result<(), RelaydeskError> {
        info!(
            room_id = %self.room.room_id,
            sender = %self.meta.sender,
            call_type = self.call_type,
            "ignoring call signaling"
        );
        // Only the initial invite warrants a reply; candidates and hangups
        // for the same call would spam the room.
        if self.call_type == "invite" {
            self.ctx
                .transport
                .send_text(
                    &self.room.room_id,
                    "Voice and video calls are not supported.",
                    true,
                )
                .await?;
        }
        Ok(())
    }
}
