// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media message relay (images, files, audio, video).
//!
//! The transport interface carries text only, so media is relayed as a
//! description with the content reference attached.

use relaydesk_core::{EventMeta, RelaydeskError, RoomInfo};

use crate::dispatcher::Dispatcher;

pub struct MediaRelay<'a> {
    ctx: &'a Dispatcher,
    room: &'a RoomInfo,
    meta: &'a EventMeta,
    msgtype: &'a str,
    body: &'a str,
    url: Option<&'a str>,
    encrypted_file: bool,
}

impl<'a> MediaRelay<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ctx: &'a Dispatcher,
        room: &'a RoomInfo,
        meta: &'a EventMeta,
        msgtype: &'a str,
        body: &'a str,
        url: Option<&'a str>,
        encrypted_file: bool,
    ) -> Self {
        Self { ctx, room, meta, msgtype, body, url, encrypted_file }
    }

    pub async fn process(self) -> Result<(), RelaydeskError> {
        let rendered = match (self.url, self.encrypted_file) {
            (Some(url), _) => format!("[{}] {} ({url})", self.msgtype, self.body),
            (None, true) => format!("[{}] {} (encrypted attachment)", self.msgtype, self.body),
            (None, false) => format!("[{}] {}", self.msgtype, self.body),
        };
        super::deliver(self.ctx, self.room, self.meta, &rendered).await
    }
}
