// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anonymized display-id generation.
//!
//! Each user is shown to staff under a stable pseudonym generated once at
//! first contact. The pseudonym intentionally carries no information about
//! the platform user id.

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "Amber", "Brisk", "Calm", "Deft", "Eager", "Fleet", "Gentle", "Hazel",
    "Ivory", "Jolly", "Keen", "Lucid", "Mellow", "Nimble", "Opal", "Prime",
    "Quiet", "Rustic", "Swift", "Tidy", "Vivid", "Witty",
];

const NOUNS: &[&str] = &[
    "Falcon", "Heron", "Otter", "Badger", "Lynx", "Marten", "Osprey",
    "Plover", "Raven", "Stoat", "Tern", "Vole", "Wren", "Ibex", "Kestrel",
    "Magpie", "Newt", "Oriole", "Pike", "Swan",
];

/// Generate a fresh anonymized display id, e.g. `SwiftHeron42`.
///
/// Uniqueness is enforced by the repository's unique constraint; callers
/// retry on collision.
pub fn generate_anon_id() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).expect("non-empty list");
    let noun = NOUNS.choose(&mut rng).expect("non-empty list");
    let digits: u8 = rng.gen_range(0..100);
    format!("{adjective}{noun}{digits}")
}
