//! Record id generation.
//!
//! Ids look like `prj-k3v9q0x2ma`: a per-kind prefix and ten random base36
//! characters. They are opaque to everything except humans typing them.

use rand::Rng;

use crate::model::EntityKind;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 10;

/// Prefix used for ids of the given kind.
#[must_use]
pub const fn prefix(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Project => "prj",
        EntityKind::Story => "sty",
        EntityKind::Task => "tsk",
    }
}

/// Generate an id for `kind` that `taken` reports as unused.
pub fn generate(kind: EntityKind, taken: impl Fn(&str) -> bool) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let suffix: String = (0..RANDOM_LEN)
            .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
            .collect();
        let id = format!("{}-{suffix}", prefix(kind));
        if !taken(&id) {
            return id;
        }
        tracing::debug!(%id, "generated id collided, retrying");
    }
}
