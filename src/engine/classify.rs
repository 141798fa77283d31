use uuid::Uuid;

use crate::constants::RECEIVER_TAG;
use crate::constants::TRANSMITTER_TAG;
use crate::world::SignSnapshot;

/// What a sign's technical line says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignRole {
    Transmitter,
    Receiver,
}

/// Parses the bracket-wrapped technical id off a sign's second line.
///
/// Case-insensitive; a single trailing `S` after the closing bracket is
/// tolerated (legacy plural spelling). Anything else is not a wireless
/// sign.
pub fn sign_role(snapshot: &SignSnapshot) -> Option<SignRole> {
    let line = strip_trailing_s(snapshot.lines[1].trim());
    let tag = line.strip_prefix('[')?.strip_suffix(']')?;

    if tag.eq_ignore_ascii_case(TRANSMITTER_TAG) {
        Some(SignRole::Transmitter)
    } else if tag.eq_ignore_ascii_case(RECEIVER_TAG) {
        Some(SignRole::Receiver)
    } else {
        None
    }
}

fn strip_trailing_s(line: &str) -> &str {
    match line.strip_suffix(&['S', 's'][..]) {
        Some(stripped) if stripped.ends_with(']') => stripped,
        _ => line,
    }
}

/// Channel text of a wireless sign: the third line, verbatim.
pub fn channel_of(snapshot: &SignSnapshot) -> &str {
    snapshot.lines[2].as_str()
}

/// Owner of a sign under player-specific channels.
///
/// Structured metadata wins; with `legacy_line_fallback` the fourth line is
/// additionally tried as a bare UUID, for signs predating metadata. Always
/// `None` while player-specific channels are off.
pub fn owner_of(
    snapshot: &SignSnapshot,
    player_specific: bool,
    legacy_line_fallback: bool,
) -> Option<Uuid> {
    if !player_specific {
        return None;
    }

    snapshot.owner.or_else(|| {
        if legacy_line_fallback {
            Uuid::parse_str(snapshot.lines[3].trim()).ok()
        } else {
            None
        }
    })
}
