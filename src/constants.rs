/// Technical id carried, bracket-wrapped, on the second line of a
/// transmitter sign. CraftBook-compatible.
pub const TRANSMITTER_TAG: &str = "Mc1110";

/// Technical id carried, bracket-wrapped, on the second line of a
/// receiver sign. CraftBook-compatible.
pub const RECEIVER_TAG: &str = "Mc1111";

/// Redstone saturates at this level; aggregation never exceeds it.
pub const MAX_POWER: u8 = 15;

/// Directory below the data dir holding one JSON file per channel.
pub const RECEIVER_FILES_DIR: &str = "receiverFiles";

/// Stands in for characters a filename must not contain, and for an
/// empty channel name.
pub const FILENAME_PLACEHOLDER: &str = "%_";

/// Characters scrubbed from channel names before they become filenames.
pub const FILENAME_FORBIDDEN: &[char] = &[
    '-', '"', '*', '/', ':', '<', '>', '?', '|', '+', ',', '.', ';', '=', '[', ']', '\\', ' ',
];
