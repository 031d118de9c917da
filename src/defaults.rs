/// Default vendor data for manufacturer lookup.
///
/// A short list of OUI prefixes for the vendors most often seen advertising
/// over BLE in a home or office. Anything not listed resolves to
/// [`UNKNOWN_VENDOR`].

/// Label used when a prefix is not in [`OUI_PREFIXES`].
pub const UNKNOWN_VENDOR: &str = "Unknown";

/// Known MAC OUI prefixes (3-byte prefix, vendor name).
pub static OUI_PREFIXES: &[([u8; 3], &str)] = &[
    // === Apple ===
    ([0xD0, 0x03, 0x4B], "Apple"),
    ([0xAC, 0xDE, 0x48], "Apple"),
    ([0x00, 0x25, 0x00], "Apple"),
    ([0x3C, 0xE0, 0x72], "Apple"),
    // === Raspberry Pi Foundation ===
    ([0xB8, 0x27, 0xEB], "Raspberry Pi"),
    // === Xiaomi ===
    ([0x00, 0x1A, 0x7D], "Xiaomi"),
    ([0xF8, 0xA7, 0x63], "Xiaomi"),
    // === Microsoft ===
    ([0x00, 0x50, 0xF2], "Microsoft"),
    ([0x00, 0x15, 0x5D], "Microsoft"),
    // === Google ===
    ([0x28, 0x11, 0xA5], "Google"),
    ([0x00, 0x1A, 0x11], "Google"),
    ([0xD8, 0x3A, 0xDD], "Google"),
    // === Samsung ===
    ([0x00, 0x1B, 0x44], "Samsung"),
    ([0x00, 0x15, 0x99], "Samsung"),
    ([0x94, 0x35, 0x0A], "Samsung"),
];
