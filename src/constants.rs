// Number of the physical limit switches (A, B, C, D).
pub const NUM_LIMIT_SWITCH: usize = 4;

// Maximum frame sizes of the transports in bytes.
pub const CANFD_MAX_FRAME_SIZE: usize = 64;
pub const I2C_MAX_FRAME_SIZE: usize = 32;

// Payload lengths supported by a single broadcast frame. The order is from
// low to high.
pub const SUPPORTED_FRAME_SIZES: [usize; 16] =
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 12, 16, 20, 24, 32, 48, 64];

// Fixed 11-bit identifier used by the legacy broadcast mode.
pub const CAN_LEGACY_IDENTIFIER: u32 = 0x11;

// Capacity of the outbound mailbox of the broadcast bus.
pub const CAN_MAILBOX_CAPACITY: usize = 3;

// Timeout of a single write or read phase on the request/response bus in
// milliseconds.
pub const I2C_TIMEOUT: u32 = 500;

// Delay between the de-initialization and the re-initialization of the
// request/response bus in milliseconds.
pub const I2C_REBOOT_DELAY: u64 = 5;
