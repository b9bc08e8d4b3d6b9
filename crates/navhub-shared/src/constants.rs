//! Application-wide constants

pub const DEFAULT_MAX_MENUS: usize = 10;
pub const DEFAULT_MAX_CHILDREN_PER_PARENT: usize = 5;
pub const MENU_SEQUENCE_NAME: &str = "menu_sequence";
pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 86_400;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;
