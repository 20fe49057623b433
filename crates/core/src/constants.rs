/// Fixed funpay sale fee, percent
pub const FUNPAY_FEE_PERCENT: u32 = 3;

/// Default playerok sale fee, percent (configurable per store)
pub const DEFAULT_PLAYEROK_FEE_PERCENT: u32 = 15;

/// Version stamp written into exported backups
pub const BACKUP_FORMAT_VERSION: &str = "1.0";
