//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "wablast".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_user_id() -> String {
    "1".to_string()
}

pub fn default_poll_interval_ms() -> u64 {
    5_000
}

pub fn default_poll_ceiling() -> u32 {
    40
}

pub fn default_progress_tick_ms() -> u64 {
    900
}

pub fn default_grace_delay_ms() -> u64 {
    2_000
}

pub fn default_progress_baseline() -> u8 {
    50
}

pub fn default_progress_cap() -> u8 {
    95
}
