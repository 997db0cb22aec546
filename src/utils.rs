use chrono::{DateTime, Utc};

/// First second of 2015, the origin of Discord snowflakes.
const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

pub fn snowflake_from_timestamp(timestamp: DateTime<Utc>) -> u64 {
    let since_epoch = (timestamp.timestamp_millis() - DISCORD_EPOCH_MS).max(0) as u64;
    since_epoch << 22
}

/// Message nonce derived from the current time.
pub fn nonce_now() -> String {
    snowflake_from_timestamp(Utc::now()).to_string()
}
