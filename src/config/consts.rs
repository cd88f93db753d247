// src/config/consts.rs

// Board
pub const BOARD_URL: &str = "https://attok.co.kr/";

// Poll loop
pub const TICK_SECONDS: u64 = 30;
pub const BACKOFF_CAP_SECONDS: u64 = 300;
pub const FAILURE_THRESHOLD: u32 = 3; // consecutive failures before the period doubles
pub const EXTRACT_TIMEOUT_SECONDS: u64 = 10;

// Notifier
pub const QUEUE_CAPACITY: usize = 32;
pub const SPEECH_RATE: u32 = 100; // 200 = engine normal

// Local files
pub const LOG_DIR: &str = ".store";
pub const CONFIG_FILE: &str = "attok_monitor.toml";

// Tone limits accepted from config
pub const TONE_MIN_HZ: u32 = 20;
pub const TONE_MAX_HZ: u32 = 20_000;
pub const TONE_MAX_MS: u64 = 5_000;
