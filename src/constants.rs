pub const MAX_TRANSACTIONS_PER_BLOCK: usize = 25_000; // capacity of a pool bucket and of a block (reward excluded)
pub const ADMISSION_HORIZON: u32 = 4; // transactions may target tip+1 up to, not including, tip+1+ADMISSION_HORIZON
pub const PENDING_STATS_OFFSET: u32 = 2; // stats report the bucket at tip+PENDING_STATS_OFFSET
pub const BLOCK_REWARD: u64 = 50; // coins paid to the miner of each block, on top of fees
pub const MAX_FUTURE_BLOCK_TIME: u64 = 2 * 60 * 60; // how far ahead of our clock a block timestamp may be (in s)
pub const DEFAULT_DIFFICULTY: u8 = 16; // leading zero bits required of a block hash
pub const MIN_DIFFICULTY: u8 = 1;
pub const RETARGET_INTERVAL: u32 = 100; // blocks between difficulty adjustments
pub const TARGET_BLOCK_TIME: u64 = 90; // desired seconds between blocks

const _: () = assert!(PENDING_STATS_OFFSET >= 1 && PENDING_STATS_OFFSET <= ADMISSION_HORIZON);
