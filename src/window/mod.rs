// Window Module - Bounded, time-expiring trade store with incremental aggregates

pub mod buffer_pool;
pub mod ema;
mod reads;
mod ring;

pub use buffer_pool::{BufferPool, BufferPoolStats, PooledBuffer};
pub use ema::Ema;
pub use reads::WindowStats;
pub use ring::SlidingWindow;
