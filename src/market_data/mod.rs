pub mod align;
pub mod normalize;

pub use align::align_to_candle_time;
pub use normalize::normalize;
