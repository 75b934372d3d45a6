pub mod global;
pub mod interface;
pub mod pipeline;
pub mod preprocess;
pub mod ranking;
