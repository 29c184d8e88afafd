pub mod normalize;
pub mod sentences;
pub mod summarize;

pub use normalize::normalize;
pub use summarize::summarize;
