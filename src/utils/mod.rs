pub mod serde_flex;
pub mod text;
pub mod time;
