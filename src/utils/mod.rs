pub mod format_duration;

pub mod poise;
pub use poise::Context;

pub mod serenity;
