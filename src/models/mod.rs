//! BeatSaver entities
//!
//! Wire records for beatmaps and users. Fields the server may omit are
//! optional; an entity missing identifying fields is partial.

mod beatmap;
mod user;

pub use beatmap::{
    Beatmap, Characteristic, CharacteristicDifficulty, Difficulties, Metadata, Stats,
};
pub use user::User;

#[cfg(test)]
mod tests;
