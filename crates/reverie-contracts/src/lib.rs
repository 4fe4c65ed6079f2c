pub mod analysis;
pub mod events;
pub mod journal;
pub mod renderers;
pub mod runs;
pub mod tones;
