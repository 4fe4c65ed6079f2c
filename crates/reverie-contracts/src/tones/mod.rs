mod registry;
mod selectors;

pub use registry::{ToneProfile, ToneRegistry, DEFAULT_PALETTE, DEFAULT_TONE};
pub use selectors::{classify, ToneSelection, ToneSelector};
