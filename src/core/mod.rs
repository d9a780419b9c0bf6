// Core pure-logic exports
pub mod classifier;
pub mod matching;
pub mod naming;

pub use classifier::{classify, extract_breed, Classification, Label};
pub use matching::{ensure_breedable, ensure_resolvable};
pub use naming::{derive_display_name, derive_username, slugify, username_candidate};
