pub mod inspect;
pub mod serve;

pub use inspect::{print_jobs, print_upcoming};
pub use serve::serve;
