pub mod event_loop;
pub mod handle;

pub use event_loop::{ScreenEvent, ScreenLoop};
pub use handle::ScreenHandle;
