#[macro_use]
pub mod macros;
pub mod log_setup;
pub mod shared;

pub use shared::Shared;

pub fn is_debug() -> bool {
    cfg!(debug_assertions)
}
