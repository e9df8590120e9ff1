pub mod annotate;
pub mod driver;
pub mod roster;
pub mod serve;

// Re-export command functions for convenience
pub use annotate::annotate;
pub use driver::driver;
pub use roster::roster;
pub use serve::serve;
