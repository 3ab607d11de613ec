//! Analytics provider implementations

pub mod console;

pub use console::ConsoleProvider;
