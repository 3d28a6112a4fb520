//! Integ tests are separated into their own "crate" so that they can depend
//! on executor and runtime crates without obscuring what the library itself
//! depends on during development.
