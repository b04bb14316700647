//! Pure selection logic: no I/O, no side effects.

pub mod resolver;
