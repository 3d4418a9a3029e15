//! Domain helpers shared by routes and the tree layer.

pub mod calendar;
