// Trait seams between the core and its collaborators

pub mod ports;
