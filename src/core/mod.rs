// Shared helpers with no game or engine knowledge

pub mod math;
