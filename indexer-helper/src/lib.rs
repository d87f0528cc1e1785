#[cfg(feature = "size")]
pub mod size;
