pub mod decoder;
pub mod intel_4001;
pub mod intel_4002;

pub use intel_4001::Rom4001;
pub use intel_4002::Ram4002;
