pub mod intel_mcs_4;

pub use intel_mcs_4::Mcs4System;
