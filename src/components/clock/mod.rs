pub mod distributor;

pub use distributor::{ClockDistributor, ClockPhase};
