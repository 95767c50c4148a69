pub mod simulator;
pub mod traits;

pub use simulator::SimulatorClient;
pub use traits::SimulationBackend;
