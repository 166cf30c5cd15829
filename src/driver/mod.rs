mod options;
mod replication;
mod stepper;
mod wiring;

pub use options::NodeOptions;
pub use options::NodeOptionsError;
pub use options::NodeOptionsValidated;
pub use replication::DriverError;
pub use replication::ReplicationDriver;
pub use stepper::InboundStepper;
pub use wiring::start_node;
pub use wiring::StartNodeConfig;
pub use wiring::StartNodeError;
pub use wiring::StartedNode;
