use crate::transport::TransportOptions;
use std::convert::TryFrom;
use tokio::time::Duration;

#[derive(Clone, Default)]
pub struct NodeOptions {
    pub tick_interval: Option<Duration>,
    pub step_timeout: Option<Duration>,
    pub propose_timeout: Option<Duration>,
    pub election_tick: Option<usize>,
    pub heartbeat_tick: Option<usize>,
    pub max_size_per_msg: Option<u64>,
    pub max_inflight_msgs: Option<usize>,
    pub inbound_queue_depth: Option<usize>,
    pub transport: Option<TransportOptions>,
}

#[derive(Clone, Debug)]
pub struct NodeOptionsValidated {
    pub tick_interval: Duration,
    pub step_timeout: Duration,
    pub propose_timeout: Duration,
    pub election_tick: usize,
    pub heartbeat_tick: usize,
    pub max_size_per_msg: u64,
    pub max_inflight_msgs: usize,
    pub inbound_queue_depth: usize,
    pub transport: TransportOptions,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("illegal node options: {0}")]
pub struct NodeOptionsError(&'static str);

impl NodeOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.tick_interval == Duration::from_millis(0) {
            return Err("Tick interval must be non-zero");
        }
        if self.step_timeout == Duration::from_millis(0) || self.propose_timeout == Duration::from_millis(0) {
            return Err("Step and propose timeouts must be non-zero");
        }
        if self.heartbeat_tick == 0 {
            return Err("Heartbeat tick must be non-zero");
        }
        if self.election_tick <= self.heartbeat_tick {
            return Err("Election tick must be greater than heartbeat tick");
        }
        if self.max_inflight_msgs == 0 {
            return Err("Max in-flight messages must be non-zero");
        }
        if self.inbound_queue_depth == 0 {
            return Err("Inbound queue depth must be non-zero");
        }
        if self.transport.max_message_size == 0 {
            return Err("Transport max message size must be non-zero");
        }

        Ok(())
    }
}

impl TryFrom<NodeOptions> for NodeOptionsValidated {
    type Error = NodeOptionsError;

    fn try_from(options: NodeOptions) -> Result<Self, Self::Error> {
        let values = NodeOptionsValidated {
            tick_interval: options.tick_interval.unwrap_or(Duration::from_millis(200)),
            step_timeout: options.step_timeout.unwrap_or(Duration::from_secs(5)),
            propose_timeout: options.propose_timeout.unwrap_or(Duration::from_secs(5)),
            election_tick: options.election_tick.unwrap_or(10),
            heartbeat_tick: options.heartbeat_tick.unwrap_or(1),
            max_size_per_msg: options.max_size_per_msg.unwrap_or(4096),
            max_inflight_msgs: options.max_inflight_msgs.unwrap_or(256),
            inbound_queue_depth: options.inbound_queue_depth.unwrap_or(256),
            transport: options.transport.unwrap_or_default(),
        };

        values.validate().map_err(NodeOptionsError)?;
        Ok(values)
    }
}
