mod codec;

pub use codec::Action;
pub use codec::ActionDecodeError;
pub use codec::ActionEncodeError;
