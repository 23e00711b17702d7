//! CH9329 wire protocol: frame types and the binary codec.

pub mod codec;
pub mod frame;

pub use codec::{checksum, encode_frame, try_parse, ParseOutcome, ProtocolError};
pub use frame::{
    ChipInfo, CommandFrame, CommandId, DeviceErrorCode, ReplyFrame, ReplyStatus, FRAME_HEADER,
    MAX_PAYLOAD_LEN,
};
