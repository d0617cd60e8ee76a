//! DHT temperature/humidity extension for Firmata boards.
//!
//! - `registry`: the two custom sysex codes and the inbound reply handler
//! - `reply`: per-pin reply slots shared with the receive thread
//! - `correlator`: `DhtClient`, which sends requests and waits for replies
//!
//! Wire contract (firmware revision with humidity in the third byte):
//!
//! ```text
//! configure  F0 66 <pin> <type> F7
//! request    F0 67 <pin> F7
//! reply      F0 67 <pin> <temperature> <humidity> F7
//! ```

pub mod correlator;
pub mod registry;
pub mod reply;

pub use correlator::{DhtClient, REPLY_TIMEOUT};
pub use registry::{parse_reply, DhtRegistry, DHT_CONFIG, DHT_DATA};
pub use reply::ReplyTable;
