//! Core value types for nodestore
//!
//! This crate defines the self-describing values persisted inside store
//! records. Their encodings are shared by every schema version, so none of
//! them may change once published:
//! - FlexTime: timestamp decoded with a permissive grammar, normalized to UTC
//! - WebUrl: absolute URL with scheme and host
//! - Link: monetary big integer encoded as base-10 text
//! - BigNumber: big integer encoded as a bare JSON number
//! - Json / Opaque: documents that retain unknown keys across decode/encode
//! - TaskSpec: task type + confirmations + opaque parameter bag
//! - InitiatorType: lower-cased initiator discriminator
//! - Ethereum scalars: Address, Hash, HexBig, Signature, Bytes
//! - DecodeError: error type for all of the above

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod eth;
pub mod json;
pub mod link;
pub mod task;
pub mod time;
pub mod web_url;

pub use error::{DecodeError, Result};
pub use eth::{Address, Bytes, Hash, HexBig, Signature, SIGNATURE_LENGTH};
pub use json::{null_as_default, Json, Opaque};
pub use link::{BigNumber, Link};
pub use task::{InitiatorType, RunStatus, TaskSpec, TaskType};
pub use time::FlexTime;
pub use web_url::WebUrl;
