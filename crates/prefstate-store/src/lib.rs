#![doc = include_str!("../README.md")]

pub mod codec;
pub mod domains;
pub mod error;
pub mod store;

pub use codec::{Codec, JsonCodec};
pub use domains::DomainResolver;
pub use error::{Result, StoreError};
pub use store::Store;
