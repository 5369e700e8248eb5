//! A pure-rust implementation of a few less common cryptographic hash
//! functions, with no dependencies and no foreign code.
//!
//! All the hashes expose the same incremental [`Digest`](./digest/trait.Digest.html)
//! interface: feed input with `input`, extract the digest with `result`,
//! recycle the instance with `reset`. Instances hold mutable buffering
//! state and are not meant to be shared between threads; each thread
//! owns its own hasher.
//!
//! The three families implemented here are permutation based designs
//! expressed with bitwise logical operations and rotations over fixed
//! width words:
//!
//! * `Hamsi` (224, 256, 384 and 512 bits of output)
//! * `Luffa` (224, 256, 384 and 512 bits of output)
//! * `RadioGatun` (32-bit and 64-bit word variants)

pub mod digest;
mod cryptoutil;

pub mod hamsi;
pub mod luffa;
pub mod radiogatun;
