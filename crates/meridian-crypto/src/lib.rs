// Copyright © Meridian Foundation
// SPDX-License-Identifier: Apache-2.0

//! Cryptographic primitives for the Meridian SDK: the key schemes the chain's
//! account-abstraction model accepts, SHA3-256 hashing, and the
//! domain-separated signing-message derivation every authenticator is built
//! over.
//!
//! Private key material never leaves this crate's wrappers; hardware and
//! passkey signers are integrated one level up through the signer trait,
//! which only ever sees the exact bytes to be signed.

pub mod ed25519;
pub mod error;
pub mod hash;
pub mod secp256k1_ecdsa;
pub mod secp256r1_ecdsa;
pub mod traits;

pub use error::CryptoMaterialError;
pub use hash::HashValue;
pub use traits::{signing_message, CryptoHash, SigningKey, Uniform, VerifyingKey};
