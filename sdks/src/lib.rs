/// Pet Operator Rust SDK
///
/// Sign and send owner commands to a running pet operator gateway.

pub mod client;

pub use client::{Credentials, OperatorClient};
pub use pet_operator_core::domain::command::{CommandArgs, CommandRequest, CommandResponse};
