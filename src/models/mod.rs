//! API data models
//!
//! This module contains the inbound `/ask` contract and the OpenAI chat
//! completion structures used for the outbound call.

pub mod ask;
pub mod openai;
