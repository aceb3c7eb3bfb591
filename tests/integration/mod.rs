//! Integration tests for flow_request
//!
//! These tests drive the public API end to end: raw request sources in,
//! unified arguments, uploaded files and negotiated media types out.
//!
//! Run with: cargo test --test integration

mod helpers;

mod multipart_requests;
mod negotiation;
mod unification;
