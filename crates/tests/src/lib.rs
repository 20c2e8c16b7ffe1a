//! Integration tests for the voxform engine
//!
//! Spectral and end-to-end checks that exercise the full pipeline the
//! way a host would: prepare once, stream fixed-size blocks, measure the
//! output. Unit tests for individual stages live next to the stages.

#[cfg(test)]
mod engine_integration;
