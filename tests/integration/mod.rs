//! Behavioral tests for the session operations and the text round-trip.

mod properties;
mod roundtrip;
