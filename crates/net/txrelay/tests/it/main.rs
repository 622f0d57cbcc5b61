//! transaction relay integration tests

mod relay;
mod stress;
