//! Tests for the deploy chain driven by a scripted [`Deployer`](crate::Deployer).

pub(crate) mod fixtures;
mod procedure;
