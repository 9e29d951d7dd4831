// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides a convenient library for driving the FundMe funding
//! workflow: connect a wallet, read the live quote, submit a funding
//! transaction and await its confirmation.

pub mod config;
pub mod display;
mod error;
pub mod listener;
pub mod persistent;
pub mod session;

#[cfg(test)]
mod unit_tests;

pub use error::Error;
