// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This module provides chain access for the FundMe client: the typed
//! contract interface, read-only and write-capable chain clients, and the
//! wallet provider boundary.

pub mod client;
pub mod common;
pub mod contract;
pub mod wallet;
