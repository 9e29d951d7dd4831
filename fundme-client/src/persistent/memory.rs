// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::Persist;

pub type Error = std::convert::Infallible;

/// A dummy [`Persist`] implementation that doesn't persist anything, but
/// holds the value in memory.
#[derive(derive_more::Deref)]
pub struct Memory<T> {
    value: T,
}

impl<T> Memory<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T> Persist for Memory<T> {
    type Error = Error;

    fn as_mut(this: &mut Self) -> &mut T {
        &mut this.value
    }

    fn persist(_: &mut Self) -> Result<(), Error> {
        Ok(())
    }

    fn into_value(this: Self) -> T {
        this.value
    }
}
