//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Reference-like test value: interior mutability so a shared instance can be
/// changed and observed through later loads.
#[derive(Debug)]
pub struct Counter {
    value: AtomicI32,
}

impl Counter {
    pub fn new(value: i32) -> Arc<Self> {
        Arc::new(Self {
            value: AtomicI32::new(value),
        })
    }

    pub fn value(&self) -> i32 {
        self.value.load(Ordering::SeqCst)
    }

    pub fn set_value(&self, value: i32) {
        self.value.store(value, Ordering::SeqCst);
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DependencyError {
    #[error("value {0} is negative")]
    Negative(i32),
}

/// Construction that can fail with an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowingDependency {
    pub value: i32,
}

impl ThrowingDependency {
    pub fn new(value: i32) -> Result<Self, DependencyError> {
        if value < 0 {
            return Err(DependencyError::Negative(value));
        }
        Ok(Self { value })
    }
}

/// Construction that can come back empty.
#[derive(Debug, Clone, PartialEq)]
pub struct FailableDependency {
    pub value: i32,
}

impl FailableDependency {
    pub fn new(value: i32) -> Option<Self> {
        (value >= 0).then_some(Self { value })
    }
}

/// Fails with an error below zero, comes back empty above one hundred.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowingFailableDependency {
    pub value: i32,
}

impl ThrowingFailableDependency {
    pub fn new(value: i32) -> Result<Option<Self>, DependencyError> {
        if value < 0 {
            return Err(DependencyError::Negative(value));
        }
        Ok((value <= 100).then_some(Self { value }))
    }
}

pub trait Named: Send + Sync {
    fn name(&self) -> &str;
}

pub struct Console;

impl Named for Console {
    fn name(&self) -> &str {
        "console"
    }
}
