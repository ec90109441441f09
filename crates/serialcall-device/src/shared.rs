use std::sync::{Arc, Mutex, MutexGuard};

use serialcall_transport::Transport;
use serialcall_wire::Value;

use crate::device::Device;
use crate::error::{DeviceError, Result};

/// A device session shared between threads.
///
/// Every operation takes the session lock for the whole request/reply
/// exchange, so exchanges from different threads never interleave on the
/// link.
#[derive(Debug)]
pub struct SharedDevice<T> {
    inner: Arc<Mutex<Device<T>>>,
}

impl<T> Clone for SharedDevice<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SharedDevice<T> {
    pub fn new(device: Device<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Result<Option<Value>> {
        self.lock()?.call(name, args)
    }

    pub fn read_register(&self, name: &str) -> Result<u8> {
        self.lock()?.read_register(name)
    }

    pub fn write(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.lock()?.write(name, value)
    }

    /// Run several operations under one lock acquisition.
    pub fn with<R>(&self, f: impl FnOnce(&mut Device<T>) -> Result<R>) -> Result<R> {
        let mut device = self.lock()?;
        f(&mut device)
    }

    /// Recover the session if this is the last handle.
    ///
    /// Other live handles give the handle back as `Err`. A poisoned lock is
    /// reported as `DeviceError::Poisoned` and the session is dropped.
    pub fn try_into_inner(self) -> std::result::Result<Result<Device<T>>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner().map_err(|_| DeviceError::Poisoned)),
            Err(inner) => Err(Self { inner }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Device<T>>> {
        self.inner.lock().map_err(|_| DeviceError::Poisoned)
    }
}

impl<T: Transport> From<Device<T>> for SharedDevice<T> {
    fn from(device: Device<T>) -> Self {
        Self::new(device)
    }
}
