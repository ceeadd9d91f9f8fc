//! Linux capability bounding-set reduction.
//!
//! The kernel exposes no list of the capabilities it knows. They are
//! numbered contiguously from 0, so [`KernelCapabilities`] probes upward
//! until the kernel rejects a number, and [`drop_bounding_set`] removes
//! everything it found except the retained allow-list.

use jailing_common::error::{JailError, Result};
use jailing_common::types::Capability;

use crate::os::Os;

/// An ordered source of the capability numbers the running kernel knows.
pub trait CapabilitySource {
    /// Returns every known capability in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if capability introspection does not work at all.
    fn known_capabilities(&self) -> Result<Vec<Capability>>;
}

/// Probes `PR_CAPBSET_READ` from capability 0 until the first rejection.
///
/// Relies on the kernel assigning capability numbers without gaps.
#[derive(Debug)]
pub struct KernelCapabilities<'a, O: Os + ?Sized> {
    os: &'a O,
}

impl<'a, O: Os + ?Sized> KernelCapabilities<'a, O> {
    /// Creates a probe over the given OS facade.
    pub const fn new(os: &'a O) -> Self {
        Self { os }
    }
}

impl<O: Os + ?Sized> CapabilitySource for KernelCapabilities<'_, O> {
    fn known_capabilities(&self) -> Result<Vec<Capability>> {
        let mut known = Vec::new();
        for number in 0.. {
            let cap = Capability::new(number);
            match self.os.capability_bounded(cap) {
                Ok(_) => known.push(cap),
                Err(e) if number == 0 => {
                    return Err(JailError::Capability {
                        message: format!("cannot query the capability bounding set: {e}"),
                    });
                }
                Err(_) => break,
            }
        }
        tracing::debug!(count = known.len(), "probed kernel capabilities");
        Ok(known)
    }
}

/// Drops every known capability not listed in `retained` from the
/// bounding set. Returns the capabilities that were dropped.
///
/// # Errors
///
/// Returns an error if enumeration or any drop fails.
pub fn drop_bounding_set<O, S>(
    os: &O,
    source: &S,
    retained: &[Capability],
) -> Result<Vec<Capability>>
where
    O: Os + ?Sized,
    S: CapabilitySource + ?Sized,
{
    let mut dropped = Vec::new();
    for cap in source.known_capabilities()? {
        if retained.contains(&cap) {
            continue;
        }
        os.drop_bounding_capability(cap)?;
        dropped.push(cap);
    }
    tracing::info!(
        dropped = dropped.len(),
        retained = retained.len(),
        "capability bounding set reduced"
    );
    Ok(dropped)
}
