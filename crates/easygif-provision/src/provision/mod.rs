//! Install-time provisioning.
//!
//! [`ProvisionPlan`] looks at the filesystem once; [`Provisioner`] then fetches
//! the absent components one after the other, toolkit first.

mod plan;
mod provisioner;

pub use plan::{Component, ComponentStatus, PresenceState, ProvisionPlan, Remedy, FFMPEG, FFPROBE};
pub use provisioner::{ProvisionReport, Provisioner};
