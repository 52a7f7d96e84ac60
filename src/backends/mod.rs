// SPDX-License-Identifier: MPL-2.0

//! Camera subsystem
//!
//! - [`camera`]: backend traits, shared frame types, V4L2 capture and the
//!   capture-loop thread controller
//! - [`virtual_camera`]: still images presented as camera devices

pub mod camera;
pub mod virtual_camera;
