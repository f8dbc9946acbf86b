// SPDX-License-Identifier: MPL-2.0
//! Domain layer - value objects shared by the renderers and the CLI.
//!
//! # Modules
//!
//! - [`scale`]: [`ScaleFactor`] and the preset scale list

pub mod scale;

pub use scale::ScaleFactor;
