//! # vidplay-core
//!
//! Core types for the vidplay playback framework.
//!
//! This crate provides the fundamental building blocks shared by the decode
//! and render stages:
//! - The pixel format catalogue and every layout query derived from it
//! - FourCC chroma tags and chroma layout descriptions
//! - Reference-counted frame buffers and encoded packets
//! - The per-frame [`VideoFormatInfo`] descriptor
//! - Error and rational number types

pub mod chroma;
pub mod error;
pub mod frame;
pub mod packet;
pub mod pixel;
pub mod rational;
pub mod video_format;

pub use chroma::FourCc;
pub use error::{CoreError, Result};
pub use frame::{Frame, FrameFlags, PlaneBuffer};
pub use packet::{Packet, PacketFlags};
pub use pixel::{FormatFlags, PixelFormat, PixelFormatDescriptor};
pub use rational::Rational;
pub use video_format::{
    ChromaLocation, ColorPrimaries, ColorSpace, HwSurfaceInfo, PlanePitch, TransferFunc,
    VideoFormatInfo,
};
