//! # vidplay-codec
//!
//! Decode lifecycle for the vidplay playback framework.
//!
//! This crate drives an opaque codec engine through format negotiation,
//! hardware acceleration setup and frame retrieval:
//!
//! - [`engine`] - the codec engine contract: context, callbacks, defaults
//! - [`accel`] - the uniform video acceleration capability and backends
//! - [`decoder`] - [`SimpleDecoder`], the decode actor
//! - [`stub`] - a deterministic engine used by tests and integrations
//!
//! # Example
//!
//! ```
//! use vidplay_codec::{CodecId, SimpleDecoder, StubEngine, StreamParams};
//! use vidplay_core::packet::Packet;
//! use vidplay_core::pixel::PixelFormat;
//!
//! let engine = StubEngine::new(vec![PixelFormat::Yuv420P], StreamParams::default());
//! let mut decoder = SimpleDecoder::new(engine);
//! decoder.open(CodecId::H264, &[]).unwrap();
//! decoder.send_packet(Packet::new(vec![0u8; 64], 0)).unwrap();
//! decoder.receive().unwrap();
//! decoder.render(|frame, _fbo| assert!(frame.is_some()), 0);
//! ```

pub mod accel;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod stub;
pub mod vaapi;

pub use accel::{AccelFactory, HwBackend, VideoAcceleration};
pub use decoder::{DecoderOptions, RenderSlot, SimpleDecoder};
pub use engine::{CodecCallbacks, CodecContext, CodecEngine, CodecId, EngineVersion};
pub use error::{CodecError, Result};
pub use stub::{StreamParams, StubEngine};
