pub mod audio;
pub mod device;
pub mod native;

pub use native::{DeviceSelection, NativeAudio};
