mod bitrate;
mod container;
mod metadata;
mod request;

pub use bitrate::Bitrate;
pub use container::Container;
pub use metadata::{CaptionTrack, StreamDescriptor, VideoMetadata};
pub use request::{DownloadRequest, MediaKind};
