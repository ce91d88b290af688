pub mod error;
pub mod output;
pub mod pollinations;
pub mod bfl;

pub use error::{ImageError, Result};
pub use output::{strip_data_url, GeneratedImage, DEFAULT_IMAGE_MIME};
pub use pollinations::{batch_seed, BatchOutcome, ImageRequest, PollinationsImageClient};
pub use bfl::{BflClient, JobHandle, JobStatus, KontextRequest, PollConfig};
