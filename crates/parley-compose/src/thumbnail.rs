//! Quote thumbnail rendering.

use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use parley_store::AttachmentStream;

/// Decode `stream` and scale it so neither edge exceeds `max_dimension`.
///
/// Images already within bounds are returned unscaled.  Anything that is not
/// an image, or fails to decode, yields `None`.
pub fn quote_thumbnail(stream: &AttachmentStream, max_dimension: u32) -> Option<DynamicImage> {
    if !stream.content_type.starts_with("image/") {
        return None;
    }

    let image = match image::open(&stream.local_path) {
        Ok(image) => image,
        Err(e) => {
            warn!(
                attachment = %stream.id,
                path = %stream.local_path,
                error = %e,
                "Failed to decode quoted attachment for thumbnail"
            );
            return None;
        }
    };

    let (width, height) = image.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return Some(image);
    }

    let thumbnail = image.thumbnail(max_dimension, max_dimension);
    debug!(
        attachment = %stream.id,
        from = ?(width, height),
        to = ?thumbnail.dimensions(),
        "scaled quote thumbnail"
    );
    Some(thumbnail)
}
