use std::io;

use crate::data::{Direction, Progress, ProgressHandler};
use crate::error::Error;

/// Build a [`Tee`](super::Tee) observer that counts bytes and feeds each
/// handler, in registration order, after every chunk.
pub(crate) fn progress_observer(
    total: Option<u64>,
    direction: Direction,
    handlers: Vec<ProgressHandler>,
) -> impl FnMut(&[u8]) -> io::Result<()> + Send + 'static {
    let mut progress = Progress::new(total, direction);
    move |chunk: &[u8]| {
        progress.current += chunk.len() as u64;
        for handler in &handlers {
            handler(&progress).map_err(|e| Error::Handler(e).into_io())?;
        }
        Ok(())
    }
}
