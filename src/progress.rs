/// Receives a call per entry packed or unpacked, on the calling thread.
pub trait ProgressListener {
    /// `index` is 1-based and never exceeds `total`.
    fn on_progress(&mut self, current_path: &str, index: usize, total: usize);
}

impl<F> ProgressListener for F
where
    F: FnMut(&str, usize, usize),
{
    fn on_progress(&mut self, current_path: &str, index: usize, total: usize) {
        self(current_path, index, total)
    }
}

pub(crate) fn report(progress: &mut Option<&mut dyn ProgressListener>, current_path: &str, index: usize, total: usize) {
    if let Some(listener) = progress.as_deref_mut() {
        listener.on_progress(current_path, index, total);
    }
}
