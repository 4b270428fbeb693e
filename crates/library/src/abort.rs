use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::AbortHandle;

    #[test]
    fn clones_share_the_flag() {
        let handle = AbortHandle::new();
        let remote = handle.clone();
        assert!(!handle.is_aborted());
        remote.abort();
        assert!(handle.is_aborted());
        handle.reset();
        assert!(!remote.is_aborted());
    }
}
