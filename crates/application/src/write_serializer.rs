use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Single serialization point shared by every mutating operation.
///
/// An operation holds the guard across its whole resolve-check-write
/// sequence, so no two mutations interleave.
#[derive(Clone, Default)]
pub struct WriteSerializer {
    lock: Arc<Mutex<()>>,
}

/// Proof that the holder owns the serialization point.
#[must_use = "the serialization point is released when the guard drops"]
pub struct WriteGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl WriteSerializer {
    /// Creates a fresh, unshared serialization point.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive ownership.
    pub async fn acquire(&self) -> WriteGuard<'_> {
        WriteGuard {
            _guard: self.lock.lock().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::WriteSerializer;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn guarded_sections_never_overlap() {
        let serializer = WriteSerializer::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let serializer = serializer.clone();
            let inside = inside.clone();
            let overlaps = overlaps.clone();
            handles.push(tokio::spawn(async move {
                let _guard = serializer.acquire().await;
                if inside.fetch_add(1, Ordering::SeqCst) != 0 {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                tokio::task::yield_now().await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle
                .await
                .unwrap_or_else(|error| panic!("task panicked: {error}"));
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }
}
