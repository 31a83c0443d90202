/// Bounded-memory batch iteration: `merge N, commit, open a new session,
/// repeat`, generalized to anything batchable (used both for chunked
/// `insert_many` batches and for the sync engine's record chunking).
pub trait ChunkedExt<T> {
    fn chunked(&self, size: usize) -> std::slice::Chunks<'_, T>;
}

impl<T> ChunkedExt<T> for [T] {
    fn chunked(&self, size: usize) -> std::slice::Chunks<'_, T> {
        self.chunks(size.max(1))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chunks_respect_size() {
        let items = vec![1, 2, 3, 4, 5];
        let chunks: Vec<_> = items.chunked(2).collect();
        assert_eq!(chunks, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
    }

    #[test]
    fn zero_size_does_not_panic() {
        let items = vec![1, 2, 3];
        let chunks: Vec<_> = items.chunked(0).collect();
        assert_eq!(chunks.len(), 3);
    }
}
