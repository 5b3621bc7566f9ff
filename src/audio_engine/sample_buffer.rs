//! Growable interleaved `i16` buffer used as decoder output.

/// Append-only sample buffer whose reserved capacity doubles on overflow.
///
/// The decoder appends one chunk per source packet; each chunk is handed out
/// zero-filled so resampling kernels can write it by index.
#[derive(Debug)]
pub struct SampleGrowBuffer {
    samples: Vec<i16>,
    capacity: usize,
}

impl SampleGrowBuffer {
    /// Creates a buffer with `initial_capacity` samples reserved up front.
    pub fn with_capacity(initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Tracked capacity in samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `len` zeroed samples and returns them for writing.
    pub fn append_chunk(&mut self, len: usize) -> &mut [i16] {
        let start = self.samples.len();
        let required = start + len;
        if required > self.capacity {
            while required > self.capacity {
                self.capacity *= 2;
            }
            self.samples.reserve_exact(self.capacity - start);
        }

        self.samples.resize(required, 0);
        &mut self.samples[start..]
    }

    /// Finishes writing and returns the samples without spare capacity.
    pub fn into_boxed_slice(self) -> Box<[i16]> {
        self.samples.into_boxed_slice()
    }
}
