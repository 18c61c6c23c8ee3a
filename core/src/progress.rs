//! Upload progress reporting.
//!
//! The transport reports raw byte counts; callers want a whole percentage.
//! `UploadProgress` turns `(loaded, total)` pairs into
//! `floor(loaded * 100 / total)`, never goes backwards and only reaches 100
//! once every byte has been handed to the transport.

use std::io::{self, Read};

pub struct UploadProgress<F: FnMut(u8)> {
    callback: F,
    last: u8,
    finished: bool,
}

impl<F: FnMut(u8)> UploadProgress<F> {
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            last: 0,
            finished: false,
        }
    }

    pub fn update(&mut self, loaded: u64, total: u64) {
        if self.finished {
            return;
        }
        let percent = if loaded >= total {
            100
        } else {
            // loaded < total, so the quotient is below 100.
            (u128::from(loaded) * 100 / u128::from(total)) as u8
        };
        let percent = percent.max(self.last);
        self.last = percent;
        self.finished = percent == 100;
        (self.callback)(percent);
    }

    pub fn finish(&mut self, total: u64) {
        self.update(total, total);
    }

    pub fn last(&self) -> u8 {
        self.last
    }
}

/// `Read` adapter that reports bytes handed out so far.
pub struct ProgressReader<R, F: FnMut(u64, u64)> {
    inner: R,
    loaded: u64,
    total: u64,
    on_read: F,
    done: bool,
}

impl<R: Read, F: FnMut(u64, u64)> ProgressReader<R, F> {
    pub fn new(inner: R, total: u64, on_read: F) -> Self {
        Self {
            inner,
            loaded: 0,
            total,
            on_read,
            done: false,
        }
    }
}

impl<R: Read, F: FnMut(u64, u64)> Read for ProgressReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.loaded += n as u64;
            (self.on_read)(self.loaded.min(self.total), self.total);
            self.done = self.loaded >= self.total;
        } else if !self.done && !buf.is_empty() {
            self.done = true;
            (self.on_read)(self.total, self.total);
        }
        Ok(n)
    }
}
