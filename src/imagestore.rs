// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// 64KB output image with a sequential write cursor.

use std::io::{self, Write};

pub const IMAGE_SIZE: usize = 65536;

/// Assembled memory image. Bytes are appended at a monotone cursor
/// starting from offset 0, independent of the assembled address space,
/// mirroring an `org`-relative image. Bytes never written stay zero.
pub struct ImageStore {
    mem: Vec<u8>,
    cursor: usize,
}

impl ImageStore {
    pub fn new() -> Self {
        Self {
            mem: vec![0; IMAGE_SIZE],
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Append one byte at the cursor. Bytes past the end of the image
    /// are dropped.
    pub fn store(&mut self, val: u8) {
        if self.cursor >= self.mem.len() {
            return;
        }
        self.mem[self.cursor] = val;
        self.cursor += 1;
    }

    pub fn store_slice(&mut self, values: &[u8]) {
        for val in values {
            self.store(*val);
        }
    }

    /// The prefix of the image written so far.
    pub fn written(&self) -> &[u8] {
        &self.mem[..self.cursor]
    }

    /// The full 64KB image.
    pub fn contents(&self) -> &[u8] {
        &self.mem
    }

    pub fn write_bin_file<W: Write>(&self, mut out: W) -> io::Result<()> {
        out.write_all(&self.mem)
    }
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageStore, IMAGE_SIZE};

    #[test]
    fn stores_bytes_sequentially() {
        let mut image = ImageStore::new();
        image.store(0x3e);
        image.store_slice(&[0x05, 0x76]);
        assert_eq!(image.cursor(), 3);
        assert_eq!(image.written(), &[0x3e, 0x05, 0x76]);
    }

    #[test]
    fn unwritten_bytes_stay_zero() {
        let mut image = ImageStore::new();
        image.store_slice(&[0xff, 0xff]);
        assert_eq!(image.contents().len(), IMAGE_SIZE);
        assert!(image.contents()[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn write_bin_emits_full_image() {
        let mut image = ImageStore::new();
        image.store_slice(&[0x01, 0x02, 0x03]);
        let mut out = Vec::new();
        image.write_bin_file(&mut out).unwrap();
        assert_eq!(out.len(), IMAGE_SIZE);
        assert_eq!(&out[..3], &[0x01, 0x02, 0x03]);
        assert_eq!(out[3], 0);
    }

    #[test]
    fn store_past_end_is_dropped() {
        let mut image = ImageStore::new();
        for _ in 0..IMAGE_SIZE {
            image.store(0xaa);
        }
        image.store(0xbb);
        assert_eq!(image.cursor(), IMAGE_SIZE);
        assert_eq!(image.contents()[IMAGE_SIZE - 1], 0xaa);
    }
}
