/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use crate::error::{Error, Result};

/// Size of the 8080 address space.
pub const MEMORY_SIZE: usize = 0x10000;

/// A borrowed view over the caller's memory image.
///
/// The length is checked once when the view is built, so every 16 bit address is in bounds and the
/// accessors never fail. Multi-byte accesses wrap around at `0xffff`.
pub(crate) struct Memory<'a> {
    bytes: &'a mut [u8],
}

/// Fails unless `bytes` covers the whole address space.
pub(crate) fn check_size(bytes: &[u8]) -> Result<()> {
    if bytes.len() < MEMORY_SIZE {
        return Err(Error::MemoryTooSmall { len: bytes.len() });
    }
    Ok(())
}

/// The opcode at `pc` and the two bytes after it, wrapping at `0xffff`.
///
/// `bytes` must already have passed [`check_size`].
pub(crate) fn fetch(bytes: &[u8], pc: u16) -> [u8; 3] {
    [
        bytes[pc as usize],
        bytes[pc.wrapping_add(1) as usize],
        bytes[pc.wrapping_add(2) as usize],
    ]
}

impl<'a> Memory<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Result<Memory<'a>> {
        check_size(bytes)?;
        Ok(Memory { bytes })
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }

    /// Reads a little endian word.
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    /// Writes a little endian word.
    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write(addr, low);
        self.write(addr.wrapping_add(1), high);
    }

    pub fn fetch(&self, pc: u16) -> [u8; 3] {
        fetch(&*self.bytes, pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_image_is_rejected() {
        let mut bytes = vec![0u8; 0xffff];
        assert_eq!(
            Memory::new(&mut bytes).err(),
            Some(Error::MemoryTooSmall { len: 0xffff })
        );
    }

    #[test]
    fn words_wrap_around_the_address_space() {
        let mut bytes = vec![0u8; MEMORY_SIZE];
        let mut memory = Memory::new(&mut bytes).unwrap();
        memory.write_word(0xffff, 0x1234);
        assert_eq!(memory.read(0xffff), 0x34);
        assert_eq!(memory.read(0x0000), 0x12);
        assert_eq!(memory.read_word(0xffff), 0x1234);
        assert_eq!(memory.fetch(0xfffe), [0x00, 0x34, 0x12]);
    }

    #[test]
    fn read_only_fetch_matches_the_view() {
        let mut bytes = vec![0u8; MEMORY_SIZE];
        bytes[0xfffe] = 0xc3;
        bytes[0xffff] = 0x21;
        bytes[0x0000] = 0x43;
        assert_eq!(check_size(&bytes), Ok(()));
        assert_eq!(fetch(&bytes, 0xfffe), [0xc3, 0x21, 0x43]);
        let memory = Memory::new(&mut bytes).unwrap();
        assert_eq!(memory.fetch(0xfffe), [0xc3, 0x21, 0x43]);
    }

    #[test]
    fn short_image_fails_the_size_check() {
        assert_eq!(check_size(&[0u8; 0x100]), Err(Error::MemoryTooSmall { len: 0x100 }));
    }
}
