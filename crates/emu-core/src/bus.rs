//! CPU-facing register surface.

/// Address-decoded register and memory access.
///
/// `peek` is the side-effect-free view used by debuggers and state queries.
/// Devices whose reads have side effects override `read` as well.
pub trait Bus {
    fn peek(&self, address: u16) -> u8;

    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(u8);

    impl Bus for Latch {
        fn peek(&self, _address: u16) -> u8 {
            self.0
        }

        fn write(&mut self, _address: u16, value: u8) {
            self.0 = value;
        }
    }

    #[test]
    fn read_defaults_to_peek() {
        let mut latch = Latch(0);
        latch.write(0xFF41, 0x44);
        assert_eq!(latch.read(0x0000), 0x44);
    }
}
