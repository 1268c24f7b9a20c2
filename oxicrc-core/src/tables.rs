//! CRC-16 and CRC-64 lookup tables.
//!
//! Both CRCs here are MSB-first and non-reflected:
//!
//! - **CRC-16/CCITT** (CCITT-FALSE convention): polynomial 0x1021, initial
//!   value 0xFFFF, no final XOR. Check value for `"123456789"` is 0x29B1.
//! - **CRC-64/ECMA-182**: polynomial 0x42F0E1EBA9EA3693, initial value 0,
//!   no final XOR. Check value for `"123456789"` is 0x6C40DF5F0B497347.
//!
//! The tables are plain values owned by [`CrcTables`], which the hash engine
//! builds once and hands to every loop by reference.

/// CRC-16/CCITT generator polynomial.
pub const CRC16_POLY: u16 = 0x1021;

/// CRC-64/ECMA-182 generator polynomial.
pub const CRC64_POLY: u64 = 0x42F0_E1EB_A9EA_3693;

/// Initial CRC-16 register value.
pub const CRC16_INIT: u16 = 0xFFFF;

/// Initial CRC-64 register value.
pub const CRC64_INIT: u64 = 0;

/// Build the 256-entry CRC-16/CCITT table.
///
/// Entry `i` is the register after shifting the byte `i` (placed in the top
/// eight bits) through eight rounds of polynomial division.
pub const fn build_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ CRC16_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Build the 256-entry CRC-64/ECMA-182 table.
pub const fn build_crc64_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = (i as u64) << 56;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000_0000_0000 != 0 {
                crc = (crc << 1) ^ CRC64_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// The lookup tables used by the table-driven CRCs.
#[derive(Clone)]
pub struct CrcTables {
    crc16: [u16; 256],
    crc64: [u64; 256],
}

impl CrcTables {
    /// Build both tables.
    pub fn new() -> Self {
        Self {
            crc16: build_crc16_table(),
            crc64: build_crc64_table(),
        }
    }

    /// The CRC-16 table.
    pub fn crc16_table(&self) -> &[u16; 256] {
        &self.crc16
    }

    /// The CRC-64 table.
    pub fn crc64_table(&self) -> &[u64; 256] {
        &self.crc64
    }

    /// Feed one byte into a CRC-16 register.
    #[inline(always)]
    pub fn crc16_step(&self, crc: u16, byte: u8) -> u16 {
        self.crc16[((crc >> 8) as u8 ^ byte) as usize] ^ (crc << 8)
    }

    /// Feed one byte into a CRC-64 register.
    #[inline(always)]
    pub fn crc64_step(&self, crc: u64, byte: u8) -> u64 {
        (crc << 8) ^ self.crc64[((crc >> 56) as u8 ^ byte) as usize]
    }

    /// Compute CRC-16/CCITT of a buffer.
    pub fn crc16(&self, data: &[u8]) -> u16 {
        data.iter()
            .fold(CRC16_INIT, |crc, &byte| self.crc16_step(crc, byte))
    }

    /// Compute CRC-64/ECMA-182 of a buffer.
    pub fn crc64(&self, data: &[u8]) -> u64 {
        data.iter()
            .fold(CRC64_INIT, |crc, &byte| self.crc64_step(crc, byte))
    }
}

impl Default for CrcTables {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CrcTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrcTables")
            .field("crc16_poly", &format_args!("{CRC16_POLY:#06x}"))
            .field("crc64_poly", &format_args!("{CRC64_POLY:#018x}"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Bit-at-a-time reference: shift each message bit into the register.
    fn crc16_bitwise(init: u16, data: &[u8]) -> u16 {
        let mut crc = init;
        for &byte in data {
            for bit in (0..8).rev() {
                let input = (byte >> bit) & 1 != 0;
                let top = crc & 0x8000 != 0;
                crc <<= 1;
                if input != top {
                    crc ^= CRC16_POLY;
                }
            }
        }
        crc
    }

    fn crc64_bitwise(init: u64, data: &[u8]) -> u64 {
        let mut crc = init;
        for &byte in data {
            for bit in (0..8).rev() {
                let input = (byte >> bit) & 1 != 0;
                let top = crc >> 63 != 0;
                crc <<= 1;
                if input != top {
                    crc ^= CRC64_POLY;
                }
            }
        }
        crc
    }

    #[test]
    fn test_crc16_table_matches_bitwise() {
        let table = build_crc16_table();
        for i in 0..=255u8 {
            assert_eq!(
                table[i as usize],
                crc16_bitwise(0, &[i]),
                "CRC-16 table entry {} mismatch",
                i
            );
        }
    }

    #[test]
    fn test_crc64_table_matches_bitwise() {
        let table = build_crc64_table();
        for i in 0..=255u8 {
            assert_eq!(
                table[i as usize],
                crc64_bitwise(0, &[i]),
                "CRC-64 table entry {} mismatch",
                i
            );
        }
    }

    #[test]
    fn test_table_correctness() {
        let tables = CrcTables::new();
        assert_eq!(tables.crc16_table()[0], 0x0000);
        assert_eq!(tables.crc16_table()[1], CRC16_POLY);
        assert_eq!(tables.crc64_table()[0], 0);
        assert_eq!(tables.crc64_table()[1], CRC64_POLY);
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = CrcTables::new();
        let b = CrcTables::new();
        assert_eq!(a.crc16_table(), b.crc16_table());
        assert_eq!(a.crc64_table(), b.crc64_table());
    }

    #[test]
    fn test_crc16_check() {
        let tables = CrcTables::new();
        assert_eq!(tables.crc16(b"123456789"), 0x29B1);
        assert_eq!(tables.crc16(b""), 0xFFFF);
    }

    #[test]
    fn test_crc64_check() {
        let tables = CrcTables::new();
        assert_eq!(tables.crc64(b"123456789"), 0x6C40_DF5F_0B49_7347);
        assert_eq!(tables.crc64(b""), 0);
    }

    #[test]
    fn test_table_driven_matches_bitwise() {
        let tables = CrcTables::new();
        for size in [1, 7, 8, 15, 16, 17, 255, 256, 1000] {
            let data: Vec<u8> = (0..size).map(|i| (i * 31 + 7) as u8).collect();
            assert_eq!(
                tables.crc16(&data),
                crc16_bitwise(CRC16_INIT, &data),
                "CRC-16 mismatch for size {}",
                size
            );
            assert_eq!(
                tables.crc64(&data),
                crc64_bitwise(CRC64_INIT, &data),
                "CRC-64 mismatch for size {}",
                size
            );
        }
    }
}
