use std::fmt;

/// MCP2515 SPI instructions recognized in the leading byte of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Instruction {
    Reset = 0b1100_0000,
    Read = 0b0000_0011,
    Write = 0b0000_0010,
    ReadStatus = 0b1010_0000,
    RxStatus = 0b1011_0000,
    BitModify = 0b0000_0101,
}

/// Single source-of-truth instruction code table.
///
/// Any byte not present here is an unknown instruction by definition.
pub const INSTRUCTION_TABLE: &[(u8, Instruction)] = &[
    (0xC0, Instruction::Reset),
    (0x03, Instruction::Read),
    (0x02, Instruction::Write),
    (0xA0, Instruction::ReadStatus),
    (0xB0, Instruction::RxStatus),
    (0x05, Instruction::BitModify),
];

impl Instruction {
    /// Returns the instruction code byte sent on MOSI.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Returns the canonical datasheet name used in output annotations.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reset => "RESET",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadStatus => "READ_STATUS",
            Self::RxStatus => "RX_STATUS",
            Self::BitModify => "BIT_MODIFY",
        }
    }

    /// Instructions whose second byte is a register address.
    #[must_use]
    pub const fn carries_address(self) -> bool {
        matches!(self, Self::Read | Self::Write | Self::BitModify)
    }

    /// `READ` returns its payload on MISO; every other instruction drives
    /// its payload on MOSI.
    #[must_use]
    pub const fn reads_from_device(self) -> bool {
        matches!(self, Self::Read)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the instruction for an exact code byte match.
///
/// `None` means the byte is not an MCP2515 instruction.
#[must_use]
pub fn classify_instruction(byte: u8) -> Option<Instruction> {
    INSTRUCTION_TABLE
        .iter()
        .find_map(|(code, instruction)| (*code == byte).then_some(*instruction))
}
