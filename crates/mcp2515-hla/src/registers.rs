/// Number of register map rows, indexed by the address low nibble.
pub const REGISTER_MAP_ROWS: usize = 16;
/// Number of register map columns, indexed by the address high nibble.
pub const REGISTER_MAP_COLUMNS: usize = 8;

/// MCP2515 register mnemonics laid out as in the datasheet register map.
///
/// `CANSTAT` and `CANCTRL` are mirrored at every high-nibble address, so rows
/// `0xE` and `0xF` repeat the same name across all columns.
#[rustfmt::skip]
pub const REGISTER_MAP: [[&str; REGISTER_MAP_COLUMNS]; REGISTER_MAP_ROWS] = [
    ["RXF0SIDH", "RXF3SIDH", "RXM0SIDH", "TXB0CTRL", "TXB1CTRL", "TXB2CTRL", "RXB0CTRL", "RXB1CTRL"],
    ["RXF0SIDL", "RXF3SIDL", "RXM0SIDL", "TXB0SIDH", "TXB1SIDH", "TXB2SIDH", "RXB0SIDH", "RXB1SIDH"],
    ["RXF0EID8", "RXF3EID8", "RXM0EID8", "TXB0SIDL", "TXB1SIDL", "TXB2SIDL", "RXB0SIDL", "RXB1SIDL"],
    ["RXF0EID0", "RXF3EID0", "RXM0EID0", "TXB0EID8", "TXB1EID8", "TXB2EID8", "RXB0EID8", "RXB1EID8"],
    ["RXF1SIDH", "RXF4SIDH", "RXM1SIDH", "TXB0EID0", "TXB1EID0", "TXB2EID0", "RXB0EID0", "RXB1EID0"],
    ["RXF1SIDL", "RXF4SIDL", "RXM1SIDL", "TXB0DLC", "TXB1DLC", "TXB2DLC", "RXB0DLC", "RXB1DLC"],
    ["RXF1EID8", "RXF4EID8", "RXM1EID8", "TXB0D0", "TXB1D0", "TXB2D0", "RXB0D0", "RXB1D0"],
    ["RXF1EID0", "RXF4EID0", "RXM1EID0", "TXB0D1", "TXB1D1", "TXB2D1", "RXB0D1", "RXB1D1"],
    ["RXF2SIDH", "RXF5SIDH", "CNF3", "TXB0D2", "TXB1D2", "TXB2D2", "RXB0D2", "RXB1D2"],
    ["RXF2SIDL", "RXF5SIDL", "CNF2", "TXB0D3", "TXB1D3", "TXB2D3", "RXB0D3", "RXB1D3"],
    ["RXF2EID8", "RXF5EID8", "CNF1", "TXB0D4", "TXB1D4", "TXB2D4", "RXB0D4", "RXB1D4"],
    ["RXF2EID0", "RXF5EID0", "CANINTE", "TXB0D5", "TXB1D5", "TXB2D5", "RXB0D5", "RXB1D5"],
    ["BFPCTRL", "TEC", "CANINTF", "TXB0D6", "TXB1D6", "TXB2D6", "RXB0D6", "RXB1D6"],
    ["TXRTSCTRL", "REC", "EFLG", "TXB0D7", "TXB1D7", "TXB2D7", "RXB0D7", "RXB1D7"],
    ["CANSTAT", "CANSTAT", "CANSTAT", "CANSTAT", "CANSTAT", "CANSTAT", "CANSTAT", "CANSTAT"],
    ["CANCTRL", "CANCTRL", "CANCTRL", "CANCTRL", "CANCTRL", "CANCTRL", "CANCTRL", "CANCTRL"],
];

/// Register address split into its register map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterAddress(u8);

impl RegisterAddress {
    /// Wraps a raw address byte.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw address byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Register map row (`address & 0x0F`).
    #[must_use]
    pub const fn row(self) -> usize {
        (self.0 & 0x0F) as usize
    }

    /// Register map column (`(address >> 4) & 0x0F`).
    #[must_use]
    pub const fn column(self) -> usize {
        ((self.0 >> 4) & 0x0F) as usize
    }

    /// Looks up the mnemonic for this address.
    ///
    /// `None` means the column lies beyond the populated map (`address >= 0x80`).
    #[must_use]
    pub fn mnemonic(self) -> Option<&'static str> {
        REGISTER_MAP
            .get(self.row())
            .and_then(|row| row.get(self.column()))
            .copied()
    }
}

/// Returns the register mnemonic for an address byte, if it is mapped.
#[must_use]
pub fn register_name(address: u8) -> Option<&'static str> {
    RegisterAddress::new(address).mnemonic()
}
