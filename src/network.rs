use super::PROTOCOL_VERSION;

/// Represents a network with a well-known magic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    /// Mainnet
    /// Default Port 8333
    MainNet,

    /// Testnet
    /// Default Port 18333
    TestNet,

    /// Regtest
    /// Default Port 18444
    RegTest,
}

impl Network {
    /// magic returns the 4-byte network identifier as a little-endian u32
    pub fn magic(&self) -> u32 {
        match self {
            Network::MainNet => 0xd9b4_bef9,
            Network::TestNet => 0x0709_110b,
            Network::RegTest => 0xdab5_bffa,
        }
    }

    pub fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            0xd9b4_bef9 => Some(Self::MainNet),
            0x0709_110b => Some(Self::TestNet),
            0xdab5_bffa => Some(Self::RegTest),
            _ => None,
        }
    }
}

/// NetworkConfig is the immutable configuration threaded into message
/// construction: which magic to stamp on frames and which protocol
/// version to advertise.
///
/// The configuration is call-scoped data, never shared state; two
/// codec calls with different configs cannot interfere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    pub magic: u32,
    pub protocol_version: u32,
}

impl NetworkConfig {
    pub fn new(magic: u32, protocol_version: u32) -> Self {
        Self {
            magic,
            protocol_version,
        }
    }

    pub fn for_network(network: Network) -> Self {
        Self::new(network.magic(), PROTOCOL_VERSION)
    }
}
