use core::fmt;
use core::net::IpAddr;
use core::str::FromStr;

/// A network block: an address with every host bit cleared, plus a prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpNetwork {
    addr: IpAddr,
    prefix_len: u8,
}

impl IpNetwork {
    /// Parse `address/prefix`
    ///
    /// Parsing is strict: a block with host bits set, such as `10.1.2.3/8`, is rejected.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (addr, prefix) = text.split_once('/')?;
        let addr = IpAddr::from_str(addr.trim()).ok()?;
        let prefix_len = prefix.trim().parse::<u8>().ok()?;
        if prefix_len > max_prefix_len(addr) {
            return None;
        }

        let bits = addr_bits(addr);
        if bits & mask(prefix_len, max_prefix_len(addr)) != bits {
            return None;
        }

        Some(Self { addr, prefix_len })
    }

    #[must_use]
    pub const fn addr(&self) -> IpAddr {
        self.addr
    }

    #[must_use]
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// True when `addr` lies within this block
    #[must_use]
    pub fn contains_addr(&self, addr: IpAddr) -> bool {
        same_family(self.addr, addr) && addr_bits(addr) & self.mask() == addr_bits(self.addr)
    }

    /// True when every address of `other` lies within this block
    ///
    /// A block is a supernet of itself.
    #[must_use]
    pub fn is_supernet_of(&self, other: &Self) -> bool {
        same_family(self.addr, other.addr) && other.prefix_len >= self.prefix_len && self.contains_addr(other.addr)
    }

    fn mask(&self) -> u128 {
        mask(self.prefix_len, max_prefix_len(self.addr))
    }
}

impl fmt::Display for IpNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

/// A parsed single address or network block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cidr {
    Address(IpAddr),
    Network(IpNetwork),
}

impl Cidr {
    /// Prefix length of a block, or the full address width for a single address
    #[must_use]
    pub const fn prefix_len(&self) -> u8 {
        match self {
            Self::Address(addr) => max_prefix_len(*addr),
            Self::Network(net) => net.prefix_len,
        }
    }

    /// Supernet-or-equal containment
    ///
    /// A block contains another block when it is a supernet of it, and contains an
    /// address when the address is a member. A single address only contains itself.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Network(net), Self::Network(other)) => net.is_supernet_of(other),
            (Self::Network(net), Self::Address(addr)) => net.contains_addr(*addr),
            (Self::Address(addr), Self::Address(other)) => addr == other,
            (Self::Address(addr), Self::Network(net)) => net.addr == *addr && net.prefix_len == max_prefix_len(*addr),
        }
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{addr}"),
            Self::Network(net) => write!(f, "{net}"),
        }
    }
}

/// Parse a network block when `/` is present, else a single address
///
/// Malformed input produces `None`, never an error.
#[must_use]
pub fn parse_cidr(text: &str) -> Option<Cidr> {
    if text.contains('/') {
        IpNetwork::parse(text).map(Cidr::Network)
    } else {
        IpAddr::from_str(text.trim()).ok().map(Cidr::Address)
    }
}

/// Prefix length of a parsed CIDR string, or `None` when unparseable
#[must_use]
pub fn size_parse_cidr(text: &str) -> Option<u8> {
    parse_cidr(text).map(|cidr| cidr.prefix_len())
}

/// Containment over optional operands; anything involving `None` is false
#[must_use]
pub fn cidr_contains(container: Option<&Cidr>, candidate: Option<&Cidr>) -> bool {
    match (container, candidate) {
        (Some(container), Some(candidate)) => container.contains(candidate),
        _ => false,
    }
}

const fn max_prefix_len(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

const fn same_family(a: IpAddr, b: IpAddr) -> bool {
    matches!((a, b), (IpAddr::V4(_), IpAddr::V4(_)) | (IpAddr::V6(_), IpAddr::V6(_)))
}

fn addr_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

const fn mask(prefix_len: u8, width: u8) -> u128 {
    if prefix_len == 0 {
        return 0;
    }

    let all = if width == 128 { u128::MAX } else { (1u128 << width) - 1 };
    (all << (width - prefix_len)) & all
}
